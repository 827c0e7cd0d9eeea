//! 心动仓库服务层
//!
//! 持有当前用户的已发送 / 已收到心动集合，负责加载、发送、删除。
//! 所有变更都以服务器为准：发送成功后整体重新拉取，而不是本地合并。

use crate::dating::interest::gateway::InterestGateway;
use crate::dating::interest::listener::{EmptyInterestListener, InterestListener};
use crate::dating::interest::models::{
    Interest, InterestResponse, InterestSnapshot, InterestStats, InterestStatus,
};
use crate::dating::interest::projection::project_stats;
use crate::dating::interest::reconcile;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

/// 会话内的可变状态
///
/// `epoch` 在身份切换或会话销毁时递增，请求发起时记录的 epoch 与当前不一致时结果被丢弃
#[derive(Default)]
struct InterestState {
    user_id: Option<String>,
    epoch: u64,
    sent: Vec<Interest>,
    received: Vec<Interest>,
    sent_seq: LoadSeq,
    received_seq: LoadSeq,
}

/// 单个集合的加载序号：只应用比已应用结果更新的加载
#[derive(Default)]
struct LoadSeq {
    issued: u64,
    applied: u64,
}

impl LoadSeq {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn try_apply(&mut self, ticket: u64) -> bool {
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        true
    }

    /// 本地修改后，之前发起的加载全部视为过期
    fn invalidate_in_flight(&mut self) {
        self.applied = self.issued;
    }
}

#[derive(Debug, Clone, Copy)]
enum Collection {
    Sent,
    Received,
}

impl Collection {
    fn label(self) -> &'static str {
        match self {
            Collection::Sent => "已发送心动",
            Collection::Received => "已收到心动",
        }
    }
}

impl InterestState {
    fn seq_mut(&mut self, collection: Collection) -> &mut LoadSeq {
        match collection {
            Collection::Sent => &mut self.sent_seq,
            Collection::Received => &mut self.received_seq,
        }
    }

    fn interests_mut(&mut self, collection: Collection) -> &mut Vec<Interest> {
        match collection {
            Collection::Sent => &mut self.sent,
            Collection::Received => &mut self.received,
        }
    }
}

/// 请求发起时的会话上下文
struct Session {
    user_id: String,
    epoch: u64,
}

/// 加载计数守卫：存在进行中的加载时 `loading` 为 true
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 发送单飞守卫：同一时刻只允许一个发送请求
struct SendingGuard<'a>(&'a AtomicBool);

impl<'a> SendingGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 心动仓库
///
/// 每个实例拥有独立的集合，没有全局状态；身份通过 [`InterestStore::refresh`] 显式传入
pub struct InterestStore {
    gateway: Arc<dyn InterestGateway>,
    listener: RwLock<Arc<dyn InterestListener>>,
    state: Mutex<InterestState>,
    loads_in_flight: AtomicUsize,
    sending: AtomicBool,
}

impl InterestStore {
    /// 创建新的心动仓库（使用默认空监听器）
    pub fn new(gateway: Arc<dyn InterestGateway>) -> Self {
        Self::with_listener(gateway, Arc::new(EmptyInterestListener))
    }

    /// 创建新的心动仓库（带自定义监听器）
    pub fn with_listener(
        gateway: Arc<dyn InterestGateway>,
        listener: Arc<dyn InterestListener>,
    ) -> Self {
        Self {
            gateway,
            listener: RwLock::new(listener),
            state: Mutex::new(InterestState::default()),
            loads_in_flight: AtomicUsize::new(0),
            sending: AtomicBool::new(false),
        }
    }

    /// 替换监听器
    pub fn set_listener(&self, listener: Arc<dyn InterestListener>) {
        *self
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = listener;
    }

    fn listener(&self) -> Arc<dyn InterestListener> {
        self.listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // 临界区内只做内存操作，不跨越 await
    fn state(&self) -> MutexGuard<'_, InterestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_session(&self) -> Option<Session> {
        let state = self.state();
        state.user_id.clone().map(|user_id| Session {
            user_id,
            epoch: state.epoch,
        })
    }

    /// 仅当会话仍是 `session` 时执行修改，否则返回 None
    fn apply_if_current<R>(
        &self,
        session: &Session,
        f: impl FnOnce(&mut InterestState) -> R,
    ) -> Option<R> {
        let mut state = self.state();
        if state.epoch != session.epoch {
            return None;
        }
        Some(f(&mut state))
    }

    // ========== 会话 ==========

    /// 身份可用或变更时调用：切换会话并并发加载两个集合
    ///
    /// 同一用户重复调用等价于下拉刷新
    pub async fn refresh(&self, user_id: &str) {
        let switched = {
            let mut state = self.state();
            if state.user_id.as_deref() == Some(user_id) {
                false
            } else {
                info!(
                    "[InterestStore] 🔄 会话切换: {:?} -> {}",
                    state.user_id, user_id
                );
                state.user_id = Some(user_id.to_string());
                state.epoch += 1;
                state.sent.clear();
                state.received.clear();
                true
            }
        };
        if switched {
            self.notify_sent_changed().await;
            self.notify_received_changed().await;
        }

        let (sent_ok, received_ok) = tokio::join!(self.load_sent(), self.load_received());
        debug!(
            "[InterestStore] 刷新完成 - 已发送: {}, 已收到: {}",
            sent_ok, received_ok
        );
    }

    /// 销毁会话（登出）：清空集合，进行中的请求结果将被丢弃
    pub async fn teardown(&self) {
        {
            let mut state = self.state();
            info!("[InterestStore] 🛑 销毁会话: {:?}", state.user_id);
            state.user_id = None;
            state.epoch += 1;
            state.sent.clear();
            state.received.clear();
        }
        self.notify_sent_changed().await;
        self.notify_received_changed().await;
    }

    /// 当前会话用户
    pub fn current_user_id(&self) -> Option<String> {
        self.state().user_id.clone()
    }

    // ========== 加载 ==========

    /// 拉取当前用户发出的全部心动并整体替换本地集合
    ///
    /// 失败时集合保持不变，只记录日志；返回是否成功应用
    pub async fn load_sent(&self) -> bool {
        self.load(Collection::Sent).await
    }

    /// 拉取当前用户收到的全部心动并整体替换本地集合
    pub async fn load_received(&self) -> bool {
        self.load(Collection::Received).await
    }

    async fn load(&self, collection: Collection) -> bool {
        let Some(session) = self.current_session() else {
            warn!(
                "[InterestStore] 当前用户未知，跳过加载{}",
                collection.label()
            );
            return false;
        };
        let ticket = self.state().seq_mut(collection).issue();
        let _loading = LoadingGuard::enter(&self.loads_in_flight);

        let result = match collection {
            Collection::Sent => self.gateway.get_sent_interests(&session.user_id).await,
            Collection::Received => self.gateway.get_received_interests(&session.user_id).await,
        };
        let interests = match result {
            Ok(interests) => interests,
            Err(e) => {
                error!(
                    "[InterestStore] 加载{}失败: {:?}",
                    collection.label(),
                    e
                );
                return false;
            }
        };

        let count = interests.len();
        match self.apply_if_current(&session, |state| {
            if !state.seq_mut(collection).try_apply(ticket) {
                return false;
            }
            *state.interests_mut(collection) = interests;
            true
        }) {
            Some(true) => {}
            Some(false) => {
                debug!(
                    "[InterestStore] 已有更新的{}结果，丢弃第 {} 次加载",
                    collection.label(),
                    ticket
                );
                return false;
            }
            None => {
                debug!(
                    "[InterestStore] 会话已变更，丢弃{}加载结果",
                    collection.label()
                );
                return false;
            }
        }
        info!(
            "[InterestStore] ✅ {}已更新，共 {} 条",
            collection.label(),
            count
        );
        match collection {
            Collection::Sent => self.notify_sent_changed().await,
            Collection::Received => self.notify_received_changed().await,
        }
        true
    }

    // ========== 操作 ==========

    /// 向 `target_user_id` 发送心动
    ///
    /// 已有发送进行中时立即返回 false，不发起网络请求。
    /// 成功后整体重新加载已发送集合（服务器的自动匹配可能同时改变了状态）。
    pub async fn send_interest(&self, target_user_id: &str) -> bool {
        let Some(session) = self.current_session() else {
            warn!("[InterestStore] 当前用户未知，无法发送心动");
            return false;
        };
        if target_user_id.is_empty() || target_user_id == session.user_id {
            warn!(
                "[InterestStore] 无效的心动目标: {:?}（当前用户 {}）",
                target_user_id, session.user_id
            );
            return false;
        }
        let Some(_sending) = SendingGuard::try_acquire(&self.sending) else {
            warn!(
                "[InterestStore] 已有心动正在发送，忽略发给 {} 的重复请求",
                target_user_id
            );
            return false;
        };

        info!(
            "[InterestStore] 💌 发送心动 {} -> {}",
            session.user_id, target_user_id
        );
        if let Err(e) = self.gateway.send_interest(target_user_id).await {
            error!(
                "[InterestStore] 发送心动给 {} 失败: {:?}",
                target_user_id, e
            );
            return false;
        }

        if self.apply_if_current(&session, |_| ()).is_some() {
            self.load_sent().await;
        } else {
            debug!("[InterestStore] 会话已变更，跳过发送后的重新加载");
        }
        true
    }

    /// 删除发给 `counterpart_user_id` 的心动
    ///
    /// 服务器删除成功后从本地已发送集合中过滤掉对应条目，无需重新加载；
    /// 本地不存在该条目时过滤为空操作，返回值仍以服务器结果为准
    pub async fn remove_interest(&self, counterpart_user_id: &str) -> bool {
        let Some(session) = self.current_session() else {
            warn!("[InterestStore] 当前用户未知，无法删除心动");
            return false;
        };

        info!(
            "[InterestStore] 🗑️ 删除心动 {} -> {}",
            session.user_id, counterpart_user_id
        );
        if let Err(e) = self.gateway.remove_interest(counterpart_user_id).await {
            error!(
                "[InterestStore] 删除发给 {} 的心动失败: {:?}",
                counterpart_user_id, e
            );
            return false;
        }

        match self.apply_if_current(&session, |state| {
            // 删除前发起的加载可能仍包含该条目
            state.sent_seq.invalidate_in_flight();
            reconcile::remove_sent_to(&mut state.sent, counterpart_user_id)
        }) {
            Some(0) => {
                debug!(
                    "[InterestStore] 本地没有发给 {} 的心动，无需过滤",
                    counterpart_user_id
                );
            }
            Some(removed) => {
                debug!("[InterestStore] 本地移除 {} 条心动", removed);
                self.notify_sent_changed().await;
            }
            None => {
                debug!("[InterestStore] 会话已变更，跳过本地过滤");
            }
        }
        true
    }

    /// 旧版手动接受 / 拒绝
    ///
    /// 自动匹配后服务器不再接受客户端的状态变更，此方法不做任何修改，始终返回 false
    #[deprecated(note = "状态由服务器自动匹配推进，请改用 load_sent / load_received 刷新")]
    pub async fn respond_to_interest(&self, interest_id: &str, response: InterestResponse) -> bool {
        warn!(
            "[InterestStore] respond_to_interest({}, {:?}) 已废弃：自动匹配下客户端无法修改心动状态",
            interest_id, response
        );
        false
    }

    /// 单点查询当前用户对 `other_user_id` 的心动状态，与本地集合无关
    ///
    /// 没有记录或请求失败时返回 None
    pub async fn check_interest_status(&self, other_user_id: &str) -> Option<InterestStatus> {
        let Some(session) = self.current_session() else {
            warn!("[InterestStore] 当前用户未知，无法查询心动状态");
            return None;
        };
        match self
            .gateway
            .get_interest_status(&session.user_id, other_user_id)
            .await
        {
            Ok(status) => status,
            Err(e) => {
                error!(
                    "[InterestStore] 查询与 {} 的心动状态失败: {:?}",
                    other_user_id, e
                );
                None
            }
        }
    }

    // ========== 读取 ==========

    pub fn sent_interests(&self) -> Vec<Interest> {
        self.state().sent.clone()
    }

    pub fn received_interests(&self) -> Vec<Interest> {
        self.state().received.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loads_in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::SeqCst)
    }

    /// 统计数据，每次调用都根据当前集合重新计算
    pub fn stats(&self) -> InterestStats {
        let state = self.state();
        project_stats(&state.sent, &state.received)
    }

    /// 是否与 `counterpart_user_id` 互相心动（双方都处于 pending）
    pub fn is_mutual_interest(&self, counterpart_user_id: &str) -> bool {
        let state = self.state();
        reconcile::is_mutual_interest(&state.sent, &state.received, counterpart_user_id)
    }

    /// 一次性读取集合、标志位与统计数据
    pub fn snapshot(&self) -> InterestSnapshot {
        let state = self.state();
        InterestSnapshot {
            sent: state.sent.clone(),
            received: state.received.clone(),
            loading: self.is_loading(),
            sending: self.is_sending(),
            stats: project_stats(&state.sent, &state.received),
        }
    }

    // ========== 回调 ==========

    async fn notify_sent_changed(&self) {
        let (sent, stats) = {
            let state = self.state();
            (state.sent.clone(), project_stats(&state.sent, &state.received))
        };
        let listener = self.listener();
        if let Some(json) = to_listener_json(&sent, "已发送心动列表") {
            listener.on_sent_interests_changed(json).await;
        }
        if let Some(json) = to_listener_json(&stats, "心动统计") {
            listener.on_interest_stats_changed(json).await;
        }
    }

    async fn notify_received_changed(&self) {
        let (received, stats) = {
            let state = self.state();
            (
                state.received.clone(),
                project_stats(&state.sent, &state.received),
            )
        };
        let listener = self.listener();
        if let Some(json) = to_listener_json(&received, "已收到心动列表") {
            listener.on_received_interests_changed(json).await;
        }
        if let Some(json) = to_listener_json(&stats, "心动统计") {
            listener.on_interest_stats_changed(json).await;
        }
    }
}

/// 序列化回调参数，失败时记录警告并跳过本次回调
fn to_listener_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!("[InterestStore] 序列化{}失败，跳过回调: {:?}", what, e);
            None
        }
    }
}
