//! 测试辅助：内存版网关、记录型监听器、测试日志

use crate::dating::interest::gateway::InterestGateway;
use crate::dating::interest::listener::InterestListener;
use crate::dating::interest::models::{Interest, InterestStatus};
use crate::dating::interest::types::decode_interest_records;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::Notify;

static INIT_LOGGER: Once = Once::new();

pub fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::EnvFilter;

        let filter_layer = EnvFilter::new("info,matchly_sdk_core=debug");
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_test_writer();

        let _ = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .try_init();
    });
}

#[derive(Default)]
struct FakeServer {
    interests: Vec<Interest>,
    next_id: u64,
}

/// 内存版心动服务器
///
/// 模拟服务器的关键行为：每个有序用户对最多一条心动、删除不存在的心动报错、
/// 可选的自动匹配（双方 pending 时同时改为 accepted）
pub struct FakeGateway {
    acting_user: String,
    server: Mutex<FakeServer>,
    auto_match: AtomicBool,
    legacy_ids: AtomicBool,
    fail_loads: AtomicBool,
    fail_sent_loads: AtomicBool,
    fail_sends: AtomicBool,
    send_gate: Mutex<Option<Arc<Notify>>>,
    load_gate: Mutex<Option<Arc<Notify>>>,
    raw_sent: Mutex<Option<Vec<serde_json::Value>>>,
    send_calls: AtomicUsize,
    remove_calls: AtomicUsize,
    sent_loads: AtomicUsize,
    received_loads: AtomicUsize,
}

impl FakeGateway {
    /// `acting_user` 为 token 对应的用户，发送 / 删除都以该用户身份执行
    pub fn new(acting_user: &str) -> Self {
        Self {
            acting_user: acting_user.to_string(),
            server: Mutex::new(FakeServer::default()),
            auto_match: AtomicBool::new(false),
            legacy_ids: AtomicBool::new(false),
            fail_loads: AtomicBool::new(false),
            fail_sent_loads: AtomicBool::new(false),
            fail_sends: AtomicBool::new(false),
            send_gate: Mutex::new(None),
            load_gate: Mutex::new(None),
            raw_sent: Mutex::new(None),
            send_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
            sent_loads: AtomicUsize::new(0),
            received_loads: AtomicUsize::new(0),
        }
    }

    /// 直接在服务器上插入一条心动（模拟其他用户的操作）
    pub fn insert(&self, from: &str, to: &str, status: InterestStatus) -> Interest {
        let mut server = self.server.lock().unwrap();
        server.next_id += 1;
        let interest = Interest {
            id: format!("{:024x}", server.next_id),
            from_user_id: from.to_string(),
            to_user_id: to.to_string(),
            status,
            created_at: Some(chrono::Utc::now()),
            from_profile: None,
            to_profile: None,
        };
        server.interests.push(interest.clone());
        interest
    }

    /// 把所有互相 pending 的心动对提升为 accepted
    pub fn promote_mutual(&self) {
        let mut server = self.server.lock().unwrap();
        let pending: Vec<(String, String)> = server
            .interests
            .iter()
            .filter(|i| i.is_pending())
            .map(|i| (i.from_user_id.clone(), i.to_user_id.clone()))
            .collect();
        for interest in server.interests.iter_mut() {
            let reverse = (interest.to_user_id.clone(), interest.from_user_id.clone());
            if interest.is_pending() && pending.contains(&reverse) {
                interest.status = InterestStatus::Accepted;
            }
        }
    }

    pub fn set_auto_match(&self, on: bool) {
        self.auto_match.store(on, Ordering::SeqCst);
    }

    /// 列表接口只返回 `_id`
    pub fn set_legacy_ids(&self, on: bool) {
        self.legacy_ids.store(on, Ordering::SeqCst);
    }

    /// 所有读取接口失败
    pub fn fail_loads(&self, on: bool) {
        self.fail_loads.store(on, Ordering::SeqCst);
    }

    /// 仅已发送列表接口失败
    pub fn fail_sent_loads(&self, on: bool) {
        self.fail_sent_loads.store(on, Ordering::SeqCst);
    }

    pub fn fail_sends(&self, on: bool) {
        self.fail_sends.store(on, Ordering::SeqCst);
    }

    /// 发送请求在 gate 被通知前挂起
    pub fn block_sends(&self, gate: Arc<Notify>) {
        *self.send_gate.lock().unwrap() = Some(gate);
    }

    /// 列表请求在 gate 被通知前挂起
    pub fn block_loads(&self, gate: Arc<Notify>) {
        *self.load_gate.lock().unwrap() = Some(gate);
    }

    /// 之后的列表请求不再挂起（已挂起的请求仍需 gate 通知）
    pub fn unblock_loads(&self) {
        *self.load_gate.lock().unwrap() = None;
    }

    /// 已发送列表接口直接返回这些原始记录
    pub fn set_raw_sent(&self, records: Vec<serde_json::Value>) {
        *self.raw_sent.lock().unwrap() = Some(records);
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    pub fn sent_loads(&self) -> usize {
        self.sent_loads.load(Ordering::SeqCst)
    }

    pub fn received_loads(&self) -> usize {
        self.received_loads.load(Ordering::SeqCst)
    }

    async fn wait_gate(gate: &Mutex<Option<Arc<Notify>>>) {
        let gate = gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn list(&self, pred: impl Fn(&Interest) -> bool) -> Result<Vec<Interest>> {
        let matching: Vec<Interest> = self
            .server
            .lock()
            .unwrap()
            .interests
            .iter()
            .filter(|i| pred(i))
            .cloned()
            .collect();
        if !self.legacy_ids.load(Ordering::SeqCst) {
            return Ok(matching);
        }
        // 走一遍真实的反序列化 + 归一化路径
        let wire: Vec<serde_json::Value> = matching
            .iter()
            .map(|i| {
                serde_json::json!({
                    "_id": i.id,
                    "fromUserId": i.from_user_id,
                    "toUserId": i.to_user_id,
                    "status": i.status,
                })
            })
            .collect();
        Ok(decode_interest_records(wire))
    }
}

#[async_trait]
impl InterestGateway for FakeGateway {
    async fn get_sent_interests(&self, user_id: &str) -> Result<Vec<Interest>> {
        self.sent_loads.fetch_add(1, Ordering::SeqCst);
        // 先在服务器上取快照，挂起期间的修改不会出现在本次响应中
        let raw = self.raw_sent.lock().unwrap().clone();
        let result = match raw {
            Some(records) => Ok(decode_interest_records(records)),
            None => self.list(|i| i.from_user_id == user_id),
        };
        Self::wait_gate(&self.load_gate).await;
        if self.fail_loads.load(Ordering::SeqCst) || self.fail_sent_loads.load(Ordering::SeqCst) {
            return Err(anyhow!("服务器错误: network down"));
        }
        result
    }

    async fn get_received_interests(&self, user_id: &str) -> Result<Vec<Interest>> {
        self.received_loads.fetch_add(1, Ordering::SeqCst);
        let result = self.list(|i| i.to_user_id == user_id);
        Self::wait_gate(&self.load_gate).await;
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(anyhow!("服务器错误: network down"));
        }
        result
    }

    async fn send_interest(&self, to_user_id: &str) -> Result<()> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        Self::wait_gate(&self.send_gate).await;
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(anyhow!("服务器错误: network down"));
        }
        let exists = self
            .server
            .lock()
            .unwrap()
            .interests
            .iter()
            .any(|i| i.from_user_id == self.acting_user && i.to_user_id == to_user_id);
        if exists {
            return Err(anyhow!("服务器错误: Interest already sent"));
        }
        self.insert(&self.acting_user, to_user_id, InterestStatus::Pending);
        if self.auto_match.load(Ordering::SeqCst) {
            self.promote_mutual();
        }
        Ok(())
    }

    async fn remove_interest(&self, to_user_id: &str) -> Result<()> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        let mut server = self.server.lock().unwrap();
        let before = server.interests.len();
        server
            .interests
            .retain(|i| !(i.from_user_id == self.acting_user && i.to_user_id == to_user_id));
        if server.interests.len() == before {
            return Err(anyhow!("服务器错误: Interest not found"));
        }
        Ok(())
    }

    async fn get_interest_status(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> Result<Option<InterestStatus>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(anyhow!("服务器错误: network down"));
        }
        Ok(self
            .server
            .lock()
            .unwrap()
            .interests
            .iter()
            .find(|i| i.from_user_id == user_id && i.to_user_id == other_user_id)
            .map(|i| i.status))
    }
}

/// 记录所有回调参数的监听器
#[derive(Default)]
pub struct RecordingListener {
    sent: Mutex<Vec<String>>,
    received: Mutex<Vec<String>>,
    stats: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub fn sent_events(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn received_events(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn stats_events(&self) -> Vec<String> {
        self.stats.lock().unwrap().clone()
    }
}

#[async_trait]
impl InterestListener for RecordingListener {
    async fn on_sent_interests_changed(&self, interests_json: String) {
        self.sent.lock().unwrap().push(interests_json);
    }

    async fn on_received_interests_changed(&self, interests_json: String) {
        self.received.lock().unwrap().push(interests_json);
    }

    async fn on_interest_stats_changed(&self, stats_json: String) {
        self.stats.lock().unwrap().push(stats_json);
    }
}
