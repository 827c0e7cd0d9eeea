//! 心动监听器回调接口

use async_trait::async_trait;

/// 心动监听器回调接口
///
/// 每次集合被整体替换或本地过滤后触发，参数均为 JSON 字符串
#[async_trait]
pub trait InterestListener: Send + Sync {
    /// 已发送心动列表发生变更，参数为 JSON 数组字符串
    async fn on_sent_interests_changed(&self, interests_json: String);

    /// 已收到心动列表发生变更，参数为 JSON 数组字符串
    async fn on_received_interests_changed(&self, interests_json: String);

    /// 统计数据（重新计算后），参数为 JSON 对象字符串
    async fn on_interest_stats_changed(&self, stats_json: String);
}

/// 默认空实现（无操作）
pub struct EmptyInterestListener;

#[async_trait]
impl InterestListener for EmptyInterestListener {
    async fn on_sent_interests_changed(&self, _interests_json: String) {}

    async fn on_received_interests_changed(&self, _interests_json: String) {}

    async fn on_interest_stats_changed(&self, _stats_json: String) {}
}
