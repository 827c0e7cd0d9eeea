//! 心动网关接口
//!
//! 仓库只依赖这个 trait，HTTP 实现见 [`crate::dating::interest::api::InterestApi`]

use crate::dating::interest::models::{Interest, InterestStatus};
use anyhow::Result;
use async_trait::async_trait;

/// 心动相关的远端调用
///
/// 传输失败与服务器返回 `success: false` 都以 `Err` 返回，调用方统一处理
#[async_trait]
pub trait InterestGateway: Send + Sync {
    /// 获取用户发出的全部心动（id 已归一化）
    async fn get_sent_interests(&self, user_id: &str) -> Result<Vec<Interest>>;

    /// 获取用户收到的全部心动（id 已归一化）
    async fn get_received_interests(&self, user_id: &str) -> Result<Vec<Interest>>;

    /// 向 `to_user_id` 发送心动
    async fn send_interest(&self, to_user_id: &str) -> Result<()>;

    /// 删除发给 `to_user_id` 的心动
    async fn remove_interest(&self, to_user_id: &str) -> Result<()>;

    /// 查询 `user_id` 对 `other_user_id` 的心动状态，没有记录时返回 None
    async fn get_interest_status(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> Result<Option<InterestStatus>>;
}
