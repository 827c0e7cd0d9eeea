//! 心动（Interest）本地模型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 心动状态
///
/// 状态只会由服务器推进：pending -> accepted / rejected，客户端从不修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InterestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestStatus::Pending => "pending",
            InterestStatus::Accepted => "accepted",
            InterestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for InterestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 对方资料快照（服务器冗余返回，可能缺失）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::dating::types::deserialize_vec_or_null"
    )]
    pub images: Vec<String>,
}

/// 本地心动记录
///
/// `id` 已在边界处归一化（`id` 缺失时取 `_id`），下游只使用这一个键
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub status: InterestStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub from_profile: Option<ProfileSnapshot>,
    pub to_profile: Option<ProfileSnapshot>,
}

impl Interest {
    pub fn is_pending(&self) -> bool {
        self.status == InterestStatus::Pending
    }

    pub fn is_accepted(&self) -> bool {
        self.status == InterestStatus::Accepted
    }
}

/// 旧版手动回应类型（自动匹配后已废弃）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestResponse {
    Accept,
    Reject,
}

/// 由心动集合派生的统计数据，每次读取时重新计算
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestStats {
    pub total_sent_count: usize,
    pub pending_received_count: usize,
    pub accepted_count: usize,
    /// 自动匹配下恒等于 `accepted_count`
    pub matched_count: usize,
}

/// 心动仓库的一次完整读取结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestSnapshot {
    pub sent: Vec<Interest>,
    pub received: Vec<Interest>,
    pub loading: bool,
    pub sending: bool,
    pub stats: InterestStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_lowercase_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&InterestStatus::Accepted).unwrap(),
            "\"accepted\""
        );
        let s: InterestStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(s, InterestStatus::Rejected);
        assert!(serde_json::from_str::<InterestStatus>("\"cancelled\"").is_err());
    }

    #[test]
    fn profile_tolerates_null_images() {
        let p: ProfileSnapshot =
            serde_json::from_str(r#"{"name":"Mia","city":null,"images":null}"#).unwrap();
        assert_eq!(p.name.as_deref(), Some("Mia"));
        assert!(p.city.is_none());
        assert!(p.images.is_empty());
    }
}
