//! 心动 API DTO（请求和响应结构体）

use crate::dating::interest::models::{Interest, InterestStatus, ProfileSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 服务器返回的原始心动记录
///
/// 部分接口返回 `_id` 而不是 `id`，两者都保留，由 [`RawInterest::normalize`] 统一
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInterest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "_id", default)]
    pub legacy_id: Option<String>,
    pub from_user_id: String,
    pub to_user_id: String,
    pub status: InterestStatus,
    /// 格式错误或类型不符时为 None，不影响整条记录
    #[serde(
        default,
        deserialize_with = "crate::dating::types::deserialize_timestamp_lenient"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub from_profile: Option<ProfileSnapshot>,
    #[serde(default)]
    pub to_profile: Option<ProfileSnapshot>,
}

impl RawInterest {
    /// 归一化为本地记录：`id := id ?? _id`，两者都缺失时返回 None
    pub fn normalize(self) -> Option<Interest> {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .or(self.legacy_id.filter(|id| !id.is_empty()))?;
        Some(Interest {
            id,
            from_user_id: self.from_user_id,
            to_user_id: self.to_user_id,
            status: self.status,
            created_at: self.created_at,
            from_profile: self.from_profile,
            to_profile: self.to_profile,
        })
    }
}

/// 批量归一化，丢弃无法得到 id 的记录
pub fn normalize_interests(raw: Vec<RawInterest>) -> Vec<Interest> {
    raw.into_iter()
        .filter_map(|r| {
            let (from, to) = (r.from_user_id.clone(), r.to_user_id.clone());
            let normalized = r.normalize();
            if normalized.is_none() {
                warn!(
                    "[InterestAPI] 丢弃缺少 id/_id 的心动记录: {} -> {}",
                    from, to
                );
            }
            normalized
        })
        .collect()
}

/// 逐条解析服务器返回的心动列表
///
/// 单条记录无法解析（未知状态、缺少参与者字段等）时只丢弃该条并记录警告，
/// 其余记录照常归一化
pub fn decode_interest_records(records: Vec<serde_json::Value>) -> Vec<Interest> {
    let raw: Vec<RawInterest> = records
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawInterest>(value) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!("[InterestAPI] 丢弃无法解析的心动记录: {}", e);
                None
            }
        })
        .collect();
    normalize_interests(raw)
}

/// 发送心动请求
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInterestReq {
    pub to_user_id: String,
}

/// 单点心动状态查询响应，`status` 为 null 表示双方之间没有心动记录
#[derive(Debug, Clone, Deserialize)]
pub struct InterestStatusResp {
    #[serde(default)]
    pub status: Option<InterestStatus>,
}
