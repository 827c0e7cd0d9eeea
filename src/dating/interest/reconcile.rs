//! 心动对账逻辑（纯函数）
//!
//! 负责互相心动检测以及删除操作的本地幂等处理

use crate::dating::interest::models::Interest;

/// 是否互相心动：我发出的待处理心动与对方发给我的待处理心动同时存在
///
/// 任一方缺失、被拒绝或已被服务器自动匹配（accepted）时都返回 false
pub fn is_mutual_interest(sent: &[Interest], received: &[Interest], counterpart_user_id: &str) -> bool {
    let sent_pending = sent
        .iter()
        .any(|i| i.to_user_id == counterpart_user_id && i.is_pending());
    if !sent_pending {
        return false;
    }
    received
        .iter()
        .any(|i| i.from_user_id == counterpart_user_id && i.is_pending())
}

/// 从已发送集合中移除发给 `counterpart_user_id` 的心动
///
/// 不存在匹配项时原样保留，返回被移除的条数
pub fn remove_sent_to(sent: &mut Vec<Interest>, counterpart_user_id: &str) -> usize {
    let before = sent.len();
    sent.retain(|i| i.to_user_id != counterpart_user_id);
    before - sent.len()
}
