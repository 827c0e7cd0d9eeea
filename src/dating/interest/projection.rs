//! 心动统计投影（纯函数）

use crate::dating::interest::models::{Interest, InterestStats};

fn count_where(interests: &[Interest], pred: impl Fn(&Interest) -> bool) -> usize {
    interests.iter().filter(|i| pred(i)).count()
}

/// 根据已发送 / 已收到集合计算统计数据
pub fn project_stats(sent: &[Interest], received: &[Interest]) -> InterestStats {
    let accepted_count = count_where(sent, Interest::is_accepted);
    InterestStats {
        total_sent_count: sent.len(),
        pending_received_count: count_where(received, Interest::is_pending),
        accepted_count,
        matched_count: accepted_count,
    }
}
