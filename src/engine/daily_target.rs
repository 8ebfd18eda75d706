// ==========================================
// 车间在制品流转追踪系统 - 日目标引擎
// ==========================================
// 职责: 剩余量 ÷ 剩余天数的无状态展示指标
// 红线: 仅供展示, 永不持久化, 永不反馈进台账
// ==========================================

use chrono::{DateTime, Utc};

// ==========================================
// DailyTargetCore - 纯函数工具类
// ==========================================
pub struct DailyTargetCore;

impl DailyTargetCore {
    /// 计算日目标
    ///
    /// # 规则
    /// - remaining = max(0, target_qty - completed_qty)
    /// - days_left = max(1, ceil((deadline - now) / 1天))
    /// - daily_target = ceil(remaining / days_left)
    ///
    /// # 返回
    /// - i64 ≥ 0 (超期或已完成时为按剩余量摊到 1 天 / 0)
    pub fn compute(
        target_qty: i64,
        completed_qty: i64,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> i64 {
        let remaining = (target_qty - completed_qty).max(0);
        let days_left = Self::days_left(deadline, now);
        Self::ceil_div(remaining, days_left)
    }

    /// 剩余天数: max(1, ceil(秒差 / 86400))
    pub fn days_left(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        let secs = (deadline - now).num_seconds();
        Self::ceil_div(secs.max(0), 86_400).max(1)
    }

    fn ceil_div(numerator: i64, denominator: i64) -> i64 {
        debug_assert!(denominator > 0);
        (numerator + denominator - 1) / denominator
    }
}
