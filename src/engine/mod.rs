// ==========================================
// 车间在制品流转追踪系统 - 引擎层
// ==========================================
// 职责: 业务规则纯逻辑 (就绪量/库存传播/生命周期/日目标)
// 红线: 引擎无状态、无副作用、无 I/O; 持久化属于 API 层
// ==========================================

pub mod daily_target;
pub mod lifecycle;
pub mod propagation;
pub mod readiness;

// 重导出核心引擎
pub use daily_target::DailyTargetCore;
pub use lifecycle::{LifecycleCore, TaskTransition, DEFAULT_DOWNTIME_INCREMENT_MINUTES};
pub use propagation::PropagationCore;
pub use readiness::ReadinessCore;
