// ==========================================
// 车间在制品流转追踪系统 - 领域层
// ==========================================
// 职责: 实体与类型定义, 纯数据 + 小型不变量辅助
// 红线: 领域层不做 I/O, 不依赖仓储与引擎
// ==========================================

pub mod item;
pub mod ledger;
pub mod machine;
pub mod production_log;
pub mod task;
pub mod topology;
pub mod types;

// 重导出核心实体
pub use item::{ProjectItem, SubAssembly};
pub use ledger::{Ledger, StepStat};
pub use machine::Machine;
pub use production_log::ProductionLog;
pub use task::Task;
pub use topology::{ConvergenceEdge, ProcessTopology, ASSEMBLY_STEPS, COMPONENT_STEPS, CONVERGENCE_EDGE};
pub use types::{LogType, MachineStatus, ProcessStep, Shift, TaskStatus};
