// ==========================================
// 车间在制品流转追踪系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化; *_with 变体供事务内组合
// ==========================================

pub mod error;
pub mod item_repo;
pub mod machine_repo;
pub mod production_log_repo;
pub mod task_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use item_repo::ItemRepository;
pub use machine_repo::MachineRepository;
pub use production_log_repo::ProductionLogRepository;
pub use task_repo::TaskRepository;
