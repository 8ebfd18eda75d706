// ==========================================
// 车间在制品流转追踪系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 封装事务边界与并发控制
// ==========================================

pub mod authorize;
pub mod error;
pub mod production_api;
pub mod structure_api;

// 重导出核心类型
pub use authorize::{Action, AllowAll, Authorizer};
pub use error::{ApiError, ApiResult};
pub use production_api::{ProductionApi, ReportOutcome};
pub use structure_api::StructureApi;
