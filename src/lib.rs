// ==========================================
// 车间在制品流转追踪系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 多工序在制品流转与就绪量追踪
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{LogType, MachineStatus, ProcessStep, Shift, TaskStatus};

// 领域实体
pub use domain::{
    Ledger, Machine, ProcessTopology, ProductionLog, ProjectItem, StepStat, SubAssembly, Task,
};

// 引擎
pub use engine::{
    DailyTargetCore, LifecycleCore, PropagationCore, ReadinessCore, TaskTransition,
};

// API
pub use api::{ProductionApi, ReportOutcome, StructureApi};

// 应用状态
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "车间在制品流转追踪系统";

// ==========================================
// 预编译检查
// ==========================================
