// ==========================================
// 车间在制品流转追踪系统 - 应用装配
// ==========================================
// 职责: 打开数据库、初始化 schema、装配仓储与 API
// 所有 API 共享同一个连接互斥锁, 保证事务串行
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{AllowAll, Authorizer, ProductionApi, StructureApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    ItemRepository, MachineRepository, ProductionLogRepository, TaskRepository,
};

// ==========================================
// AppState - 应用状态
// ==========================================
pub struct AppState {
    pub conn: Arc<Mutex<Connection>>,
    pub config_manager: Arc<ConfigManager>,
    pub item_repo: Arc<ItemRepository>,
    pub task_repo: Arc<TaskRepository>,
    pub log_repo: Arc<ProductionLogRepository>,
    pub machine_repo: Arc<MachineRepository>,
    pub production_api: Arc<ProductionApi>,
    pub structure_api: Arc<StructureApi>,
}

impl AppState {
    /// 打开数据库文件并完成装配
    pub fn new(db_path: &str) -> anyhow::Result<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        let conn = Arc::new(Mutex::new(conn));
        let authorizer: Arc<dyn Authorizer> = Arc::new(AllowAll);

        let config_manager = Arc::new(ConfigManager::from_connection(Arc::clone(&conn)));
        let item_repo = Arc::new(ItemRepository::new(Arc::clone(&conn)));
        let task_repo = Arc::new(TaskRepository::new(Arc::clone(&conn)));
        let log_repo = Arc::new(ProductionLogRepository::new(Arc::clone(&conn)));
        let machine_repo = Arc::new(MachineRepository::new(Arc::clone(&conn)));

        let production_api = Arc::new(ProductionApi::new(
            Arc::clone(&conn),
            Arc::clone(&task_repo),
            Arc::clone(&item_repo),
            Arc::clone(&config_manager),
            Arc::clone(&authorizer),
        ));
        let structure_api = Arc::new(StructureApi::new(
            Arc::clone(&conn),
            Arc::clone(&authorizer),
        ));

        Self {
            conn,
            config_manager,
            item_repo,
            task_repo,
            log_repo,
            machine_repo,
            production_api,
            structure_api,
        }
    }
}
