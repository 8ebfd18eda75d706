// ==========================================
// 车间在制品流转追踪系统 - 结构维护 API
// ==========================================
// 职责: 成品/部件结构的创建、锁定与删除, 工艺路线确认
// 红线: 锁定冻结的是结构编辑, 不冻结台账记账
// 红线: 被日志引用过的部件不可删除 (审计链不可断)
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

use crate::api::authorize::{Action, Authorizer};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::item::{ProjectItem, SubAssembly};
use crate::domain::ledger::Ledger;
use crate::domain::task::Task;
use crate::domain::topology::COMPONENT_STEPS;
use crate::domain::types::{ProcessStep, TaskStatus};
use crate::repository::item_repo::ItemRepository;
use crate::repository::production_log_repo::ProductionLogRepository;
use crate::repository::task_repo::TaskRepository;

// ==========================================
// StructureApi - 结构维护 API
// ==========================================
pub struct StructureApi {
    conn: Arc<Mutex<Connection>>,
    authorizer: Arc<dyn Authorizer>,
}

impl StructureApi {
    /// 创建新的 StructureApi 实例
    pub fn new(conn: Arc<Mutex<Connection>>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { conn, authorizer }
    }

    fn lock_conn(&self) -> ApiResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::DatabaseError(format!("数据库锁获取失败: {}", e)))
    }

    fn load_item(conn: &Connection, item_id: &str) -> ApiResult<ProjectItem> {
        ItemRepository::find_by_id_with(conn, item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("成品(id={})不存在", item_id)))
    }

    // ==========================================
    // 成品
    // ==========================================

    /// 创建成品 (工艺路线未锁定, 台账为空)
    pub fn add_item(
        &self,
        project_id: &str,
        name: &str,
        quantity: i64,
        workflow: Vec<ProcessStep>,
        operator: &str,
    ) -> ApiResult<ProjectItem> {
        self.authorizer.authorize(operator, Action::ManageStructure)?;
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("成品名称不能为空".to_string()));
        }
        if quantity <= 0 {
            return Err(ApiError::InvalidInput("目标产量必须为正".to_string()));
        }

        let item = ProjectItem {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            name: name.to_string(),
            quantity,
            workflow,
            ledger: Ledger::new(),
            warehouse_qty: 0,
            shipped_qty: 0,
            is_workflow_locked: false,
            sub_assemblies: Vec::new(),
        };

        let conn = self.lock_conn()?;
        ItemRepository::insert_with(&conn, &item)?;
        info!(item_id = %item.id, name = %item.name, "成品已创建");
        Ok(item)
    }

    // ==========================================
    // 部件
    // ==========================================

    /// 添加部件: 台账初始化 + 每道部件工序一个排队任务, 同事务落库
    ///
    /// 工序序列必须是部件工序链的有序子集 (全链或裁剪链均可)。
    /// 首道工序 available = total_needed (无上游缓冲)。
    pub fn add_sub_assembly(
        &self,
        item_id: &str,
        name: &str,
        qty_per_parent: i64,
        total_needed: i64,
        processes: Vec<ProcessStep>,
        operator: &str,
    ) -> ApiResult<SubAssembly> {
        self.authorizer.authorize(operator, Action::ManageStructure)?;
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("部件名称不能为空".to_string()));
        }
        if qty_per_parent <= 0 {
            return Err(ApiError::InvalidInput("单件配比必须为正".to_string()));
        }
        if total_needed <= 0 {
            return Err(ApiError::InvalidInput("目标产量必须为正".to_string()));
        }
        if processes.is_empty() {
            return Err(ApiError::InvalidInput("部件工序序列不能为空".to_string()));
        }
        if !Self::is_ordered_component_subset(&processes) {
            return Err(ApiError::InvalidInput(
                "部件工序序列必须是部件工序链的有序子集".to_string(),
            ));
        }

        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let item = Self::load_item(&tx, item_id)?;

        let mut sa = SubAssembly {
            id: Uuid::new_v4().to_string(),
            item_id: item.id.clone(),
            name: name.to_string(),
            qty_per_parent,
            total_needed,
            completed_qty: 0,
            total_produced: 0,
            processes,
            ledger: Ledger::new(),
            is_locked: false,
        };
        sa.init_ledger();

        ItemRepository::insert_sub_assembly_with(&tx, &sa)?;
        for step in &sa.processes {
            let task = Self::pending_task(&item, Some(&sa.id), *step, total_needed);
            TaskRepository::insert_with(&tx, &task)?;
        }
        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(item_id = %item.id, sub_assembly_id = %sa.id, name = %sa.name, "部件已添加");
        Ok(sa)
    }

    /// 锁定部件结构
    pub fn lock_sub_assembly(&self, item_id: &str, sa_id: &str, operator: &str) -> ApiResult<()> {
        self.authorizer.authorize(operator, Action::ManageStructure)?;

        let conn = self.lock_conn()?;
        let item = Self::load_item(&conn, item_id)?;
        if item.sub_assembly(sa_id).is_none() {
            return Err(ApiError::NotFound(format!("部件(id={})不存在", sa_id)));
        }
        ItemRepository::lock_sub_assembly_with(&conn, sa_id)?;
        info!(sub_assembly_id = %sa_id, "部件已锁定");
        Ok(())
    }

    /// 删除部件: 锁定或被日志引用过的部件拒绝删除, 连带删除其任务
    pub fn delete_sub_assembly(&self, item_id: &str, sa_id: &str, operator: &str) -> ApiResult<()> {
        self.authorizer.authorize(operator, Action::ManageStructure)?;

        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let item = Self::load_item(&tx, item_id)?;
        let sa = item
            .sub_assembly(sa_id)
            .ok_or_else(|| ApiError::NotFound(format!("部件(id={})不存在", sa_id)))?;

        if sa.is_locked {
            return Err(ApiError::BusinessRuleViolation(format!(
                "部件{}已锁定, 不可删除",
                sa.name
            )));
        }
        if ProductionLogRepository::exists_for_sub_assembly_with(&tx, sa_id)? {
            return Err(ApiError::BusinessRuleViolation(format!(
                "部件{}已有生产日志, 不可删除",
                sa.name
            )));
        }

        TaskRepository::delete_by_sub_assembly_with(&tx, sa_id)?;
        ItemRepository::delete_sub_assembly_with(&tx, sa_id)?;
        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(item_id = %item_id, sub_assembly_id = %sa_id, "部件已删除");
        Ok(())
    }

    // ==========================================
    // 工艺路线
    // ==========================================

    /// 确认工艺路线: 锁定 + 每道总装工序一个排队任务, 同事务落库
    pub fn validate_workflow(&self, item_id: &str, operator: &str) -> ApiResult<ProjectItem> {
        self.authorizer.authorize(operator, Action::ManageStructure)?;

        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let mut item = Self::load_item(&tx, item_id)?;
        if item.is_workflow_locked {
            return Err(ApiError::BusinessRuleViolation(format!(
                "成品{}的工艺路线已锁定",
                item.name
            )));
        }
        if item.workflow.is_empty() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "成品{}未配置工艺路线",
                item.name
            )));
        }

        item.is_workflow_locked = true;
        ItemRepository::update_with(&tx, &item)?;
        for step in item.workflow.clone() {
            let task = Self::pending_task(&item, None, step, item.quantity);
            TaskRepository::insert_with(&tx, &task)?;
        }
        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(item_id = %item.id, "工艺路线已确认并锁定");
        Ok(item)
    }

    /// 解锁工艺路线: 回到可编辑态, 删除全部总装任务 (部件任务保留)
    pub fn unlock_workflow(&self, item_id: &str, operator: &str) -> ApiResult<ProjectItem> {
        self.authorizer.authorize(operator, Action::ManageStructure)?;

        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let mut item = Self::load_item(&tx, item_id)?;
        if !item.is_workflow_locked {
            return Err(ApiError::BusinessRuleViolation(format!(
                "成品{}的工艺路线未锁定",
                item.name
            )));
        }

        item.is_workflow_locked = false;
        ItemRepository::update_with(&tx, &item)?;
        let removed = TaskRepository::delete_assembly_tasks_with(&tx, item_id)?;
        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(item_id = %item.id, removed_tasks = removed, "工艺路线已解锁");
        Ok(item)
    }

    // ==========================================
    // 内部工具
    // ==========================================

    /// 判断工序序列是否为部件工序链的有序子集 (无重复、保持链序)
    fn is_ordered_component_subset(processes: &[ProcessStep]) -> bool {
        let mut chain = COMPONENT_STEPS.iter();
        processes
            .iter()
            .all(|step| chain.any(|chained| chained == step))
    }

    fn pending_task(
        item: &ProjectItem,
        sub_assembly_id: Option<&str>,
        step: ProcessStep,
        target_qty: i64,
    ) -> Task {
        Task {
            id: Uuid::new_v4().to_string(),
            project_id: item.project_id.clone(),
            item_id: item.id.clone(),
            sub_assembly_id: sub_assembly_id.map(|s| s.to_string()),
            step,
            machine_id: None,
            target_qty,
            completed_qty: 0,
            defect_qty: 0,
            status: TaskStatus::Pending,
            note: None,
            total_downtime_minutes: 0,
        }
    }
}
