// ==========================================
// 车间在制品流转追踪系统 - 生产操作 API
// ==========================================
// 职责: 报产、入库验证、任务启停停机、就绪量/日目标查询
// 红线: 报产的全部写入 (任务+台账+日志+机台镜像) 在单一事务内落盘
// 红线: 同一成品的变更操作串行化 (成品级互斥锁)
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::api::authorize::{Action, Authorizer};
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::item::ProjectItem;
use crate::domain::production_log::ProductionLog;
use crate::domain::task::Task;
use crate::domain::topology::ProcessTopology;
use crate::domain::types::{Shift, TaskStatus};
use crate::engine::lifecycle::{LifecycleCore, TaskTransition};
use crate::engine::{DailyTargetCore, PropagationCore, ReadinessCore};
use crate::repository::item_repo::ItemRepository;
use crate::repository::machine_repo::MachineRepository;
use crate::repository::production_log_repo::ProductionLogRepository;
use crate::repository::task_repo::TaskRepository;

// ==========================================
// ReportOutcome - 报产结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub task: Task,          // 提交后的任务
    pub item: ProjectItem,   // 提交后的成品 (含部件)
    pub log: ProductionLog,  // 追加的日志
    pub overshoot: bool,     // 申报量超过就绪量 (记账照常, 仅告警)
}

// ==========================================
// ProductionApi - 生产操作 API
// ==========================================
pub struct ProductionApi {
    conn: Arc<Mutex<Connection>>,
    task_repo: Arc<TaskRepository>,
    item_repo: Arc<ItemRepository>,
    config_manager: Arc<ConfigManager>,
    authorizer: Arc<dyn Authorizer>,
    topo: ProcessTopology,
    // 成品级互斥锁注册表: 同一成品的报产/入库串行执行
    item_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProductionApi {
    /// 创建新的 ProductionApi 实例
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        task_repo: Arc<TaskRepository>,
        item_repo: Arc<ItemRepository>,
        config_manager: Arc<ConfigManager>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            conn,
            task_repo,
            item_repo,
            config_manager,
            authorizer,
            topo: ProcessTopology::default(),
            item_locks: Mutex::new(HashMap::new()),
        }
    }

    /// 取某成品的互斥锁 (按需创建)
    fn item_lock(&self, item_id: &str) -> ApiResult<Arc<Mutex<()>>> {
        let mut registry = self
            .item_locks
            .lock()
            .map_err(|e| ApiError::InternalError(format!("成品锁注册表获取失败: {}", e)))?;
        Ok(registry
            .entry(item_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    fn lock_conn(&self) -> ApiResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::DatabaseError(format!("数据库锁获取失败: {}", e)))
    }

    fn load_task(conn: &Connection, task_id: &str) -> ApiResult<Task> {
        TaskRepository::find_by_id_with(conn, task_id)?
            .ok_or_else(|| ApiError::NotFound(format!("任务(id={})不存在", task_id)))
    }

    fn load_item(conn: &Connection, item_id: &str) -> ApiResult<ProjectItem> {
        ItemRepository::find_by_id_with(conn, item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("成品(id={})不存在", item_id)))
    }

    // ==========================================
    // 报产
    // ==========================================

    /// 报产: 操作工为某任务申报一次 (良品, 不良) 产出
    ///
    /// # 流程
    /// 1. 鉴权 + 数量校验 (good ≥ 0, defect ≥ 0, good+defect > 0)
    /// 2. 就绪量对照: 超过就绪量不拒绝, 标记 overshoot 并告警
    /// 3. 引擎推演台账效果 (内存副本)
    /// 4. 任务累进与完成判定 (completed_qty ≥ target_qty → COMPLETED);
    ///    完成态任务照常接受后续报产, 是否拦截由调用方把关
    /// 5. 任务 + 成品 + 日志 + 机台镜像在单一事务内落盘
    ///
    /// # 返回
    /// - Ok(ReportOutcome): 提交后的任务/成品/日志与超额标记
    pub fn report_production(
        &self,
        task_id: &str,
        good_qty: i64,
        defect_qty: i64,
        shift: Shift,
        operator: &str,
    ) -> ApiResult<ReportOutcome> {
        self.authorizer.authorize(operator, Action::ReportProduction)?;

        // 数量校验
        if good_qty < 0 || defect_qty < 0 {
            return Err(ApiError::InvalidInput("报产数量不能为负".to_string()));
        }
        if good_qty + defect_qty == 0 {
            return Err(ApiError::InvalidInput("良品与不良品不能同时为零".to_string()));
        }

        // 先读任务定位成品, 再取成品锁串行化
        let item_id = {
            let conn = self.lock_conn()?;
            Self::load_task(&conn, task_id)?.item_id
        };
        let item_lock = self.item_lock(&item_id)?;
        let _guard = item_lock
            .lock()
            .map_err(|e| ApiError::InternalError(format!("成品锁获取失败: {}", e)))?;

        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let mut task = Self::load_task(&tx, task_id)?;
        let mut item = Self::load_item(&tx, &task.item_id)?;

        // 就绪量对照 (只告警不拦截: 现场允许超额申报, 台账在 0 处截断)
        let ready = ReadinessCore::ready_quantity(&task, &item, &self.topo);
        let overshoot = good_qty + defect_qty > ready;
        if overshoot {
            warn!(
                task_id = %task.id,
                step = %task.step,
                good_qty,
                defect_qty,
                ready,
                "报产量超过就绪量, 照常记账"
            );
        }

        // 引擎推演台账效果
        match &task.sub_assembly_id {
            Some(sa_id) => {
                if item.sub_assembly(sa_id).is_none() {
                    return Err(ApiError::NotFound(format!("部件(id={})不存在", sa_id)));
                }
                PropagationCore::apply_sub_assembly_report(
                    &mut item, sa_id, &self.topo, task.step, good_qty, defect_qty,
                );
            }
            None => {
                PropagationCore::apply_assembly_report(
                    &mut item, &self.topo, task.step, good_qty, defect_qty,
                );
            }
        }

        // 任务累进与完成判定
        task.completed_qty += good_qty;
        task.defect_qty += defect_qty;
        if task.is_target_reached() {
            task.status = TaskStatus::Completed;
        }

        let log = ProductionLog::output(
            &task.id,
            task.machine_id.as_deref(),
            &task.item_id,
            task.sub_assembly_id.as_deref(),
            &task.project_id,
            task.step,
            shift,
            good_qty,
            defect_qty,
            operator,
            Utc::now(),
        );

        // 单一事务落盘
        TaskRepository::update_with(&tx, &task)?;
        ItemRepository::update_with(&tx, &item)?;
        ProductionLogRepository::insert_with(&tx, &log)?;
        if let Some(machine_id) = &task.machine_id {
            let mirror = LifecycleCore::mirror_machine_status(task.status);
            MachineRepository::update_status_with(&tx, machine_id, mirror)?;
        }
        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(
            task_id = %task.id,
            item_id = %item.id,
            step = %task.step,
            good_qty,
            defect_qty,
            overshoot,
            "报产提交完成"
        );

        Ok(ReportOutcome { task, item, log, overshoot })
    }

    // ==========================================
    // 入库验证
    // ==========================================

    /// 入库验证: 把包装工序已产出的成品计入仓库库存
    ///
    /// 包装工序 produced 截断扣减, warehouse_qty 增加, 追加入库日志。
    /// 该流动不可逆, 不提供反向操作。
    pub fn validate_to_warehouse(
        &self,
        item_id: &str,
        qty: i64,
        operator: &str,
    ) -> ApiResult<ProjectItem> {
        self.authorizer
            .authorize(operator, Action::ValidateToWarehouse)?;
        if qty <= 0 {
            return Err(ApiError::InvalidInput("入库数量必须为正".to_string()));
        }

        let item_lock = self.item_lock(item_id)?;
        let _guard = item_lock
            .lock()
            .map_err(|e| ApiError::InternalError(format!("成品锁获取失败: {}", e)))?;

        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let mut item = Self::load_item(&tx, item_id)?;
        let pending = item.ledger.produced(self.topo.packing_step());
        if qty > pending {
            warn!(item_id = %item.id, qty, pending, "入库量超过待验证量, produced 截断");
        }

        PropagationCore::apply_warehouse_validation(&mut item, &self.topo, qty);

        let log = ProductionLog::warehouse_entry(
            &item.id,
            &item.project_id,
            self.topo.packing_step(),
            qty,
            operator,
            Utc::now(),
        );

        ItemRepository::update_with(&tx, &item)?;
        ProductionLogRepository::insert_with(&tx, &log)?;
        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(item_id = %item.id, qty, warehouse_qty = item.warehouse_qty, "入库验证完成");
        Ok(item)
    }

    // ==========================================
    // 任务生命周期
    // ==========================================

    /// 开工: 任务进入 IN_PROGRESS, 绑定机台镜像为 RUNNING
    pub fn start_task(&self, task_id: &str, operator: &str) -> ApiResult<Task> {
        self.apply_transition(task_id, TaskTransition::Start, operator)
    }

    /// 暂停: 任务回到排队 (PAUSED), 进度保留
    pub fn pause_task(&self, task_id: &str, operator: &str) -> ApiResult<Task> {
        self.apply_transition(task_id, TaskTransition::Pause, operator)
    }

    /// 停机开始: 任务进入 DOWNTIME
    pub fn begin_downtime(&self, task_id: &str, operator: &str) -> ApiResult<Task> {
        self.apply_transition(task_id, TaskTransition::BeginDowntime, operator)
    }

    /// 停机结束: 任务恢复 IN_PROGRESS, 按固定步进累加停机分钟
    pub fn end_downtime(&self, task_id: &str, operator: &str) -> ApiResult<Task> {
        self.apply_transition(task_id, TaskTransition::EndDowntime, operator)
    }

    fn apply_transition(
        &self,
        task_id: &str,
        transition: TaskTransition,
        operator: &str,
    ) -> ApiResult<Task> {
        self.authorizer.authorize(operator, Action::ManageTask)?;

        // 配置读取与连接锁不可交叠 (共用同一连接互斥锁)
        let increment = self.config_manager.downtime_increment_minutes();

        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let mut task = Self::load_task(&tx, task_id)?;
        task.status = LifecycleCore::next_status(transition);
        task.total_downtime_minutes += LifecycleCore::downtime_increment(transition, increment);

        TaskRepository::update_with(&tx, &task)?;
        if let Some(machine_id) = &task.machine_id {
            let mirror = LifecycleCore::mirror_machine_status(task.status);
            MachineRepository::update_status_with(&tx, machine_id, mirror)?;
        }
        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(task_id = %task.id, status = %task.status, ?transition, "任务状态迁移");
        Ok(task)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 任务当前就绪量 (展示层唯一出口)
    pub fn ready_quantity(&self, task_id: &str) -> ApiResult<i64> {
        let conn = self.lock_conn()?;
        let task = Self::load_task(&conn, task_id)?;
        let item = Self::load_item(&conn, &task.item_id)?;
        Ok(ReadinessCore::ready_quantity(&task, &item, &self.topo))
    }

    /// 任务日目标: ceil(剩余量 / 剩余天数), 仅供展示
    pub fn daily_target(&self, task_id: &str, deadline: DateTime<Utc>) -> ApiResult<i64> {
        let conn = self.lock_conn()?;
        let task = Self::load_task(&conn, task_id)?;
        Ok(DailyTargetCore::compute(
            task.target_qty,
            task.completed_qty,
            deadline,
            Utc::now(),
        ))
    }

    /// 某成品下的全部任务
    pub fn list_tasks(&self, item_id: &str) -> ApiResult<Vec<Task>> {
        Ok(self.task_repo.list_by_item(item_id)?)
    }

    /// 按ID读取成品 (含部件与台账)
    pub fn get_item(&self, item_id: &str) -> ApiResult<ProjectItem> {
        Ok(self
            .item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("成品(id={})不存在", item_id)))?)
    }
}
