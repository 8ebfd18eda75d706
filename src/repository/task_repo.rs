// ==========================================
// 车间在制品流转追踪系统 - 任务仓储
// ==========================================
// 红线: Repository 不做业务逻辑, 只做数据映射
// ==========================================

use crate::domain::task::Task;
use crate::domain::types::{ProcessStep, TaskStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct TaskRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TaskRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn from_row(row: &Row<'_>) -> RepositoryResult<Task> {
        let step_str: String = row.get(4)?;
        let status_str: String = row.get(9)?;
        let step = ProcessStep::from_str(&step_str).ok_or_else(|| {
            RepositoryError::DatabaseQueryError(format!("未知工序: {}", step_str))
        })?;
        Ok(Task {
            id: row.get(0)?,
            project_id: row.get(1)?,
            item_id: row.get(2)?,
            sub_assembly_id: row.get(3)?,
            step,
            machine_id: row.get(5)?,
            target_qty: row.get(6)?,
            completed_qty: row.get(7)?,
            defect_qty: row.get(8)?,
            status: TaskStatus::from_str(&status_str),
            note: row.get(10)?,
            total_downtime_minutes: row.get(11)?,
        })
    }

    const SELECT_COLS: &'static str = r#"
        SELECT task_id, project_id, item_id, sub_assembly_id, step, machine_id,
               target_qty, completed_qty, defect_qty, status, note, total_downtime_minutes
        FROM task
    "#;

    // ==========================================
    // 读取操作
    // ==========================================

    /// 按ID查找任务
    pub fn find_by_id(&self, task_id: &str) -> RepositoryResult<Option<Task>> {
        let conn = self.get_conn()?;
        Self::find_by_id_with(&conn, task_id)
    }

    /// 事务内读取变体
    pub fn find_by_id_with(conn: &Connection, task_id: &str) -> RepositoryResult<Option<Task>> {
        let sql = format!("{} WHERE task_id = ?1", Self::SELECT_COLS);
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![task_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// 列出某成品下的全部任务
    pub fn list_by_item(&self, item_id: &str) -> RepositoryResult<Vec<Task>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE item_id = ?1 ORDER BY task_id", Self::SELECT_COLS);
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![item_id])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(Self::from_row(row)?);
        }
        Ok(result)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入任务
    pub fn insert(&self, task: &Task) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, task)
    }

    /// 事务内插入变体
    pub fn insert_with(conn: &Connection, task: &Task) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO task (
                task_id, project_id, item_id, sub_assembly_id, step, machine_id,
                target_qty, completed_qty, defect_qty, status, note, total_downtime_minutes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                task.id,
                task.project_id,
                task.item_id,
                task.sub_assembly_id,
                task.step.to_db_str(),
                task.machine_id,
                task.target_qty,
                task.completed_qty,
                task.defect_qty,
                task.status.to_db_str(),
                task.note,
                task.total_downtime_minutes,
            ],
        )?;
        Ok(())
    }

    /// 事务内整体回写任务
    pub fn update_with(conn: &Connection, task: &Task) -> RepositoryResult<()> {
        let updated = conn.execute(
            r#"
            UPDATE task SET
                machine_id = ?2, target_qty = ?3, completed_qty = ?4, defect_qty = ?5,
                status = ?6, note = ?7, total_downtime_minutes = ?8
            WHERE task_id = ?1
            "#,
            params![
                task.id,
                task.machine_id,
                task.target_qty,
                task.completed_qty,
                task.defect_qty,
                task.status.to_db_str(),
                task.note,
                task.total_downtime_minutes,
            ],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "任务".to_string(),
                id: task.id.clone(),
            });
        }
        Ok(())
    }

    /// 整体回写 (自行取锁变体)
    pub fn update(&self, task: &Task) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::update_with(&conn, task)
    }

    /// 事务内删除某成品的总装任务 (解锁工艺路线时; 不触碰部件任务)
    pub fn delete_assembly_tasks_with(conn: &Connection, item_id: &str) -> RepositoryResult<usize> {
        let rows = conn.execute(
            "DELETE FROM task WHERE item_id = ?1 AND sub_assembly_id IS NULL",
            params![item_id],
        )?;
        Ok(rows)
    }

    /// 事务内删除某部件的全部任务 (删除部件时)
    pub fn delete_by_sub_assembly_with(conn: &Connection, sa_id: &str) -> RepositoryResult<usize> {
        let rows = conn.execute(
            "DELETE FROM task WHERE sub_assembly_id = ?1",
            params![sa_id],
        )?;
        Ok(rows)
    }
}
