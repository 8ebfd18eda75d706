// ==========================================
// 车间在制品流转追踪系统 - 生产日志仓储
// ==========================================
// 红线: 日志只追加; 本仓储不提供 UPDATE / DELETE
// ==========================================

use crate::domain::production_log::ProductionLog;
use crate::domain::types::{LogType, ProcessStep, Shift};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct ProductionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn from_row(row: &Row<'_>) -> RepositoryResult<ProductionLog> {
        let step_str: String = row.get(6)?;
        let shift_str: String = row.get(7)?;
        let ts_str: String = row.get(11)?;
        let type_str: String = row.get(12)?;
        let step = ProcessStep::from_str(&step_str).ok_or_else(|| {
            RepositoryError::DatabaseQueryError(format!("未知工序: {}", step_str))
        })?;
        let timestamp = DateTime::parse_from_rfc3339(&ts_str)
            .map_err(|e| RepositoryError::DatabaseQueryError(format!("时间戳解析失败: {}", e)))?
            .with_timezone(&Utc);
        Ok(ProductionLog {
            id: row.get(0)?,
            task_id: row.get(1)?,
            machine_id: row.get(2)?,
            item_id: row.get(3)?,
            sub_assembly_id: row.get(4)?,
            project_id: row.get(5)?,
            step,
            shift: Shift::from_str(&shift_str),
            good_qty: row.get(8)?,
            defect_qty: row.get(9)?,
            operator: row.get(10)?,
            timestamp,
            log_type: LogType::from_str(&type_str),
        })
    }

    // ==========================================
    // 写入操作 (仅追加)
    // ==========================================

    /// 追加一条日志
    pub fn insert(&self, log: &ProductionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, log)
    }

    /// 事务内追加变体
    pub fn insert_with(conn: &Connection, log: &ProductionLog) -> RepositoryResult<String> {
        conn.execute(
            r#"
            INSERT INTO production_log (
                log_id, task_id, machine_id, item_id, sub_assembly_id, project_id,
                step, shift, good_qty, defect_qty, operator, ts, log_type
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                log.id,
                log.task_id,
                log.machine_id,
                log.item_id,
                log.sub_assembly_id,
                log.project_id,
                log.step.to_db_str(),
                log.shift.to_db_str(),
                log.good_qty,
                log.defect_qty,
                log.operator,
                log.timestamp.to_rfc3339(),
                log.log_type.to_db_str(),
            ],
        )?;
        Ok(log.id.clone())
    }

    // ==========================================
    // 读取操作
    // ==========================================

    /// 某成品的日志 (新在前)
    pub fn list_by_item(&self, item_id: &str) -> RepositoryResult<Vec<ProductionLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT log_id, task_id, machine_id, item_id, sub_assembly_id, project_id,
                   step, shift, good_qty, defect_qty, operator, ts, log_type
            FROM production_log WHERE item_id = ?1 ORDER BY ts DESC
            "#,
        )?;
        let mut rows = stmt.query(params![item_id])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(Self::from_row(row)?);
        }
        Ok(result)
    }

    /// 某部件是否已被任何日志引用 (部件删除前置检查)
    pub fn exists_for_sub_assembly(&self, sa_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        Self::exists_for_sub_assembly_with(&conn, sa_id)
    }

    /// 事务内引用检查变体
    pub fn exists_for_sub_assembly_with(conn: &Connection, sa_id: &str) -> RepositoryResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(1) FROM production_log WHERE sub_assembly_id = ?1",
            params![sa_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
