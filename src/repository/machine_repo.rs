// ==========================================
// 车间在制品流转追踪系统 - 机台仓储
// ==========================================

use crate::domain::machine::Machine;
use crate::domain::types::{MachineStatus, ProcessStep};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct MachineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn from_row(row: &Row<'_>) -> RepositoryResult<Machine> {
        let step_str: String = row.get(3)?;
        let status_str: String = row.get(5)?;
        let step = ProcessStep::from_str(&step_str).ok_or_else(|| {
            RepositoryError::DatabaseQueryError(format!("未知工序: {}", step_str))
        })?;
        Ok(Machine {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            step_type: step,
            capacity_per_hour: row.get(4)?,
            status: MachineStatus::from_str(&status_str),
            is_maintenance: row.get(6)?,
        })
    }

    /// 按ID查询机台
    pub fn find_by_id(&self, machine_id: &str) -> RepositoryResult<Machine> {
        let conn = self.get_conn()?;
        Self::find_by_id_with(&conn, machine_id)
    }

    /// 事务内查询变体
    pub fn find_by_id_with(conn: &Connection, machine_id: &str) -> RepositoryResult<Machine> {
        let mut stmt = conn.prepare(
            r#"
            SELECT machine_id, code, name, step_type, capacity_per_hour, status, is_maintenance
            FROM machine WHERE machine_id = ?1
            "#,
        )?;
        let mut rows = stmt.query(params![machine_id])?;
        match rows.next()? {
            Some(row) => Self::from_row(row),
            None => Err(RepositoryError::NotFound {
                entity: "机台".to_string(),
                id: machine_id.to_string(),
            }),
        }
    }

    /// 插入机台
    pub fn insert(&self, machine: &Machine) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO machine (machine_id, code, name, step_type, capacity_per_hour, status, is_maintenance)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                machine.id,
                machine.code,
                machine.name,
                machine.step_type.to_db_str(),
                machine.capacity_per_hour,
                machine.status.to_db_str(),
                machine.is_maintenance,
            ],
        )?;
        Ok(machine.id.clone())
    }

    /// 更新机台状态 (任务状态镜像)
    pub fn update_status(&self, machine_id: &str, status: MachineStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::update_status_with(&conn, machine_id, status)
    }

    /// 事务内状态更新变体
    pub fn update_status_with(
        conn: &Connection,
        machine_id: &str,
        status: MachineStatus,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE machine SET status = ?1 WHERE machine_id = ?2",
            params![status.to_db_str(), machine_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "机台".to_string(),
                id: machine_id.to_string(),
            });
        }
        Ok(())
    }
}
