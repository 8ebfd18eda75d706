// ==========================================
// 车间在制品流转追踪系统 - 成品/部件仓储
// ==========================================
// 红线: Repository 不做业务逻辑, 只做数据映射
// 说明: 台账与工序列表是 JSON 列; 成品总是连同其部件整体加载,
//       满足"独占拥有"的聚合读取
// ==========================================

use crate::domain::item::{ProjectItem, SubAssembly};
use crate::domain::ledger::Ledger;
use crate::domain::types::ProcessStep;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 读取操作
    // ==========================================

    /// 按ID加载成品 (连同全部部件)
    pub fn find_by_id(&self, item_id: &str) -> RepositoryResult<Option<ProjectItem>> {
        let conn = self.get_conn()?;
        Self::find_by_id_with(&conn, item_id)
    }

    /// 事务内读取变体: 调用方持有连接/事务
    pub fn find_by_id_with(conn: &Connection, item_id: &str) -> RepositoryResult<Option<ProjectItem>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT item_id, project_id, name, quantity, workflow_json,
                   ledger_json, warehouse_qty, shipped_qty, is_workflow_locked
            FROM project_item WHERE item_id = ?1
            "#,
        )?;
        let mut rows = stmt.query(params![item_id])?;

        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut item = Self::item_from_row(row)?;
        item.sub_assemblies = Self::load_sub_assemblies(conn, item_id)?;
        Ok(Some(item))
    }

    fn load_sub_assemblies(conn: &Connection, item_id: &str) -> RepositoryResult<Vec<SubAssembly>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT sub_assembly_id, item_id, name, qty_per_parent, total_needed,
                   completed_qty, total_produced, processes_json, ledger_json, is_locked
            FROM sub_assembly WHERE item_id = ?1 ORDER BY sub_assembly_id
            "#,
        )?;
        let mut rows = stmt.query(params![item_id])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(Self::sub_assembly_from_row(row)?);
        }
        Ok(result)
    }

    fn item_from_row(row: &Row<'_>) -> RepositoryResult<ProjectItem> {
        let workflow_json: String = row.get(4)?;
        let ledger_json: String = row.get(5)?;
        let workflow: Vec<ProcessStep> = serde_json::from_str(&workflow_json)?;
        Ok(ProjectItem {
            id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
            quantity: row.get(3)?,
            workflow,
            ledger: Ledger::from_json(&ledger_json),
            warehouse_qty: row.get(6)?,
            shipped_qty: row.get(7)?,
            is_workflow_locked: row.get::<_, i64>(8)? != 0,
            sub_assemblies: Vec::new(),
        })
    }

    fn sub_assembly_from_row(row: &Row<'_>) -> RepositoryResult<SubAssembly> {
        let processes_json: String = row.get(7)?;
        let ledger_json: String = row.get(8)?;
        let processes: Vec<ProcessStep> = serde_json::from_str(&processes_json)?;
        Ok(SubAssembly {
            id: row.get(0)?,
            item_id: row.get(1)?,
            name: row.get(2)?,
            qty_per_parent: row.get(3)?,
            total_needed: row.get(4)?,
            completed_qty: row.get(5)?,
            total_produced: row.get(6)?,
            processes,
            ledger: Ledger::from_json(&ledger_json),
            is_locked: row.get::<_, i64>(9)? != 0,
        })
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入成品 (不含部件, 部件单独插入)
    pub fn insert(&self, item: &ProjectItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, item)
    }

    /// 事务内插入变体
    pub fn insert_with(conn: &Connection, item: &ProjectItem) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO project_item (
                item_id, project_id, name, quantity, workflow_json,
                ledger_json, warehouse_qty, shipped_qty, is_workflow_locked
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                item.id,
                item.project_id,
                item.name,
                item.quantity,
                serde_json::to_string(&item.workflow)?,
                item.ledger.to_json()?,
                item.warehouse_qty,
                item.shipped_qty,
                item.is_workflow_locked as i64,
            ],
        )?;
        Ok(())
    }

    /// 插入部件
    pub fn insert_sub_assembly(&self, sa: &SubAssembly) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_sub_assembly_with(&conn, sa)
    }

    /// 事务内插入部件变体
    pub fn insert_sub_assembly_with(conn: &Connection, sa: &SubAssembly) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO sub_assembly (
                sub_assembly_id, item_id, name, qty_per_parent, total_needed,
                completed_qty, total_produced, processes_json, ledger_json, is_locked
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                sa.id,
                sa.item_id,
                sa.name,
                sa.qty_per_parent,
                sa.total_needed,
                sa.completed_qty,
                sa.total_produced,
                serde_json::to_string(&sa.processes)?,
                sa.ledger.to_json()?,
                sa.is_locked as i64,
            ],
        )?;
        Ok(())
    }

    /// 事务内整体回写成品 + 全部部件
    ///
    /// 报产的台账效果跨成品与部件两张表, 必须与任务/日志同事务落库。
    pub fn update_with(conn: &Connection, item: &ProjectItem) -> RepositoryResult<()> {
        let updated = conn.execute(
            r#"
            UPDATE project_item SET
                quantity = ?2, workflow_json = ?3, ledger_json = ?4,
                warehouse_qty = ?5, shipped_qty = ?6, is_workflow_locked = ?7
            WHERE item_id = ?1
            "#,
            params![
                item.id,
                item.quantity,
                serde_json::to_string(&item.workflow)?,
                item.ledger.to_json()?,
                item.warehouse_qty,
                item.shipped_qty,
                item.is_workflow_locked as i64,
            ],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "成品".to_string(),
                id: item.id.clone(),
            });
        }
        for sa in &item.sub_assemblies {
            conn.execute(
                r#"
                UPDATE sub_assembly SET
                    name = ?2, qty_per_parent = ?3, total_needed = ?4,
                    completed_qty = ?5, total_produced = ?6,
                    processes_json = ?7, ledger_json = ?8, is_locked = ?9
                WHERE sub_assembly_id = ?1
                "#,
                params![
                    sa.id,
                    sa.name,
                    sa.qty_per_parent,
                    sa.total_needed,
                    sa.completed_qty,
                    sa.total_produced,
                    serde_json::to_string(&sa.processes)?,
                    sa.ledger.to_json()?,
                    sa.is_locked as i64,
                ],
            )?;
        }
        Ok(())
    }

    /// 整体回写 (自行取锁变体)
    pub fn update(&self, item: &ProjectItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::update_with(&conn, item)
    }

    /// 锁定部件 (冻结结构编辑, 不冻结台账记账)
    pub fn lock_sub_assembly_with(conn: &Connection, sa_id: &str) -> RepositoryResult<()> {
        let updated = conn.execute(
            "UPDATE sub_assembly SET is_locked = 1 WHERE sub_assembly_id = ?1",
            params![sa_id],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "部件".to_string(),
                id: sa_id.to_string(),
            });
        }
        Ok(())
    }

    /// 删除部件 (任务连带删除由 API 层在同事务内完成)
    pub fn delete_sub_assembly_with(conn: &Connection, sa_id: &str) -> RepositoryResult<()> {
        conn.execute(
            "DELETE FROM sub_assembly WHERE sub_assembly_id = ?1",
            params![sa_id],
        )?;
        Ok(())
    }
}
