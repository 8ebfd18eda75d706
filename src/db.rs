// ==========================================
// 车间在制品流转追踪系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 集中建表语句, 库与测试共用同一套 schema
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
///
/// 台账与工序列表以 JSON 列存储, 由领域层负责编解码。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS project_item (
            item_id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            name TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0,
            workflow_json TEXT NOT NULL DEFAULT '[]',
            ledger_json TEXT NOT NULL DEFAULT '{}',
            warehouse_qty INTEGER NOT NULL DEFAULT 0,
            shipped_qty INTEGER NOT NULL DEFAULT 0,
            is_workflow_locked INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS sub_assembly (
            sub_assembly_id TEXT PRIMARY KEY,
            item_id TEXT NOT NULL REFERENCES project_item(item_id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            qty_per_parent INTEGER NOT NULL DEFAULT 1,
            total_needed INTEGER NOT NULL DEFAULT 0,
            completed_qty INTEGER NOT NULL DEFAULT 0,
            total_produced INTEGER NOT NULL DEFAULT 0,
            processes_json TEXT NOT NULL DEFAULT '[]',
            ledger_json TEXT NOT NULL DEFAULT '{}',
            is_locked INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_sub_assembly_item ON sub_assembly(item_id);

        CREATE TABLE IF NOT EXISTS task (
            task_id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            item_id TEXT NOT NULL,
            sub_assembly_id TEXT,
            step TEXT NOT NULL,
            machine_id TEXT,
            target_qty INTEGER NOT NULL DEFAULT 0,
            completed_qty INTEGER NOT NULL DEFAULT 0,
            defect_qty INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'PENDING',
            note TEXT,
            total_downtime_minutes INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_task_item ON task(item_id);
        CREATE INDEX IF NOT EXISTS idx_task_step ON task(step);

        CREATE TABLE IF NOT EXISTS production_log (
            log_id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL,
            machine_id TEXT,
            item_id TEXT NOT NULL,
            sub_assembly_id TEXT,
            project_id TEXT NOT NULL,
            step TEXT NOT NULL,
            shift TEXT NOT NULL,
            good_qty INTEGER NOT NULL DEFAULT 0,
            defect_qty INTEGER NOT NULL DEFAULT 0,
            operator TEXT NOT NULL,
            ts TEXT NOT NULL,
            log_type TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_production_log_item ON production_log(item_id);
        CREATE INDEX IF NOT EXISTS idx_production_log_sub_assembly ON production_log(sub_assembly_id);

        CREATE TABLE IF NOT EXISTS machine (
            machine_id TEXT PRIMARY KEY,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            step_type TEXT NOT NULL,
            capacity_per_hour INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'IDLE',
            is_maintenance INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}
