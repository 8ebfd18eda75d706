// ==========================================
// 车间在制品流转追踪系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::engine::lifecycle::DEFAULT_DOWNTIME_INCREMENT_MINUTES;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 停机时长步进配置键
pub const KEY_DOWNTIME_INCREMENT_MINUTES: &str = "downtime_increment_minutes";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值 (UPSERT)
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 停机时长步进 (分钟)
    ///
    /// 每次结束停机为任务累加的固定分钟数; 解析失败或未配置时回退默认值
    pub fn downtime_increment_minutes(&self) -> i64 {
        match self.get_config_value(KEY_DOWNTIME_INCREMENT_MINUTES) {
            Ok(Some(v)) => v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .unwrap_or(DEFAULT_DOWNTIME_INCREMENT_MINUTES),
            _ => DEFAULT_DOWNTIME_INCREMENT_MINUTES,
        }
    }
}
