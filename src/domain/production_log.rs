// ==========================================
// 车间在制品流转追踪系统 - 生产日志领域模型
// ==========================================
// 红线: 追加写入, 永不修改或删除; 台账状态原则上可由日志重放
// ==========================================

use crate::domain::types::{LogType, ProcessStep, Shift};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// ProductionLog - 生产日志 (不可变审计记录)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionLog {
    pub id: String,                      // 日志ID
    pub task_id: String,                 // 关联任务 (入库验证时为固定标记)
    pub machine_id: Option<String>,      // 机台
    pub item_id: String,                 // 成品
    pub sub_assembly_id: Option<String>, // 部件
    pub project_id: String,              // 项目
    pub step: ProcessStep,               // 工序
    pub shift: Shift,                    // 班次
    pub good_qty: i64,                   // 良品量
    pub defect_qty: i64,                 // 不良量
    pub operator: String,                // 操作工
    pub timestamp: DateTime<Utc>,        // 记录时刻
    pub log_type: LogType,               // OUTPUT / WAREHOUSE_ENTRY
}

impl ProductionLog {
    /// 构造一条报产日志
    #[allow(clippy::too_many_arguments)]
    pub fn output(
        task_id: &str,
        machine_id: Option<&str>,
        item_id: &str,
        sub_assembly_id: Option<&str>,
        project_id: &str,
        step: ProcessStep,
        shift: Shift,
        good_qty: i64,
        defect_qty: i64,
        operator: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.to_string(),
            machine_id: machine_id.map(|s| s.to_string()),
            item_id: item_id.to_string(),
            sub_assembly_id: sub_assembly_id.map(|s| s.to_string()),
            project_id: project_id.to_string(),
            step,
            shift,
            good_qty,
            defect_qty,
            operator: operator.to_string(),
            timestamp,
            log_type: LogType::Output,
        }
    }

    /// 构造一条入库验证日志
    pub fn warehouse_entry(
        item_id: &str,
        project_id: &str,
        packing_step: ProcessStep,
        qty: i64,
        operator: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: "WAREHOUSE".to_string(),
            machine_id: None,
            item_id: item_id.to_string(),
            sub_assembly_id: None,
            project_id: project_id.to_string(),
            step: packing_step,
            shift: crate::domain::types::Shift::Shift1,
            good_qty: qty,
            defect_qty: 0,
            operator: operator.to_string(),
            timestamp,
            log_type: LogType::WarehouseEntry,
        }
    }
}
