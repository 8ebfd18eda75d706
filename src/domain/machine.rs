// ==========================================
// 车间在制品流转追踪系统 - 机台领域模型
// ==========================================
// 机台状态只是所绑定任务状态的镜像, 不参与台账不变量
// ==========================================

use crate::domain::types::{MachineStatus, ProcessStep};
use serde::{Deserialize, Serialize};

// ==========================================
// Machine - 机台
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,                // 机台ID
    pub code: String,              // 机台编号
    pub name: String,              // 机台名称
    pub step_type: ProcessStep,    // 承担工序
    pub capacity_per_hour: i64,    // 小时产能 (仅展示)
    pub status: MachineStatus,     // 状态 (镜像任务)
    pub is_maintenance: bool,      // 是否保养中
}
