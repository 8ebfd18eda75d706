// ==========================================
// 车间在制品流转追踪系统 - 任务领域模型
// ==========================================
// 任务是操作工唯一直接操作的实体: (成品, 可选部件, 工序) 三元组。
// 台账只作为报产的副作用被修改。
// ==========================================

use crate::domain::types::{ProcessStep, TaskStatus};
use serde::{Deserialize, Serialize};

// ==========================================
// Task - 生产任务
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,                      // 任务ID
    pub project_id: String,              // 所属项目
    pub item_id: String,                 // 所属成品
    pub sub_assembly_id: Option<String>, // 部件任务时为 Some
    pub step: ProcessStep,               // 工序
    pub machine_id: Option<String>,      // 绑定机台
    pub target_qty: i64,                 // 目标量
    pub completed_qty: i64,              // 累计良品量
    pub defect_qty: i64,                 // 累计不良量
    pub status: TaskStatus,              // 生命周期状态
    pub note: Option<String>,            // 备注
    pub total_downtime_minutes: i64,     // 累计停机分钟 (固定步进累加)
}

impl Task {
    /// 是否为部件任务
    pub fn is_sub_assembly_task(&self) -> bool {
        self.sub_assembly_id.is_some()
    }

    /// 剩余目标量 (不为负)
    pub fn remaining_qty(&self) -> i64 {
        (self.target_qty - self.completed_qty).max(0)
    }

    /// 完成判定: completed_qty >= target_qty
    pub fn is_target_reached(&self) -> bool {
        self.completed_qty >= self.target_qty
    }
}
