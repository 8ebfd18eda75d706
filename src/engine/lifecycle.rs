// ==========================================
// 车间在制品流转追踪系统 - 任务生命周期引擎
// ==========================================
// 职责: 任务状态迁移与机台状态镜像的纯规则
// 说明: 所有迁移均由操作工发起, 引擎不做超时/强制迁移;
//       COMPLETED 只能经由报产完成判定进入
// ==========================================

use crate::domain::types::{MachineStatus, TaskStatus};

/// 停机结束时累加的固定分钟数 (可由 config_kv 覆写)
///
/// 现场以固定步进计停机时长, 不按墙钟实测; 修订此口径走配置而非改码。
pub const DEFAULT_DOWNTIME_INCREMENT_MINUTES: i64 = 10;

// ==========================================
// TaskTransition - 操作工可发起的迁移
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskTransition {
    Start,         // 开工: → IN_PROGRESS
    Pause,         // 暂停: → PAUSED (回到排队, 不算完成)
    BeginDowntime, // 停机开始: → DOWNTIME
    EndDowntime,   // 停机结束: → IN_PROGRESS, 累加固定停机分钟
}

// ==========================================
// LifecycleCore - 纯函数工具类
// ==========================================
pub struct LifecycleCore;

impl LifecycleCore {
    /// 迁移后的任务状态
    ///
    /// 除完成判定外迁移是全函数: 已知任务的任何迁移请求都被接受
    /// ("同一机台至多一个运行/停机任务"是调用方的排队约定, 不是台账不变量)。
    pub fn next_status(transition: TaskTransition) -> TaskStatus {
        match transition {
            TaskTransition::Start => TaskStatus::InProgress,
            TaskTransition::Pause => TaskStatus::Paused,
            TaskTransition::BeginDowntime => TaskStatus::Downtime,
            TaskTransition::EndDowntime => TaskStatus::InProgress,
        }
    }

    /// 迁移附带的停机分钟增量 (仅停机结束时非零, 固定步进)
    pub fn downtime_increment(transition: TaskTransition, increment_minutes: i64) -> i64 {
        match transition {
            TaskTransition::EndDowntime => increment_minutes,
            _ => 0,
        }
    }

    /// 任务状态在机台上的镜像
    pub fn mirror_machine_status(task_status: TaskStatus) -> MachineStatus {
        match task_status {
            TaskStatus::InProgress => MachineStatus::Running,
            TaskStatus::Downtime => MachineStatus::Downtime,
            _ => MachineStatus::Idle,
        }
    }
}
