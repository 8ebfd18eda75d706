// ==========================================
// 车间在制品流转追踪系统 - 领域类型定义
// ==========================================
// 职责: 工序/状态枚举与数据库字符串映射
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工序 (Process Step)
// ==========================================
// 两条互不相交的有序子序列:
// - 部件序列 (3道): CUTTING → PUNCHING → PRESSING
// - 总装序列 (4道): WELDING → PHOSPHATING → PAINTING → PACKING
// 顺序定义见 domain::topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStep {
    Cutting,     // 下料
    Punching,    // 冲孔
    Pressing,    // 压型
    Welding,     // 焊接 (汇流工序, 消耗部件)
    Phosphating, // 磷化
    Painting,    // 喷涂
    Packing,     // 包装 (总装末道)
}

impl fmt::Display for ProcessStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ProcessStep {
    /// 从字符串解析工序
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CUTTING" => Some(ProcessStep::Cutting),
            "PUNCHING" => Some(ProcessStep::Punching),
            "PRESSING" => Some(ProcessStep::Pressing),
            "WELDING" => Some(ProcessStep::Welding),
            "PHOSPHATING" => Some(ProcessStep::Phosphating),
            "PAINTING" => Some(ProcessStep::Painting),
            "PACKING" => Some(ProcessStep::Packing),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProcessStep::Cutting => "CUTTING",
            ProcessStep::Punching => "PUNCHING",
            ProcessStep::Pressing => "PRESSING",
            ProcessStep::Welding => "WELDING",
            ProcessStep::Phosphating => "PHOSPHATING",
            ProcessStep::Painting => "PAINTING",
            ProcessStep::Packing => "PACKING",
        }
    }
}

// ==========================================
// 任务状态 (Task Status)
// ==========================================
// 状态机: PENDING → IN_PROGRESS → (PAUSED | DOWNTIME | COMPLETED)
// COMPLETED 仅由报产完成判定进入 (engine::propagation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,    // 排队待开工
    InProgress, // 进行中
    Paused,     // 暂停 (操作工被调离, 回到排队)
    Completed,  // 完成 (终态)
    Downtime,   // 停机 (有记录的中断)
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl TaskStatus {
    /// 从字符串解析任务状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "IN_PROGRESS" => TaskStatus::InProgress,
            "PAUSED" => TaskStatus::Paused,
            "COMPLETED" => TaskStatus::Completed,
            "DOWNTIME" => TaskStatus::Downtime,
            _ => TaskStatus::Pending, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Paused => "PAUSED",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Downtime => "DOWNTIME",
        }
    }
}

// ==========================================
// 机台状态 (Machine Status)
// ==========================================
// 镜像当前绑定任务的状态, 不参与台账不变量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineStatus {
    Idle,        // 空闲
    Running,     // 运行中
    Maintenance, // 保养
    Offline,     // 离线
    Downtime,    // 停机
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl MachineStatus {
    /// 从字符串解析机台状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "RUNNING" => MachineStatus::Running,
            "MAINTENANCE" => MachineStatus::Maintenance,
            "OFFLINE" => MachineStatus::Offline,
            "DOWNTIME" => MachineStatus::Downtime,
            _ => MachineStatus::Idle,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MachineStatus::Idle => "IDLE",
            MachineStatus::Running => "RUNNING",
            MachineStatus::Maintenance => "MAINTENANCE",
            MachineStatus::Offline => "OFFLINE",
            MachineStatus::Downtime => "DOWNTIME",
        }
    }
}

// ==========================================
// 班次 (Shift)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Shift1, // 早班
    Shift2, // 中班
    Shift3, // 晚班
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Shift {
    /// 从字符串解析班次
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "SHIFT_2" => Shift::Shift2,
            "SHIFT_3" => Shift::Shift3,
            _ => Shift::Shift1,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Shift::Shift1 => "SHIFT_1",
            Shift::Shift2 => "SHIFT_2",
            Shift::Shift3 => "SHIFT_3",
        }
    }
}

// ==========================================
// 生产日志类型 (Log Type)
// ==========================================
// OUTPUT: 报产记录; WAREHOUSE_ENTRY: 成品入库验证记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogType {
    Output,
    WarehouseEntry,
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl LogType {
    /// 从字符串解析日志类型
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "WAREHOUSE_ENTRY" => LogType::WarehouseEntry,
            _ => LogType::Output,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            LogType::Output => "OUTPUT",
            LogType::WarehouseEntry => "WAREHOUSE_ENTRY",
        }
    }
}
