// ==========================================
// 车间在制品流转追踪系统 - 成品与部件领域模型
// ==========================================
// 成品 (ProjectItem) 独占拥有零或多个部件 (SubAssembly);
// 部件按固定配比 (qty_per_parent) 在焊接工序被消耗进成品。
// ==========================================

use crate::domain::ledger::Ledger;
use crate::domain::types::ProcessStep;
use serde::{Deserialize, Serialize};

// ==========================================
// SubAssembly - 部件
// ==========================================
// 锁定冻结的是结构编辑, 不冻结台账记账
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubAssembly {
    pub id: String,                  // 部件ID
    pub item_id: String,             // 所属成品 (独占)
    pub name: String,                // 部件名称
    pub qty_per_parent: i64,         // 每件成品消耗本部件数量
    pub total_needed: i64,           // 目标产量
    pub completed_qty: i64,          // 当前部件成品库存 (焊接消耗时扣减)
    pub total_produced: i64,         // 累计产出 (只增不减)
    pub processes: Vec<ProcessStep>, // 经过的部件工序 (有序子集)
    pub ledger: Ledger,              // 工序台账
    pub is_locked: bool,             // 结构锁定
}

impl SubAssembly {
    /// 初始化台账: 所有配置工序建条目, 首道工序 available = total_needed
    ///
    /// 首道工序没有上游缓冲, 它的可投入量就是部件自身的目标量。
    pub fn init_ledger(&mut self) {
        for (idx, step) in self.processes.iter().enumerate() {
            let stat = self.ledger.stat_mut(*step);
            if idx == 0 && stat.produced == 0 && stat.available == 0 {
                stat.available = self.total_needed;
            }
        }
    }

    /// 工序在本部件序列中的下标
    pub fn step_index(&self, step: ProcessStep) -> Option<usize> {
        self.processes.iter().position(|s| *s == step)
    }

    /// 工序是否为本部件序列末道
    pub fn is_last_step(&self, step: ProcessStep) -> bool {
        match self.step_index(step) {
            Some(idx) => idx + 1 == self.processes.len(),
            None => false,
        }
    }

    /// 本部件序列中某工序的紧邻后道
    pub fn next_step(&self, step: ProcessStep) -> Option<ProcessStep> {
        let idx = self.step_index(step)?;
        self.processes.get(idx + 1).copied()
    }
}

// ==========================================
// ProjectItem - 成品
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectItem {
    pub id: String,                 // 成品ID
    pub project_id: String,         // 所属项目
    pub name: String,               // 成品名称
    pub quantity: i64,              // 目标产量
    pub workflow: Vec<ProcessStep>, // 配置运行的总装工序 (有序)
    pub ledger: Ledger,             // 总装工序台账
    pub warehouse_qty: i64,         // 已验证入库的成品库存
    pub shipped_qty: i64,           // 已发货量
    pub is_workflow_locked: bool,   // 工艺路线锁定
    #[serde(default)]
    pub sub_assemblies: Vec<SubAssembly>, // 独占拥有的部件
}

impl ProjectItem {
    /// 查找某部件
    pub fn sub_assembly(&self, sa_id: &str) -> Option<&SubAssembly> {
        self.sub_assemblies.iter().find(|sa| sa.id == sa_id)
    }

    /// 查找某部件 (可变)
    pub fn sub_assembly_mut(&mut self, sa_id: &str) -> Option<&mut SubAssembly> {
        self.sub_assemblies.iter_mut().find(|sa| sa.id == sa_id)
    }

    /// 可发货库存 = 入库量 - 已发货量
    pub fn available_stock(&self) -> i64 {
        self.warehouse_qty - self.shipped_qty
    }
}
