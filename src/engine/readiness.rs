// ==========================================
// 车间在制品流转追踪系统 - 就绪量引擎
// ==========================================
// 职责: 回答"这个任务现在能做多少", 台账与拓扑的纯只读函数
// 红线: 无状态、无副作用、无 I/O; 全系统唯一的就绪量出口,
//       禁止在展示层重复实现
// ==========================================

use crate::domain::item::{ProjectItem, SubAssembly};
use crate::domain::task::Task;
use crate::domain::topology::ProcessTopology;

// ==========================================
// ReadinessCore - 纯函数工具类
// ==========================================
pub struct ReadinessCore;

impl ReadinessCore {
    /// 计算任务当前就绪量
    ///
    /// # 规则
    /// - 部件任务, 序列首道: max(0, total_needed - 本工序 produced)
    /// - 部件任务, 其余工序: 本部件序列紧邻前道的 available
    /// - 成品任务, 汇流工序 (焊接): 有部件时为
    ///   min over 部件 floor(completed_qty / qty_per_parent);
    ///   无部件时为 max(0, target - completed)
    /// - 成品任务, 其余总装工序: 紧邻前道的 available
    /// - 工序不在序列内 / 无前道且非汇流: max(0, target - completed)
    /// - 零配置工序的实体: 0
    ///
    /// 对良构任务永不失败; 引用无法解析时返回 0。
    pub fn ready_quantity(task: &Task, item: &ProjectItem, topo: &ProcessTopology) -> i64 {
        match &task.sub_assembly_id {
            Some(sa_id) => match item.sub_assembly(sa_id) {
                Some(sa) => Self::sub_assembly_ready(task, sa),
                None => 0,
            },
            None => Self::assembly_ready(task, item, topo),
        }
    }

    /// 部件任务就绪量
    pub fn sub_assembly_ready(task: &Task, sa: &SubAssembly) -> i64 {
        if sa.processes.is_empty() {
            return 0;
        }
        match sa.step_index(task.step) {
            None => 0,
            Some(0) => {
                // 首道: 部件自身未完成的目标量, 不看上游缓冲
                (sa.total_needed - sa.ledger.produced(task.step)).max(0)
            }
            Some(idx) => sa.ledger.available(sa.processes[idx - 1]),
        }
    }

    /// 成品任务就绪量
    pub fn assembly_ready(task: &Task, item: &ProjectItem, topo: &ProcessTopology) -> i64 {
        if item.workflow.is_empty() {
            return 0;
        }
        if topo.is_convergence_target(task.step) {
            if item.sub_assemblies.is_empty() {
                // 无部件的自给路径
                return task.remaining_qty();
            }
            // 焊接速度受限于最稀缺的部件
            return item
                .sub_assemblies
                .iter()
                .map(|sa| sa.completed_qty / sa.qty_per_parent.max(1))
                .min()
                .unwrap_or(0);
        }
        match topo.prev_assembly_step(task.step) {
            Some(prev) => item.ledger.available(prev),
            // 无前道且非汇流工序: 回退到剩余目标量
            None => task.remaining_qty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::Ledger;
    use crate::domain::topology::COMPONENT_STEPS;
    use crate::domain::types::{ProcessStep, TaskStatus};

    fn make_sub_assembly(total_needed: i64, qty_per_parent: i64, completed: i64) -> SubAssembly {
        let mut sa = SubAssembly {
            id: "sa-1".to_string(),
            item_id: "item-1".to_string(),
            name: "侧板".to_string(),
            qty_per_parent,
            total_needed,
            completed_qty: completed,
            total_produced: 0,
            processes: COMPONENT_STEPS.to_vec(),
            ledger: Ledger::new(),
            is_locked: false,
        };
        sa.init_ledger();
        sa
    }

    fn make_item() -> ProjectItem {
        ProjectItem {
            id: "item-1".to_string(),
            project_id: "proj-1".to_string(),
            name: "钢柜".to_string(),
            quantity: 50,
            workflow: crate::domain::topology::ASSEMBLY_STEPS.to_vec(),
            ledger: Ledger::new(),
            warehouse_qty: 0,
            shipped_qty: 0,
            is_workflow_locked: true,
            sub_assemblies: Vec::new(),
        }
    }

    fn make_task(step: ProcessStep, sub_assembly_id: Option<&str>, target: i64, completed: i64) -> Task {
        Task {
            id: "task-1".to_string(),
            project_id: "proj-1".to_string(),
            item_id: "item-1".to_string(),
            sub_assembly_id: sub_assembly_id.map(|s| s.to_string()),
            step,
            machine_id: None,
            target_qty: target,
            completed_qty: completed,
            defect_qty: 0,
            status: TaskStatus::Pending,
            note: None,
            total_downtime_minutes: 0,
        }
    }

    // ==========================================
    // 测试 1: 部件任务
    // ==========================================

    #[test]
    fn test_sub_assembly_first_step_uses_total_needed() {
        let mut item = make_item();
        item.sub_assemblies.push(make_sub_assembly(100, 2, 0));
        let task = make_task(ProcessStep::Cutting, Some("sa-1"), 100, 0);
        let topo = ProcessTopology::default();
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 100);
    }

    #[test]
    fn test_sub_assembly_first_step_monotonic_decrease() {
        // 首道就绪量随 produced 增大而严格下降 (或停在 0)
        let mut item = make_item();
        let mut sa = make_sub_assembly(100, 2, 0);
        sa.ledger.record_output(ProcessStep::Cutting, 30, 0);
        item.sub_assemblies.push(sa);
        let task = make_task(ProcessStep::Cutting, Some("sa-1"), 100, 30);
        let topo = ProcessTopology::default();
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 70);

        item.sub_assemblies[0]
            .ledger
            .record_output(ProcessStep::Cutting, 80, 0);
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 0);
    }

    #[test]
    fn test_sub_assembly_interior_step_uses_prev_available() {
        let mut item = make_item();
        let mut sa = make_sub_assembly(100, 2, 0);
        // 下料报产 40 良品 5 不良: CUTTING.available = 100 - 45 = 55
        sa.ledger.record_output(ProcessStep::Cutting, 40, 5);
        sa.ledger.add_available(ProcessStep::Punching, 40);
        item.sub_assemblies.push(sa);
        let task = make_task(ProcessStep::Punching, Some("sa-1"), 100, 0);
        let topo = ProcessTopology::default();
        // 冲孔的就绪量读紧邻前道 CUTTING 的 available, 不读本工序缓冲
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 55);
    }

    #[test]
    fn test_sub_assembly_unknown_reference_yields_zero() {
        let item = make_item();
        let task = make_task(ProcessStep::Cutting, Some("sa-missing"), 100, 0);
        let topo = ProcessTopology::default();
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 0);
    }

    #[test]
    fn test_sub_assembly_empty_processes_yields_zero() {
        let mut item = make_item();
        let mut sa = make_sub_assembly(100, 2, 0);
        sa.processes.clear();
        item.sub_assemblies.push(sa);
        let task = make_task(ProcessStep::Cutting, Some("sa-1"), 100, 0);
        let topo = ProcessTopology::default();
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 0);
    }

    // ==========================================
    // 测试 2: 成品任务 - 汇流工序
    // ==========================================

    #[test]
    fn test_welding_limited_by_scarcest_component() {
        let mut item = make_item();
        item.sub_assemblies.push(make_sub_assembly(100, 2, 10)); // floor(10/2)=5
        let mut sa2 = make_sub_assembly(100, 4, 10); // floor(10/4)=2
        sa2.id = "sa-2".to_string();
        item.sub_assemblies.push(sa2);
        let task = make_task(ProcessStep::Welding, None, 50, 0);
        let topo = ProcessTopology::default();
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 2);
    }

    #[test]
    fn test_welding_without_components_self_sufficient() {
        let item = make_item();
        let task = make_task(ProcessStep::Welding, None, 50, 20);
        let topo = ProcessTopology::default();
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 30);
    }

    #[test]
    fn test_welding_zero_qty_per_parent_treated_as_one() {
        let mut item = make_item();
        item.sub_assemblies.push(make_sub_assembly(100, 0, 7));
        let task = make_task(ProcessStep::Welding, None, 50, 0);
        let topo = ProcessTopology::default();
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 7);
    }

    // ==========================================
    // 测试 3: 成品任务 - 其余工序
    // ==========================================

    #[test]
    fn test_assembly_step_uses_prev_available() {
        let mut item = make_item();
        item.ledger.add_available(ProcessStep::Phosphating, 0);
        item.ledger.add_available(ProcessStep::Welding, 25);
        let task = make_task(ProcessStep::Phosphating, None, 50, 0);
        let topo = ProcessTopology::default();
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 25);
    }

    #[test]
    fn test_assembly_empty_workflow_yields_zero() {
        let mut item = make_item();
        item.workflow.clear();
        let task = make_task(ProcessStep::Welding, None, 50, 0);
        let topo = ProcessTopology::default();
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 0);
    }

    #[test]
    fn test_packing_uses_painting_available() {
        let mut item = make_item();
        item.ledger.add_available(ProcessStep::Painting, 12);
        let task = make_task(ProcessStep::Packing, None, 50, 0);
        let topo = ProcessTopology::default();
        assert_eq!(ReadinessCore::ready_quantity(&task, &item, &topo), 12);
    }
}
