// ==========================================
// 车间在制品流转追踪系统 - 库存传播引擎
// ==========================================
// 职责: 报产/入库验证对台账的全部修改规则, 作用于内存实体副本
// 红线: 无 I/O; 持久化由 API 层在单一事务中完成
// 红线: 不良品只消耗本工序缓冲, 不向任何下游传播
// ==========================================

use crate::domain::item::ProjectItem;
use crate::domain::topology::ProcessTopology;
use crate::domain::types::ProcessStep;

// ==========================================
// PropagationCore - 纯函数工具类
// ==========================================
pub struct PropagationCore;

impl PropagationCore {
    /// 部件任务报产的台账效果
    ///
    /// # 规则
    /// 1. 本工序: produced += good; available = max(0, available - (good+defect))
    /// 2. 非末道: 部件序列紧邻后道 available += good
    /// 3. 末道: total_produced += good; completed_qty += good
    /// 4. 工序为汇流边供料工序时: 成品焊接工序 available += good
    ///    (规则 3 与规则 4 相互独立, 可同时触发)
    pub fn apply_sub_assembly_report(
        item: &mut ProjectItem,
        sa_id: &str,
        topo: &ProcessTopology,
        step: ProcessStep,
        good: i64,
        defect: i64,
    ) {
        let convergence_to = topo.convergence.to;
        let feeds_convergence = topo.is_convergence_source(step);

        if let Some(sa) = item.sub_assembly_mut(sa_id) {
            sa.ledger.record_output(step, good, defect);

            if let Some(next) = sa.next_step(step) {
                sa.ledger.add_available(next, good);
            }
            if sa.is_last_step(step) {
                sa.total_produced += good;
                sa.completed_qty += good;
            }
        } else {
            return;
        }

        if feeds_convergence {
            item.ledger.add_available(convergence_to, good);
        }
    }

    /// 成品任务报产的台账效果
    ///
    /// # 规则
    /// 1. 本工序: produced += good; available = max(0, available - (good+defect))
    /// 2. 非末道: 总装序列紧邻后道 available += good
    /// 3. 工序为汇流工序 (焊接) 时: 每个部件
    ///    completed_qty = max(0, completed_qty - good × qty_per_parent)
    ///    —— 部件库存在此被焊入成品
    pub fn apply_assembly_report(
        item: &mut ProjectItem,
        topo: &ProcessTopology,
        step: ProcessStep,
        good: i64,
        defect: i64,
    ) {
        item.ledger.record_output(step, good, defect);

        if let Some(next) = topo.next_assembly_step(step) {
            item.ledger.add_available(next, good);
        }

        if topo.is_convergence_target(step) {
            for sa in item.sub_assemblies.iter_mut() {
                let consumed = good * sa.qty_per_parent.max(1);
                sa.completed_qty = (sa.completed_qty - consumed).max(0);
            }
        }
    }

    /// 入库验证的台账效果
    ///
    /// 包装工序 produced 截断扣减, 成品入库量增加。
    /// 这是两套独立台账 (工序台账 → 成品库存) 之间的单向流动, 不可逆。
    pub fn apply_warehouse_validation(item: &mut ProjectItem, topo: &ProcessTopology, qty: i64) {
        item.ledger.reduce_produced(topo.packing_step(), qty);
        item.warehouse_qty += qty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::SubAssembly;
    use crate::domain::ledger::Ledger;
    use crate::domain::topology::{ASSEMBLY_STEPS, COMPONENT_STEPS};

    fn make_sub_assembly(id: &str, total_needed: i64, qty_per_parent: i64, completed: i64) -> SubAssembly {
        let mut sa = SubAssembly {
            id: id.to_string(),
            item_id: "item-1".to_string(),
            name: "部件".to_string(),
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
            workflow: ASSEMBLY_STEPS.to_vec(),
            ledger: Ledger::new(),
            warehouse_qty: 0,
            shipped_qty: 0,
            is_workflow_locked: true,
            sub_assemblies: Vec::new(),
        }
    }

    // ==========================================
    // 测试 1: 部件报产传播
    // ==========================================

    #[test]
    fn test_sub_assembly_report_scenario_a() {
        // 场景: total_needed=100, 首道报 40 良品 5 不良
        let mut item = make_item();
        item.sub_assemblies.push(make_sub_assembly("sa-1", 100, 2, 0));
        let topo = ProcessTopology::default();

        PropagationCore::apply_sub_assembly_report(
            &mut item, "sa-1", &topo, ProcessStep::Cutting, 40, 5,
        );

        let sa = item.sub_assembly("sa-1").unwrap();
        assert_eq!(sa.ledger.produced(ProcessStep::Cutting), 40);
        assert_eq!(sa.ledger.available(ProcessStep::Cutting), 55);
        // 前道仅推送良品量到后道
        assert_eq!(sa.ledger.available(ProcessStep::Punching), 40);
        // 非末道不影响部件库存
        assert_eq!(sa.completed_qty, 0);
        assert_eq!(sa.total_produced, 0);
    }

    #[test]
    fn test_sub_assembly_last_step_feeds_convergence() {
        let mut item = make_item();
        item.sub_assemblies.push(make_sub_assembly("sa-1", 100, 2, 0));
        let topo = ProcessTopology::default();

        // 压型既是部件末道又是汇流供料工序
        PropagationCore::apply_sub_assembly_report(
            &mut item, "sa-1", &topo, ProcessStep::Pressing, 30, 2,
        );

        let sa = item.sub_assembly("sa-1").unwrap();
        assert_eq!(sa.total_produced, 30);
        assert_eq!(sa.completed_qty, 30);
        assert_eq!(item.ledger.available(ProcessStep::Welding), 30);
    }

    #[test]
    fn test_sub_assembly_unknown_id_is_noop() {
        let mut item = make_item();
        let topo = ProcessTopology::default();
        PropagationCore::apply_sub_assembly_report(
            &mut item, "sa-missing", &topo, ProcessStep::Pressing, 30, 0,
        );
        assert_eq!(item.ledger.available(ProcessStep::Welding), 0);
    }

    // ==========================================
    // 测试 2: 成品报产传播
    // ==========================================

    #[test]
    fn test_assembly_report_forward_propagation_good_only() {
        let mut item = make_item();
        item.ledger.add_available(ProcessStep::Phosphating, 50);
        let topo = ProcessTopology::default();

        PropagationCore::apply_assembly_report(&mut item, &topo, ProcessStep::Phosphating, 20, 7);

        assert_eq!(item.ledger.produced(ProcessStep::Phosphating), 20);
        assert_eq!(item.ledger.available(ProcessStep::Phosphating), 23);
        // 后道增量恰为良品量, 与不良量无关
        assert_eq!(item.ledger.available(ProcessStep::Painting), 20);
    }

    #[test]
    fn test_packing_has_no_downstream() {
        let mut item = make_item();
        item.ledger.add_available(ProcessStep::Packing, 10);
        let topo = ProcessTopology::default();
        PropagationCore::apply_assembly_report(&mut item, &topo, ProcessStep::Packing, 10, 0);
        assert_eq!(item.ledger.produced(ProcessStep::Packing), 10);
        assert_eq!(item.ledger.available(ProcessStep::Packing), 0);
    }

    #[test]
    fn test_welding_consumes_components_scenario_b() {
        // 场景: 两个部件 qty_per_parent=2, completed=10; 焊接报 3 良品
        let mut item = make_item();
        item.sub_assemblies.push(make_sub_assembly("sa-1", 100, 2, 10));
        item.sub_assemblies.push(make_sub_assembly("sa-2", 100, 2, 10));
        let topo = ProcessTopology::default();

        PropagationCore::apply_assembly_report(&mut item, &topo, ProcessStep::Welding, 3, 0);

        assert_eq!(item.sub_assembly("sa-1").unwrap().completed_qty, 4);
        assert_eq!(item.sub_assembly("sa-2").unwrap().completed_qty, 4);
    }

    #[test]
    fn test_welding_consumption_clamps_at_zero() {
        let mut item = make_item();
        item.sub_assemblies.push(make_sub_assembly("sa-1", 100, 3, 5));
        let topo = ProcessTopology::default();

        PropagationCore::apply_assembly_report(&mut item, &topo, ProcessStep::Welding, 4, 0);

        // 5 - 4*3 = -7 → 截断为 0
        assert_eq!(item.sub_assembly("sa-1").unwrap().completed_qty, 0);
    }

    #[test]
    fn test_non_welding_step_does_not_consume() {
        let mut item = make_item();
        item.sub_assemblies.push(make_sub_assembly("sa-1", 100, 2, 10));
        let topo = ProcessTopology::default();
        PropagationCore::apply_assembly_report(&mut item, &topo, ProcessStep::Painting, 5, 0);
        assert_eq!(item.sub_assembly("sa-1").unwrap().completed_qty, 10);
    }

    // ==========================================
    // 测试 3: 入库验证
    // ==========================================

    #[test]
    fn test_warehouse_validation_scenario_c() {
        let mut item = make_item();
        item.ledger.record_output(ProcessStep::Packing, 50, 0);
        let topo = ProcessTopology::default();

        PropagationCore::apply_warehouse_validation(&mut item, &topo, 20);

        assert_eq!(item.ledger.produced(ProcessStep::Packing), 30);
        assert_eq!(item.warehouse_qty, 20);
    }

    #[test]
    fn test_warehouse_validation_overshoot_clamps_produced() {
        let mut item = make_item();
        item.ledger.record_output(ProcessStep::Packing, 10, 0);
        let topo = ProcessTopology::default();

        // 操作工可录入超过待验证量的数量; produced 截断, 入库量照加
        PropagationCore::apply_warehouse_validation(&mut item, &topo, 25);

        assert_eq!(item.ledger.produced(ProcessStep::Packing), 0);
        assert_eq!(item.warehouse_qty, 25);
    }
}
