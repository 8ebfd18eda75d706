// ==========================================
// 结构维护 API 集成测试
// ==========================================
// 目标: 成品/部件创建、锁定、删除与工艺路线确认/解锁
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod structure_api_test {
    use crate::test_helpers::{create_test_state, task_for_step};
    use workshop_mes::api::ApiError;
    use workshop_mes::domain::topology::{ASSEMBLY_STEPS, COMPONENT_STEPS};
    use workshop_mes::domain::types::{ProcessStep, Shift, TaskStatus};

    const OP: &str = "陈芳";

    #[test]
    fn test_add_item_rejects_bad_input() {
        let (_tmp, state) = create_test_state();

        let err = state
            .structure_api
            .add_item("proj-1", "  ", 10, ASSEMBLY_STEPS.to_vec(), OP)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let err = state
            .structure_api
            .add_item("proj-1", "货架", 0, ASSEMBLY_STEPS.to_vec(), OP)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_add_sub_assembly_creates_ledger_and_tasks() {
        let (_tmp, state) = create_test_state();
        let item = state
            .structure_api
            .add_item("proj-1", "货架", 50, ASSEMBLY_STEPS.to_vec(), OP)
            .unwrap();
        let sa = state
            .structure_api
            .add_sub_assembly(&item.id, "横梁", 4, 200, COMPONENT_STEPS.to_vec(), OP)
            .unwrap();

        // 首道 available = 目标量, 其余为 0
        assert_eq!(sa.ledger.available(ProcessStep::Cutting), 200);
        assert_eq!(sa.ledger.available(ProcessStep::Punching), 0);

        let tasks = state.production_api.list_tasks(&item.id).unwrap();
        assert_eq!(tasks.len(), 3); // 工艺路线未确认, 仅部件任务
        assert!(tasks
            .iter()
            .all(|t| t.status == TaskStatus::Pending && t.target_qty == 200));
        assert!(tasks
            .iter()
            .all(|t| t.sub_assembly_id.as_deref() == Some(sa.id.as_str())));
    }

    #[test]
    fn test_add_sub_assembly_accepts_trimmed_process_chain() {
        let (_tmp, state) = create_test_state();
        let item = state
            .structure_api
            .add_item("proj-1", "货架", 50, ASSEMBLY_STEPS.to_vec(), OP)
            .unwrap();
        // 裁剪链: 跳过冲孔, 保留链序
        let sa = state
            .structure_api
            .add_sub_assembly(
                &item.id,
                "背板",
                1,
                50,
                vec![ProcessStep::Cutting, ProcessStep::Pressing],
                OP,
            )
            .unwrap();

        assert_eq!(sa.processes, vec![ProcessStep::Cutting, ProcessStep::Pressing]);
        assert_eq!(sa.ledger.available(ProcessStep::Cutting), 50);

        // 仅裁剪链上的工序建任务
        let tasks = state.production_api.list_tasks(&item.id).unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.step != ProcessStep::Punching));

        // 报产沿裁剪链传递: 下料直接喂压型
        let cutting = task_for_step(&tasks, ProcessStep::Cutting, Some(&sa.id));
        state
            .production_api
            .report_production(&cutting.id, 10, 0, Shift::Shift1, OP)
            .unwrap();
        let item = state.production_api.get_item(&item.id).unwrap();
        let sa = item.sub_assembly(&sa.id).unwrap();
        assert_eq!(sa.ledger.available(ProcessStep::Pressing), 10);
        assert_eq!(sa.ledger.available(ProcessStep::Punching), 0);
        // 压型就绪量读紧邻前道 (裁剪链上是下料) 的 available
        let pressing = task_for_step(&tasks, ProcessStep::Pressing, Some(&sa.id));
        assert_eq!(state.production_api.ready_quantity(&pressing.id).unwrap(), 40);
    }

    #[test]
    fn test_add_sub_assembly_rejects_bad_process_chain() {
        let (_tmp, state) = create_test_state();
        let item = state
            .structure_api
            .add_item("proj-1", "货架", 50, ASSEMBLY_STEPS.to_vec(), OP)
            .unwrap();

        // 空序列
        let err = state
            .structure_api
            .add_sub_assembly(&item.id, "背板", 1, 50, Vec::new(), OP)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        // 乱序
        let err = state
            .structure_api
            .add_sub_assembly(
                &item.id,
                "背板",
                1,
                50,
                vec![ProcessStep::Pressing, ProcessStep::Cutting],
                OP,
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        // 总装工序不属于部件链
        let err = state
            .structure_api
            .add_sub_assembly(
                &item.id,
                "背板",
                1,
                50,
                vec![ProcessStep::Cutting, ProcessStep::Welding],
                OP,
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_locked_sub_assembly_cannot_be_deleted_but_still_books() {
        let (_tmp, state) = create_test_state();
        let item = state
            .structure_api
            .add_item("proj-1", "货架", 50, ASSEMBLY_STEPS.to_vec(), OP)
            .unwrap();
        let sa = state
            .structure_api
            .add_sub_assembly(&item.id, "横梁", 4, 200, COMPONENT_STEPS.to_vec(), OP)
            .unwrap();

        state
            .structure_api
            .lock_sub_assembly(&item.id, &sa.id, OP)
            .unwrap();

        let err = state
            .structure_api
            .delete_sub_assembly(&item.id, &sa.id, OP)
            .unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

        // 锁定只冻结结构, 台账记账照常
        let tasks = state.production_api.list_tasks(&item.id).unwrap();
        let cutting = task_for_step(&tasks, ProcessStep::Cutting, Some(&sa.id));
        let outcome = state
            .production_api
            .report_production(&cutting.id, 10, 0, Shift::Shift1, OP)
            .unwrap();
        assert_eq!(outcome.task.completed_qty, 10);
    }

    #[test]
    fn test_sub_assembly_with_logs_cannot_be_deleted() {
        let (_tmp, state) = create_test_state();
        let item = state
            .structure_api
            .add_item("proj-1", "货架", 50, ASSEMBLY_STEPS.to_vec(), OP)
            .unwrap();
        let sa = state
            .structure_api
            .add_sub_assembly(&item.id, "横梁", 4, 200, COMPONENT_STEPS.to_vec(), OP)
            .unwrap();

        let tasks = state.production_api.list_tasks(&item.id).unwrap();
        let cutting = task_for_step(&tasks, ProcessStep::Cutting, Some(&sa.id));
        state
            .production_api
            .report_production(&cutting.id, 1, 0, Shift::Shift1, OP)
            .unwrap();

        let err = state
            .structure_api
            .delete_sub_assembly(&item.id, &sa.id, OP)
            .unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_delete_fresh_sub_assembly_removes_tasks() {
        let (_tmp, state) = create_test_state();
        let item = state
            .structure_api
            .add_item("proj-1", "货架", 50, ASSEMBLY_STEPS.to_vec(), OP)
            .unwrap();
        let sa = state
            .structure_api
            .add_sub_assembly(&item.id, "横梁", 4, 200, COMPONENT_STEPS.to_vec(), OP)
            .unwrap();

        state
            .structure_api
            .delete_sub_assembly(&item.id, &sa.id, OP)
            .unwrap();

        assert!(state.production_api.list_tasks(&item.id).unwrap().is_empty());
        let reloaded = state.production_api.get_item(&item.id).unwrap();
        assert!(reloaded.sub_assemblies.is_empty());
    }

    #[test]
    fn test_validate_workflow_locks_and_creates_tasks() {
        let (_tmp, state) = create_test_state();
        let item = state
            .structure_api
            .add_item("proj-1", "货架", 50, ASSEMBLY_STEPS.to_vec(), OP)
            .unwrap();

        let item = state.structure_api.validate_workflow(&item.id, OP).unwrap();
        assert!(item.is_workflow_locked);

        let tasks = state.production_api.list_tasks(&item.id).unwrap();
        assert_eq!(tasks.len(), 4);
        assert!(tasks.iter().all(|t| t.sub_assembly_id.is_none()));

        // 重复确认被拒绝
        let err = state
            .structure_api
            .validate_workflow(&item.id, OP)
            .unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_unlock_workflow_removes_only_assembly_tasks() {
        let (_tmp, state) = create_test_state();
        let item = state
            .structure_api
            .add_item("proj-1", "货架", 50, ASSEMBLY_STEPS.to_vec(), OP)
            .unwrap();
        state.structure_api.validate_workflow(&item.id, OP).unwrap();
        let sa = state
            .structure_api
            .add_sub_assembly(&item.id, "横梁", 4, 200, COMPONENT_STEPS.to_vec(), OP)
            .unwrap();

        let item = state.structure_api.unlock_workflow(&item.id, OP).unwrap();
        assert!(!item.is_workflow_locked);

        let tasks = state.production_api.list_tasks(&item.id).unwrap();
        assert_eq!(tasks.len(), 3); // 部件任务保留
        assert!(tasks
            .iter()
            .all(|t| t.sub_assembly_id.as_deref() == Some(sa.id.as_str())));
    }

    #[test]
    fn test_unlock_unlocked_workflow_is_rejected() {
        let (_tmp, state) = create_test_state();
        let item = state
            .structure_api
            .add_item("proj-1", "货架", 50, ASSEMBLY_STEPS.to_vec(), OP)
            .unwrap();
        let err = state
            .structure_api
            .unlock_workflow(&item.id, OP)
            .unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    }
}
