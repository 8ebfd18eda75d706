// ==========================================
// 集成测试公共工具
// ==========================================
// 职责: 临时数据库 + 应用装配 + 常用实体构造
// ==========================================

#![allow(dead_code)]

use tempfile::NamedTempFile;
use workshop_mes::domain::task::Task;
use workshop_mes::domain::types::{MachineStatus, ProcessStep};
use workshop_mes::domain::Machine;
use workshop_mes::AppState;

/// 创建临时数据库上的完整应用装配
///
/// 返回的 NamedTempFile 必须由调用方持有, 否则数据库文件被提前删除
pub fn create_test_state() -> (NamedTempFile, AppState) {
    workshop_mes::logging::init_test();
    let temp_file = NamedTempFile::new().expect("创建临时数据库文件失败");
    let db_path = temp_file.path().to_str().expect("临时路径非UTF-8").to_string();
    let state = AppState::new(&db_path).expect("应用装配失败");
    (temp_file, state)
}

/// 从任务列表按 (工序, 部件) 定位任务
pub fn task_for_step<'a>(
    tasks: &'a [Task],
    step: ProcessStep,
    sub_assembly_id: Option<&str>,
) -> &'a Task {
    tasks
        .iter()
        .find(|t| t.step == step && t.sub_assembly_id.as_deref() == sub_assembly_id)
        .unwrap_or_else(|| panic!("未找到工序 {} 的任务", step))
}

/// 构造一台空闲机台
pub fn make_machine(id: &str, step: ProcessStep) -> Machine {
    Machine {
        id: id.to_string(),
        code: format!("M-{}", id),
        name: format!("{}机台", step),
        step_type: step,
        capacity_per_hour: 60,
        status: MachineStatus::Idle,
        is_maintenance: false,
    }
}
