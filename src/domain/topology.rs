// ==========================================
// 车间在制品流转追踪系统 - 工艺拓扑
// ==========================================
// 职责: 静态工序序列 + 汇流边定义, 纯数据无副作用
// 红线: 跨实体的"部件→总装"衔接是拓扑数据, 不是散落的特判
// ==========================================

use crate::domain::types::ProcessStep;

/// 部件序列 (3道), 应用于部件 (SubAssembly)
pub const COMPONENT_STEPS: [ProcessStep; 3] = [
    ProcessStep::Cutting,
    ProcessStep::Punching,
    ProcessStep::Pressing,
];

/// 总装序列 (4道), 应用于成品 (ProjectItem), 末道为包装
pub const ASSEMBLY_STEPS: [ProcessStep; 4] = [
    ProcessStep::Welding,
    ProcessStep::Phosphating,
    ProcessStep::Painting,
    ProcessStep::Packing,
];

// ==========================================
// ConvergenceEdge - 汇流边
// ==========================================
// 部件轨道末道工序完工时, 良品量注入总装轨道首道工序的 available。
// 焊接工序同时是部件库存的消耗点 (见 engine::propagation)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergenceEdge {
    pub from: ProcessStep, // 部件轨道的供料工序
    pub to: ProcessStep,   // 总装轨道的受料工序 (焊接)
}

/// 默认汇流边: 压型 → 焊接
pub const CONVERGENCE_EDGE: ConvergenceEdge = ConvergenceEdge {
    from: ProcessStep::Pressing,
    to: ProcessStep::Welding,
};

// ==========================================
// ProcessTopology - 工艺拓扑查询
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ProcessTopology {
    pub convergence: ConvergenceEdge,
}

impl Default for ProcessTopology {
    fn default() -> Self {
        Self {
            convergence: CONVERGENCE_EDGE,
        }
    }
}

impl ProcessTopology {
    /// 总装序列
    pub fn assembly_steps(&self) -> &'static [ProcessStep] {
        &ASSEMBLY_STEPS
    }

    /// 部件序列
    pub fn component_steps(&self) -> &'static [ProcessStep] {
        &COMPONENT_STEPS
    }

    /// 总装序列中某工序的紧邻前道
    pub fn prev_assembly_step(&self, step: ProcessStep) -> Option<ProcessStep> {
        let idx = ASSEMBLY_STEPS.iter().position(|s| *s == step)?;
        if idx == 0 {
            None
        } else {
            Some(ASSEMBLY_STEPS[idx - 1])
        }
    }

    /// 总装序列中某工序的紧邻后道 (末道返回 None)
    pub fn next_assembly_step(&self, step: ProcessStep) -> Option<ProcessStep> {
        let idx = ASSEMBLY_STEPS.iter().position(|s| *s == step)?;
        ASSEMBLY_STEPS.get(idx + 1).copied()
    }

    /// 是否为汇流边的供料工序 (部件轨道侧)
    pub fn is_convergence_source(&self, step: ProcessStep) -> bool {
        step == self.convergence.from
    }

    /// 是否为汇流边的受料工序 (总装轨道侧, 即焊接)
    pub fn is_convergence_target(&self, step: ProcessStep) -> bool {
        step == self.convergence.to
    }

    /// 总装末道 (包装)
    pub fn packing_step(&self) -> ProcessStep {
        ASSEMBLY_STEPS[ASSEMBLY_STEPS.len() - 1]
    }
}
