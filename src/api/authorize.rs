// ==========================================
// 车间在制品流转追踪系统 - 操作鉴权接缝
// ==========================================
// 职责: 在变更操作执行前评估操作人权限
// 默认实现放行所有操作; 角色体系由部署方注入
// ==========================================

use crate::api::error::{ApiError, ApiResult};

/// 可鉴权的操作类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReportProduction,   // 报产
    ValidateToWarehouse, // 入库验证
    ManageTask,         // 任务启停/停机
    ManageStructure,    // 成品/部件结构维护
}

/// 鉴权接口
///
/// API 层在每个变更操作前调用; 查询操作不鉴权
pub trait Authorizer: Send + Sync {
    fn authorize(&self, operator: &str, action: Action) -> ApiResult<()>;
}

/// 默认实现: 放行所有操作, 仅要求操作人非空
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, operator: &str, _action: Action) -> ApiResult<()> {
        if operator.trim().is_empty() {
            return Err(ApiError::PermissionDenied("操作人不能为空".to_string()));
        }
        Ok(())
    }
}
