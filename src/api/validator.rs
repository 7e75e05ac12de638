// ==========================================
// 语言学校教务系统 - API 入参校验
// ==========================================
// 只做明显的格式校验, 业务规则由引擎判定
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::EntityId;

/// ID 必须为正数
pub fn require_id(field: &str, id: EntityId) -> ApiResult<()> {
    if id <= 0 {
        return Err(ApiError::InvalidInput(format!("{}必须为正数: {}", field, id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        assert!(require_id("student_id", 1).is_ok());
        assert!(matches!(
            require_id("student_id", 0),
            Err(ApiError::InvalidInput(msg)) if msg.contains("student_id")
        ));
        assert!(require_id("course_id", -3).is_err());
    }
}
