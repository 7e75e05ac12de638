// ==========================================
// 语言学校教务系统 - API层错误类型
// ==========================================
// 职责: 把引擎错误转换为表现层可直接展示的错误
// 约定: 业务规则拒绝原样透出 (调用方按 kind 映射提示);
//       基础设施失败在此记录 error 日志, 用户只看到通用重试提示
// ==========================================

use crate::engine::error::{EngineError, RuleViolation};
use thiserror::Error;
use tracing::error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("业务规则违反: {0}")]
    RuleViolation(RuleViolation),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("存储不可用: {0}")]
    StoreUnavailable(String),
}

impl ApiError {
    /// 是否为基础设施失败（需要记录日志并提示重试）
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, ApiError::NotFound(_) | ApiError::StoreUnavailable(_))
    }

    pub fn rule(&self) -> Option<&RuleViolation> {
        match self {
            ApiError::RuleViolation(v) => Some(v),
            _ => None,
        }
    }

    /// 面向用户的提示文案
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidInput(msg) => format!("输入有误: {}", msg),
            ApiError::RuleViolation(v) => rule_message(v),
            ApiError::NotFound(_) | ApiError::StoreUnavailable(_) => {
                "操作未能完成, 请稍后重试".to_string()
            }
        }
    }
}

fn rule_message(v: &RuleViolation) -> String {
    match v {
        RuleViolation::CourseFull { max_students, .. } => {
            format!("该课程已满员 ({} 人)", max_students)
        }
        RuleViolation::StudentQuotaExceeded { limit, .. } => {
            format!("该学生已选满 {} 门课程", limit)
        }
        RuleViolation::AlreadyEnrolled { .. } => "该学生已在此课程中".to_string(),
        RuleViolation::DuplicateLanguage { language, .. } => {
            format!("该学生已在修一门 {} 课程", language)
        }
        RuleViolation::NotEnrolled { .. } => "该学生未选修此课程".to_string(),
        RuleViolation::StudentInactive { .. } => "该学生已停用, 不能选课".to_string(),
        RuleViolation::TeacherInactive { .. } => "该教师已停用, 不能分配课程".to_string(),
        RuleViolation::CourseAlreadyAssigned { .. } => "该课程已有负责教师".to_string(),
        RuleViolation::TeacherQuotaExceeded { limit, .. } => {
            format!("该教师已负责 {} 门课程, 不能再分配", limit)
        }
        RuleViolation::TeacherHasCourses { course_count, .. } => {
            format!("该教师仍负责 {} 门课程, 请先解除后再删除", course_count)
        }
        RuleViolation::CourseNotActive { status, .. } => {
            format!("课程状态为 {}, 不能进行此操作", status)
        }
        RuleViolation::DuplicateCourseDefinition {
            language,
            shift,
            level,
            ..
        } => format!("已存在 {} / {} / {} 的课程", language, shift, level),
        RuleViolation::LanguageCatalogFull { limit, .. } => {
            format!("开设语言已达 {} 种上限, 不能再增加新语言", limit)
        }
        RuleViolation::SystemMinimumCoursesViolation { .. } => {
            "系统至少需要保留一门进行中的课程".to_string()
        }
        RuleViolation::InvalidStatusTransition { from, to } => {
            format!("课程状态不能从 {} 改为 {}", from, to)
        }
        RuleViolation::CapacityBelowEnrollment {
            max_students,
            enrolled,
        } => format!("人数上限 {} 低于当前在读人数 {}", max_students, enrolled),
        RuleViolation::UnknownLanguage { language } => format!("不支持的语言: {}", language),
        RuleViolation::DuplicateStudent { .. } => "已存在同名且出生日期相同的学生".to_string(),
        RuleViolation::DuplicateTeacher { .. } => "已存在同名且邮箱相同的教师".to_string(),
        RuleViolation::InvalidField { message, .. } => message.clone(),
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Rule(v) => ApiError::RuleViolation(v),
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            EngineError::StoreUnavailable(msg) => ApiError::StoreUnavailable(msg),
        }
    }
}

/// 转换引擎错误; 基础设施失败记录 error 日志
pub(crate) fn engine_failure(operation: &'static str, err: EngineError) -> ApiError {
    let api_err = ApiError::from(err);
    if api_err.is_infrastructure() {
        error!(operation, error = %api_err, "操作失败");
    }
    api_err
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_conversion() {
        let api_err: ApiError = EngineError::not_found("Student", 42).into();
        match &api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Student"));
                assert!(msg.contains("42"));
            }
            _ => panic!("Expected NotFound"),
        }
        assert!(api_err.is_infrastructure());
        assert_eq!(api_err.user_message(), "操作未能完成, 请稍后重试");

        let api_err: ApiError = EngineError::Rule(RuleViolation::AlreadyEnrolled {
            student_id: 1,
            course_id: 2,
        })
        .into();
        assert!(!api_err.is_infrastructure());
        assert!(matches!(api_err.rule(), Some(RuleViolation::AlreadyEnrolled { .. })));
    }

    #[test]
    fn test_user_message_carries_rule_details() {
        let api_err = ApiError::RuleViolation(RuleViolation::StudentQuotaExceeded {
            student_id: 7,
            limit: 3,
        });
        assert_eq!(api_err.user_message(), "该学生已选满 3 门课程");

        let api_err = ApiError::RuleViolation(RuleViolation::DuplicateLanguage {
            student_id: 7,
            language: "Spanish".to_string(),
            existing_course_id: 1,
        });
        assert!(api_err.user_message().contains("Spanish"));
    }
}
