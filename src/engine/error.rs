// ==========================================
// 语言学校教务系统 - 引擎层错误类型
// ==========================================
// 两类错误:
// - RuleViolation: 业务规则拒绝, 属于正常控制流, 直接展示给用户, 不按错误记录日志
// - NotFound / StoreUnavailable: 基础设施失败, 由调用方记录日志并提示重试
// ==========================================

use crate::domain::types::{CourseStatus, EntityId, Level, Shift};
use crate::domain::validation::FieldViolation;
use crate::repository::error::RepositoryError;
use serde::Serialize;
use thiserror::Error;

/// 业务规则违反（每种规则一个可区分的变体）
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleViolation {
    // ===== 选课 =====
    #[error("课程已满员: course_id={course_id}, max_students={max_students}")]
    CourseFull { course_id: EntityId, max_students: i32 },

    #[error("学生已达选课上限: student_id={student_id}, limit={limit}")]
    StudentQuotaExceeded { student_id: EntityId, limit: i32 },

    #[error("学生已选修该课程: student_id={student_id}, course_id={course_id}")]
    AlreadyEnrolled { student_id: EntityId, course_id: EntityId },

    #[error("学生已在修同语言课程: student_id={student_id}, language={language}, existing_course_id={existing_course_id}")]
    DuplicateLanguage {
        student_id: EntityId,
        language: String,
        existing_course_id: EntityId,
    },

    #[error("学生未选修该课程: student_id={student_id}, course_id={course_id}")]
    NotEnrolled { student_id: EntityId, course_id: EntityId },

    #[error("学生已停用: student_id={student_id}")]
    StudentInactive { student_id: EntityId },

    // ===== 教师分配 =====
    #[error("教师已停用: teacher_id={teacher_id}")]
    TeacherInactive { teacher_id: EntityId },

    #[error("课程已有教师: course_id={course_id}, teacher_id={teacher_id}")]
    CourseAlreadyAssigned { course_id: EntityId, teacher_id: EntityId },

    #[error("教师已达授课上限: teacher_id={teacher_id}, limit={limit}")]
    TeacherQuotaExceeded { teacher_id: EntityId, limit: i32 },

    #[error("教师仍负责课程, 不能删除: teacher_id={teacher_id}, courses={course_count}")]
    TeacherHasCourses { teacher_id: EntityId, course_count: usize },

    // ===== 课程目录 =====
    #[error("课程不在进行中: course_id={course_id}, status={status}")]
    CourseNotActive { course_id: EntityId, status: CourseStatus },

    #[error("已存在相同语言/时段/级别的课程: {language} {shift} {level} (course_id={existing_course_id})")]
    DuplicateCourseDefinition {
        language: String,
        shift: Shift,
        level: Level,
        existing_course_id: EntityId,
    },

    #[error("开设语言数已达上限: limit={limit}, language={language}")]
    LanguageCatalogFull { limit: i32, language: String },

    #[error("不能删除最后 {minimum} 门进行中的课程: course_id={course_id}")]
    SystemMinimumCoursesViolation { course_id: EntityId, minimum: i32 },

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStatusTransition { from: CourseStatus, to: CourseStatus },

    #[error("人数上限低于当前在读人数: max_students={max_students}, enrolled={enrolled}")]
    CapacityBelowEnrollment { max_students: i32, enrolled: i32 },

    #[error("语言不在可开课目录中: {language}")]
    UnknownLanguage { language: String },

    // ===== 资料 =====
    #[error("已存在同名且出生日期相同的学生: existing_student_id={existing_student_id}")]
    DuplicateStudent { existing_student_id: EntityId },

    #[error("已存在同名且邮箱相同的教师: existing_teacher_id={existing_teacher_id}")]
    DuplicateTeacher { existing_teacher_id: EntityId },

    #[error("字段校验失败 ({field}): {message}")]
    InvalidField { field: String, message: String },
}

impl From<FieldViolation> for RuleViolation {
    fn from(v: FieldViolation) -> Self {
        RuleViolation::InvalidField {
            field: v.field.to_string(),
            message: v.message,
        }
    }
}

/// 引擎层错误
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error("记录未找到: {entity} id={id}")]
    NotFound { entity: String, id: String },

    #[error("存储不可用: {0}")]
    StoreUnavailable(String),
}

impl EngineError {
    pub fn not_found(entity: &str, id: EntityId) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// 是否为业务规则拒绝（预期内结果）
    pub fn is_rule_violation(&self) -> bool {
        matches!(self, EngineError::Rule(_))
    }

    pub fn rule(&self) -> Option<&RuleViolation> {
        match self {
            EngineError::Rule(v) => Some(v),
            _ => None,
        }
    }
}

impl From<FieldViolation> for EngineError {
    fn from(v: FieldViolation) -> Self {
        EngineError::Rule(v.into())
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
// NotFound 保留实体信息, 其余存储失败一律视为 StoreUnavailable
impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            other => EngineError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        EngineError::StoreUnavailable(format!("存储任务中断: {}", err))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
