// ==========================================
// 语言学校教务系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、字段校验
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod course;
pub mod enrollment;
pub mod student;
pub mod teacher;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use course::{Course, CourseDraft, CourseUpdate};
pub use enrollment::{CounterDrift, Enrollment};
pub use student::{Student, StudentDraft, StudentUpdate};
pub use teacher::{Teacher, TeacherDraft, TeacherUpdate};
pub use types::{CounterEntity, CourseStatus, EntityId, Gender, Level, PersonStatus, Shift};
pub use validation::FieldViolation;
