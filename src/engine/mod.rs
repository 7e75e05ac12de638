// ==========================================
// 语言学校教务系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎, 不拼 SQL
// 红线: Engine 不拼 SQL; 每个操作的规则检查与写入处于同一工作单元
// ==========================================

pub mod course_lifecycle;
pub mod enrollment_rules;
pub mod error;
pub mod executor;
pub mod roster;

// 重导出核心引擎
pub use course_lifecycle::{CascadeReport, CourseLifecycleManager, CourseUpdateOutcome};
pub use enrollment_rules::{AssignmentOutcome, EnrollmentRuleEngine};
pub use error::{EngineError, EngineResult, RuleViolation};
pub use roster::{RosterManager, TeacherUpdateOutcome};
