// ==========================================
// 语言学校教务系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 选课约束引擎 (学生选课、教师分配、课程生命周期)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问 (Entity Store)
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CourseStatus, EntityId, Gender, Level, PersonStatus, Shift};

// 领域实体
pub use domain::{Course, CourseDraft, CourseUpdate, Enrollment, Student, StudentDraft, Teacher, TeacherDraft};

// 引擎
pub use engine::{
    CourseLifecycleManager, EngineError, EnrollmentRuleEngine, RosterManager, RuleViolation,
};

// API
pub use api::{ApiError, CourseApi, DashboardApi, EnrollmentApi, OperatorContext, RosterApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "语言学校教务系统";
