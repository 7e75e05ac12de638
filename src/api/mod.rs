// ==========================================
// 语言学校教务系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 供表现层 (控制器) 调用
// 约定: 每个调用显式携带 OperatorContext
// ==========================================

pub mod context;
pub mod course_api;
pub mod dashboard_api;
pub mod enrollment_api;
pub mod error;
pub mod roster_api;
pub mod validator;

// 重导出核心类型
pub use context::OperatorContext;
pub use course_api::CourseApi;
pub use dashboard_api::{DashboardApi, DashboardSummary};
pub use enrollment_api::EnrollmentApi;
pub use error::{ApiError, ApiResult};
pub use roster_api::RosterApi;
