// ==========================================
// 语言学校教务系统 - 首页概览 API
// ==========================================
// 职责: 首页统计 (学生/教师/课程/语言数)
// ==========================================

use crate::api::context::OperatorContext;
use crate::api::error::{engine_failure, ApiResult};
use crate::config::EnrollmentLimits;
use crate::domain::types::CourseStatus;
use crate::engine::executor::run_read;
use crate::repository::{CourseRepository, EntityStore, StudentRepository, TeacherRepository};
use serde::{Deserialize, Serialize};

/// 首页统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_students: i64,
    pub total_teachers: i64,
    pub total_courses: i64,
    pub active_courses: i64,
    pub distinct_languages: i64,
    /// 还可新开的语言数
    pub language_slots_left: i64,
}

// ==========================================
// DashboardApi - 首页概览 API
// ==========================================
pub struct DashboardApi {
    store: EntityStore,
    limits: EnrollmentLimits,
}

impl DashboardApi {
    pub fn new(store: EntityStore, limits: EnrollmentLimits) -> Self {
        Self { store, limits }
    }

    pub async fn summary(&self, _ctx: &OperatorContext) -> ApiResult<DashboardSummary> {
        let max_languages = i64::from(self.limits.max_distinct_languages);
        run_read(&self.store, move |conn| {
            let distinct_languages = CourseRepository::list_distinct_languages(conn, None)?.len() as i64;
            Ok(DashboardSummary {
                total_students: StudentRepository::count(conn)?,
                total_teachers: TeacherRepository::count(conn)?,
                total_courses: CourseRepository::count(conn)?,
                active_courses: CourseRepository::count_by_status(conn, CourseStatus::Active)?,
                distinct_languages,
                language_slots_left: (max_languages - distinct_languages).max(0),
            })
        })
        .await
        .map_err(|e| engine_failure("dashboard_summary", e))
    }
}
