// ==========================================
// 语言学校教务系统 - 课程 API
// ==========================================
// 职责: 课程新建/编辑/删除 (委托 CourseLifecycleManager) 与课程查询
// ==========================================

use crate::api::context::OperatorContext;
use crate::api::error::{engine_failure, ApiResult};
use crate::api::validator::require_id;
use crate::domain::course::{Course, CourseDraft, CourseUpdate};
use crate::domain::types::EntityId;
use crate::engine::executor::run_read;
use crate::engine::{CascadeReport, CourseLifecycleManager, CourseUpdateOutcome};
use crate::repository::{CourseRepository, EntityStore};
use tracing::instrument;

// ==========================================
// CourseApi - 课程 API
// ==========================================
pub struct CourseApi {
    lifecycle: CourseLifecycleManager,
    store: EntityStore,
}

impl CourseApi {
    pub fn new(lifecycle: CourseLifecycleManager, store: EntityStore) -> Self {
        Self { lifecycle, store }
    }

    /// 新建课程
    #[instrument(skip(self, ctx, draft), fields(operator = %ctx))]
    pub async fn create_course(&self, ctx: &OperatorContext, draft: CourseDraft) -> ApiResult<Course> {
        self.lifecycle
            .create_course(draft)
            .await
            .map_err(|e| engine_failure("create_course", e))
    }

    /// 编辑课程（取消课程时返回级联结果）
    #[instrument(skip(self, ctx, update), fields(operator = %ctx))]
    pub async fn update_course(
        &self,
        ctx: &OperatorContext,
        course_id: EntityId,
        update: CourseUpdate,
    ) -> ApiResult<CourseUpdateOutcome> {
        require_id("course_id", course_id)?;

        self.lifecycle
            .update_course(course_id, update)
            .await
            .map_err(|e| engine_failure("update_course", e))
    }

    /// 删除课程
    #[instrument(skip(self, ctx), fields(operator = %ctx))]
    pub async fn remove_course(
        &self,
        ctx: &OperatorContext,
        course_id: EntityId,
    ) -> ApiResult<CascadeReport> {
        require_id("course_id", course_id)?;

        self.lifecycle
            .remove_course(course_id)
            .await
            .map_err(|e| engine_failure("remove_course", e))
    }

    /// 查询单个课程
    pub async fn get_course(&self, _ctx: &OperatorContext, course_id: EntityId) -> ApiResult<Course> {
        require_id("course_id", course_id)?;
        run_read(&self.store, move |conn| Ok(CourseRepository::get(conn, course_id)?))
            .await
            .map_err(|e| engine_failure("get_course", e))
    }

    /// 全部课程
    pub async fn list_courses(&self, _ctx: &OperatorContext) -> ApiResult<Vec<Course>> {
        run_read(&self.store, |conn| Ok(CourseRepository::list_all(conn)?))
            .await
            .map_err(|e| engine_failure("list_courses", e))
    }

    /// 某教师负责的课程
    pub async fn list_courses_of_teacher(
        &self,
        _ctx: &OperatorContext,
        teacher_id: EntityId,
    ) -> ApiResult<Vec<Course>> {
        require_id("teacher_id", teacher_id)?;
        run_read(&self.store, move |conn| {
            Ok(CourseRepository::list_by_teacher(conn, teacher_id)?)
        })
        .await
        .map_err(|e| engine_failure("list_courses_of_teacher", e))
    }

    /// 当前已开设的语言
    pub async fn list_offered_languages(&self, _ctx: &OperatorContext) -> ApiResult<Vec<String>> {
        run_read(&self.store, |conn| {
            Ok(CourseRepository::list_distinct_languages(conn, None)?)
        })
        .await
        .map_err(|e| engine_failure("list_offered_languages", e))
    }

    /// 语言目录（新建课程时可选的语言）
    pub fn catalog_languages(&self) -> Vec<String> {
        self.lifecycle.catalog().languages().to_vec()
    }
}
