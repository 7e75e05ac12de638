// ==========================================
// 语言学校教务系统 - 学生/教师资料 API
// ==========================================
// 职责: 资料增删改查, 计数对账
// ==========================================

use crate::api::context::OperatorContext;
use crate::api::error::{engine_failure, ApiResult};
use crate::api::validator::require_id;
use crate::domain::enrollment::CounterDrift;
use crate::domain::student::{Student, StudentDraft, StudentUpdate};
use crate::domain::teacher::{Teacher, TeacherDraft, TeacherUpdate};
use crate::domain::types::EntityId;
use crate::engine::executor::run_read;
use crate::engine::{RosterManager, TeacherUpdateOutcome};
use crate::repository::{EntityStore, StudentRepository, TeacherRepository};
use tracing::instrument;

// ==========================================
// RosterApi - 资料 API
// ==========================================
pub struct RosterApi {
    roster: RosterManager,
    store: EntityStore,
}

impl RosterApi {
    pub fn new(roster: RosterManager, store: EntityStore) -> Self {
        Self { roster, store }
    }

    // ===== 学生 =====

    #[instrument(skip(self, ctx, draft), fields(operator = %ctx))]
    pub async fn add_student(&self, ctx: &OperatorContext, draft: StudentDraft) -> ApiResult<Student> {
        self.roster
            .add_student(draft)
            .await
            .map_err(|e| engine_failure("add_student", e))
    }

    #[instrument(skip(self, ctx, update), fields(operator = %ctx))]
    pub async fn update_student(
        &self,
        ctx: &OperatorContext,
        student_id: EntityId,
        update: StudentUpdate,
    ) -> ApiResult<Student> {
        require_id("student_id", student_id)?;
        self.roster
            .update_student(student_id, update)
            .await
            .map_err(|e| engine_failure("update_student", e))
    }

    /// 删除学生（先退掉其全部课程）
    ///
    /// # 返回
    /// 被退掉的课程ID
    #[instrument(skip(self, ctx), fields(operator = %ctx))]
    pub async fn remove_student(
        &self,
        ctx: &OperatorContext,
        student_id: EntityId,
    ) -> ApiResult<Vec<EntityId>> {
        require_id("student_id", student_id)?;
        self.roster
            .remove_student(student_id)
            .await
            .map_err(|e| engine_failure("remove_student", e))
    }

    pub async fn get_student(&self, _ctx: &OperatorContext, student_id: EntityId) -> ApiResult<Student> {
        require_id("student_id", student_id)?;
        run_read(&self.store, move |conn| Ok(StudentRepository::get(conn, student_id)?))
            .await
            .map_err(|e| engine_failure("get_student", e))
    }

    pub async fn list_students(&self, _ctx: &OperatorContext) -> ApiResult<Vec<Student>> {
        run_read(&self.store, |conn| Ok(StudentRepository::list_all(conn)?))
            .await
            .map_err(|e| engine_failure("list_students", e))
    }

    // ===== 教师 =====

    #[instrument(skip(self, ctx, draft), fields(operator = %ctx))]
    pub async fn add_teacher(&self, ctx: &OperatorContext, draft: TeacherDraft) -> ApiResult<Teacher> {
        self.roster
            .add_teacher(draft)
            .await
            .map_err(|e| engine_failure("add_teacher", e))
    }

    /// 编辑教师（停用时返回被解除的课程）
    #[instrument(skip(self, ctx, update), fields(operator = %ctx))]
    pub async fn update_teacher(
        &self,
        ctx: &OperatorContext,
        teacher_id: EntityId,
        update: TeacherUpdate,
    ) -> ApiResult<TeacherUpdateOutcome> {
        require_id("teacher_id", teacher_id)?;
        self.roster
            .update_teacher(teacher_id, update)
            .await
            .map_err(|e| engine_failure("update_teacher", e))
    }

    #[instrument(skip(self, ctx), fields(operator = %ctx))]
    pub async fn remove_teacher(&self, ctx: &OperatorContext, teacher_id: EntityId) -> ApiResult<()> {
        require_id("teacher_id", teacher_id)?;
        self.roster
            .remove_teacher(teacher_id)
            .await
            .map_err(|e| engine_failure("remove_teacher", e))
    }

    pub async fn get_teacher(&self, _ctx: &OperatorContext, teacher_id: EntityId) -> ApiResult<Teacher> {
        require_id("teacher_id", teacher_id)?;
        run_read(&self.store, move |conn| Ok(TeacherRepository::get(conn, teacher_id)?))
            .await
            .map_err(|e| engine_failure("get_teacher", e))
    }

    pub async fn list_teachers(&self, _ctx: &OperatorContext) -> ApiResult<Vec<Teacher>> {
        run_read(&self.store, |conn| Ok(TeacherRepository::list_all(conn)?))
            .await
            .map_err(|e| engine_failure("list_teachers", e))
    }

    // ===== 计数对账 =====

    pub async fn audit_counters(&self, _ctx: &OperatorContext) -> ApiResult<Vec<CounterDrift>> {
        self.roster
            .audit_counters()
            .await
            .map_err(|e| engine_failure("audit_counters", e))
    }

    #[instrument(skip(self, ctx), fields(operator = %ctx))]
    pub async fn reconcile_counters(&self, ctx: &OperatorContext) -> ApiResult<Vec<CounterDrift>> {
        self.roster
            .reconcile_counters()
            .await
            .map_err(|e| engine_failure("reconcile_counters", e))
    }
}
