// ==========================================
// 语言学校教务系统 - 选课 API
// ==========================================
// 职责: 选课/退课、教师分配/解除, 以及选择器使用的候选列表查询
// ==========================================

use crate::api::context::OperatorContext;
use crate::api::error::{engine_failure, ApiResult};
use crate::api::validator::require_id;
use crate::domain::course::Course;
use crate::domain::enrollment::Enrollment;
use crate::domain::student::Student;
use crate::domain::teacher::Teacher;
use crate::domain::types::EntityId;
use crate::engine::executor::run_read;
use crate::engine::{AssignmentOutcome, EnrollmentRuleEngine};
use crate::repository::{CourseRepository, EntityStore, StudentRepository, TeacherRepository};
use tracing::instrument;

// ==========================================
// EnrollmentApi - 选课 API
// ==========================================
pub struct EnrollmentApi {
    engine: EnrollmentRuleEngine,
    store: EntityStore,
}

impl EnrollmentApi {
    pub fn new(engine: EnrollmentRuleEngine, store: EntityStore) -> Self {
        Self { engine, store }
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 学生选课
    #[instrument(skip(self, ctx), fields(operator = %ctx))]
    pub async fn enroll_student(
        &self,
        ctx: &OperatorContext,
        student_id: EntityId,
        course_id: EntityId,
    ) -> ApiResult<Enrollment> {
        require_id("student_id", student_id)?;
        require_id("course_id", course_id)?;

        self.engine
            .enroll_student(student_id, course_id)
            .await
            .map_err(|e| engine_failure("enroll_student", e))
    }

    /// 学生退课
    #[instrument(skip(self, ctx), fields(operator = %ctx))]
    pub async fn unenroll_student(
        &self,
        ctx: &OperatorContext,
        student_id: EntityId,
        course_id: EntityId,
    ) -> ApiResult<()> {
        require_id("student_id", student_id)?;
        require_id("course_id", course_id)?;

        self.engine
            .unenroll_student(student_id, course_id)
            .await
            .map_err(|e| engine_failure("unenroll_student", e))
    }

    /// 分配教师
    #[instrument(skip(self, ctx), fields(operator = %ctx))]
    pub async fn assign_teacher(
        &self,
        ctx: &OperatorContext,
        course_id: EntityId,
        teacher_id: EntityId,
    ) -> ApiResult<AssignmentOutcome> {
        require_id("course_id", course_id)?;
        require_id("teacher_id", teacher_id)?;

        self.engine
            .assign_teacher(course_id, teacher_id)
            .await
            .map_err(|e| engine_failure("assign_teacher", e))
    }

    /// 解除教师
    ///
    /// # 返回
    /// - Ok(Some(teacher_id)): 被解除的教师
    /// - Ok(None): 课程原本没有教师
    #[instrument(skip(self, ctx), fields(operator = %ctx))]
    pub async fn unassign_teacher(
        &self,
        ctx: &OperatorContext,
        course_id: EntityId,
    ) -> ApiResult<Option<EntityId>> {
        require_id("course_id", course_id)?;

        self.engine
            .unassign_teacher(course_id)
            .await
            .map_err(|e| engine_failure("unassign_teacher", e))
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 学生已选课程
    pub async fn list_courses_of_student(
        &self,
        _ctx: &OperatorContext,
        student_id: EntityId,
    ) -> ApiResult<Vec<Course>> {
        require_id("student_id", student_id)?;
        run_read(&self.store, move |conn| {
            StudentRepository::get(conn, student_id)?;
            Ok(CourseRepository::list_by_student(conn, student_id)?)
        })
        .await
        .map_err(|e| engine_failure("list_courses_of_student", e))
    }

    /// 课程在读学生
    pub async fn list_students_of_course(
        &self,
        _ctx: &OperatorContext,
        course_id: EntityId,
    ) -> ApiResult<Vec<Student>> {
        require_id("course_id", course_id)?;
        run_read(&self.store, move |conn| {
            CourseRepository::get(conn, course_id)?;
            Ok(StudentRepository::list_by_course(conn, course_id)?)
        })
        .await
        .map_err(|e| engine_failure("list_students_of_course", e))
    }

    /// 学生还可加入的课程（进行中、未满、未选修）
    pub async fn list_open_courses_for_student(
        &self,
        _ctx: &OperatorContext,
        student_id: EntityId,
    ) -> ApiResult<Vec<Course>> {
        require_id("student_id", student_id)?;
        run_read(&self.store, move |conn| {
            StudentRepository::get(conn, student_id)?;
            Ok(CourseRepository::list_open_for_student(conn, student_id)?)
        })
        .await
        .map_err(|e| engine_failure("list_open_courses_for_student", e))
    }

    /// 可加入某课程的候选学生
    ///
    /// 排除已达上限、已选本课程或已在修同语言课程的学生
    pub async fn list_eligible_students(
        &self,
        _ctx: &OperatorContext,
        course_id: EntityId,
    ) -> ApiResult<Vec<Student>> {
        require_id("course_id", course_id)?;
        let max_courses = self.engine.limits().max_courses_per_student;
        run_read(&self.store, move |conn| {
            let course = CourseRepository::get(conn, course_id)?;
            if !course.is_active() || course.is_full() {
                return Ok(Vec::new());
            }
            Ok(StudentRepository::list_eligible_for_course(
                conn,
                course_id,
                &course.language,
                max_courses,
            )?)
        })
        .await
        .map_err(|e| engine_failure("list_eligible_students", e))
    }

    /// 还有授课余量的在职教师
    pub async fn list_available_teachers(&self, _ctx: &OperatorContext) -> ApiResult<Vec<Teacher>> {
        let max_courses = self.engine.limits().max_courses_per_teacher;
        run_read(&self.store, move |conn| {
            Ok(TeacherRepository::list_with_free_quota(conn, max_courses)?)
        })
        .await
        .map_err(|e| engine_failure("list_available_teachers", e))
    }

    /// 尚未分配教师的进行中课程
    pub async fn list_courses_without_teacher(&self, _ctx: &OperatorContext) -> ApiResult<Vec<Course>> {
        run_read(&self.store, |conn| {
            Ok(CourseRepository::list_without_teacher(conn)?)
        })
        .await
        .map_err(|e| engine_failure("list_courses_without_teacher", e))
    }
}
