// ==========================================
// 语言学校教务系统 - 选课规则引擎
// ==========================================
// 职责: 判定学生选课/退课、教师分配/解除是否允许, 并在同一事务内
//       同步写入关系行与冗余计数
// 红线: Engine 不拼 SQL; 规则按固定顺序检查, 第一个失败的规则即为结果
// 并发: 每个操作是一个 IMMEDIATE 事务, 前置条件读取与写入之间不会被其他写者插入
// ==========================================

use crate::config::EnrollmentLimits;
use crate::domain::enrollment::Enrollment;
use crate::domain::types::EntityId;
use crate::engine::error::{EngineError, EngineResult, RuleViolation};
use crate::engine::executor::run_unit_of_work;
use crate::repository::{
    CourseRepository, EnrollmentRepository, EntityStore, StudentRepository, TeacherRepository,
};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// 教师分配结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentOutcome {
    /// 新建了分配关系
    Assigned,
    /// 同一教师已负责该课程, 未做任何修改
    AlreadyAssigned,
}

// ==========================================
// EnrollmentRuleEngine - 选课规则引擎
// ==========================================
#[derive(Clone)]
pub struct EnrollmentRuleEngine {
    store: EntityStore,
    limits: EnrollmentLimits,
}

impl EnrollmentRuleEngine {
    pub fn new(store: EntityStore, limits: EnrollmentLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> EnrollmentLimits {
        self.limits
    }

    /// 学生选课
    ///
    /// # 规则 (按顺序)
    /// 1. 学生与课程存在 (NotFound)
    /// 2. 课程 ACTIVE (CourseNotActive), 学生 ACTIVE (StudentInactive)
    /// 3. 课程未满 (CourseFull)
    /// 4. 学生未达上限 (StudentQuotaExceeded)
    /// 5. 未选过本课程 (AlreadyEnrolled)
    /// 6. 未在修同语言课程, 忽略大小写 (DuplicateLanguage)
    #[instrument(skip(self))]
    pub async fn enroll_student(
        &self,
        student_id: EntityId,
        course_id: EntityId,
    ) -> EngineResult<Enrollment> {
        let limits = self.limits;
        let result = run_unit_of_work(&self.store, move |conn| {
            enroll_in_tx(conn, &limits, student_id, course_id)
        })
        .await;
        log_outcome("enroll_student", &result);
        result
    }

    /// 学生退课
    ///
    /// 选课行必须存在 (NotEnrolled); 两侧计数各减 1, 下限为 0
    #[instrument(skip(self))]
    pub async fn unenroll_student(&self, student_id: EntityId, course_id: EntityId) -> EngineResult<()> {
        let result = run_unit_of_work(&self.store, move |conn| {
            unenroll_in_tx(conn, student_id, course_id)
        })
        .await;
        log_outcome("unenroll_student", &result);
        result
    }

    /// 为课程分配教师
    ///
    /// # 规则 (按顺序)
    /// 1. 课程与教师存在 (NotFound)
    /// 2. 课程 ACTIVE (CourseNotActive)
    /// 3. 教师 ACTIVE (TeacherInactive)
    /// 4. 课程尚无教师 (CourseAlreadyAssigned); 同一教师重复分配视为成功且不改动
    /// 5. 教师未达上限 (TeacherQuotaExceeded)
    #[instrument(skip(self))]
    pub async fn assign_teacher(
        &self,
        course_id: EntityId,
        teacher_id: EntityId,
    ) -> EngineResult<AssignmentOutcome> {
        let limits = self.limits;
        let result = run_unit_of_work(&self.store, move |conn| {
            assign_in_tx(conn, &limits, course_id, teacher_id)
        })
        .await;
        log_outcome("assign_teacher", &result);
        result
    }

    /// 解除课程教师
    ///
    /// # 返回
    /// - Ok(Some(teacher_id)): 被解除的教师
    /// - Ok(None): 课程本来就没有教师
    #[instrument(skip(self))]
    pub async fn unassign_teacher(&self, course_id: EntityId) -> EngineResult<Option<EntityId>> {
        let result = run_unit_of_work(&self.store, move |conn| unassign_in_tx(conn, course_id)).await;
        log_outcome("unassign_teacher", &result);
        result
    }
}

/// 规则拒绝只记 debug, 基础设施错误交给调用方记录
fn log_outcome<T>(operation: &str, result: &EngineResult<T>) {
    match result {
        Ok(_) => info!(operation, "操作成功"),
        Err(EngineError::Rule(violation)) => debug!(operation, %violation, "业务规则拒绝"),
        Err(_) => {}
    }
}

// ==========================================
// 事务内规则实现
// ==========================================
// 这些函数假定调用方已经打开工作单元事务, 课程生命周期与资料管理的级联复用它们

pub(crate) fn enroll_in_tx(
    conn: &Connection,
    limits: &EnrollmentLimits,
    student_id: EntityId,
    course_id: EntityId,
) -> EngineResult<Enrollment> {
    let student = StudentRepository::find_by_id(conn, student_id)?
        .ok_or_else(|| EngineError::not_found("Student", student_id))?;
    let course = CourseRepository::find_by_id(conn, course_id)?
        .ok_or_else(|| EngineError::not_found("Course", course_id))?;

    if !course.is_active() {
        return Err(RuleViolation::CourseNotActive {
            course_id,
            status: course.status,
        }
        .into());
    }
    if !student.status.is_active() {
        return Err(RuleViolation::StudentInactive { student_id }.into());
    }

    if course.is_full() {
        return Err(RuleViolation::CourseFull {
            course_id,
            max_students: course.max_students,
        }
        .into());
    }

    if student.at_quota(limits.max_courses_per_student) {
        return Err(RuleViolation::StudentQuotaExceeded {
            student_id,
            limit: limits.max_courses_per_student,
        }
        .into());
    }

    if EnrollmentRepository::find(conn, student_id, course_id)?.is_some() {
        return Err(RuleViolation::AlreadyEnrolled {
            student_id,
            course_id,
        }
        .into());
    }

    let current_courses = CourseRepository::list_by_student(conn, student_id)?;
    if let Some(existing) = current_courses
        .iter()
        .find(|c| c.course_id != course_id && c.same_language(&course.language))
    {
        return Err(RuleViolation::DuplicateLanguage {
            student_id,
            language: course.language.clone(),
            existing_course_id: existing.course_id,
        }
        .into());
    }

    EnrollmentRepository::insert(conn, student_id, course_id)?;
    StudentRepository::adjust_course_count(conn, student_id, 1)?;
    CourseRepository::adjust_student_count(conn, course_id, 1)?;

    EnrollmentRepository::find(conn, student_id, course_id)?.ok_or_else(|| {
        EngineError::StoreUnavailable(format!(
            "选课行写入后未能读回: student_id={}, course_id={}",
            student_id, course_id
        ))
    })
}

pub(crate) fn unenroll_in_tx(
    conn: &Connection,
    student_id: EntityId,
    course_id: EntityId,
) -> EngineResult<()> {
    if !EnrollmentRepository::delete(conn, student_id, course_id)? {
        return Err(RuleViolation::NotEnrolled {
            student_id,
            course_id,
        }
        .into());
    }

    StudentRepository::adjust_course_count(conn, student_id, -1)?;
    CourseRepository::adjust_student_count(conn, course_id, -1)?;
    Ok(())
}

pub(crate) fn assign_in_tx(
    conn: &Connection,
    limits: &EnrollmentLimits,
    course_id: EntityId,
    teacher_id: EntityId,
) -> EngineResult<AssignmentOutcome> {
    let course = CourseRepository::find_by_id(conn, course_id)?
        .ok_or_else(|| EngineError::not_found("Course", course_id))?;
    let teacher = TeacherRepository::find_by_id(conn, teacher_id)?
        .ok_or_else(|| EngineError::not_found("Teacher", teacher_id))?;

    if !course.is_active() {
        return Err(RuleViolation::CourseNotActive {
            course_id,
            status: course.status,
        }
        .into());
    }

    if !teacher.status.is_active() {
        return Err(RuleViolation::TeacherInactive { teacher_id }.into());
    }

    match course.teacher_id {
        Some(current) if current == teacher_id => return Ok(AssignmentOutcome::AlreadyAssigned),
        Some(current) => {
            return Err(RuleViolation::CourseAlreadyAssigned {
                course_id,
                teacher_id: current,
            }
            .into())
        }
        None => {}
    }

    if teacher.at_quota(limits.max_courses_per_teacher) {
        return Err(RuleViolation::TeacherQuotaExceeded {
            teacher_id,
            limit: limits.max_courses_per_teacher,
        }
        .into());
    }

    CourseRepository::set_teacher(conn, course_id, Some(teacher_id))?;
    TeacherRepository::adjust_course_count(conn, teacher_id, 1)?;
    Ok(AssignmentOutcome::Assigned)
}

pub(crate) fn unassign_in_tx(conn: &Connection, course_id: EntityId) -> EngineResult<Option<EntityId>> {
    let course = CourseRepository::find_by_id(conn, course_id)?
        .ok_or_else(|| EngineError::not_found("Course", course_id))?;

    let Some(teacher_id) = course.teacher_id else {
        return Ok(None);
    };

    CourseRepository::set_teacher(conn, course_id, None)?;
    TeacherRepository::adjust_course_count(conn, teacher_id, -1)?;
    Ok(Some(teacher_id))
}
