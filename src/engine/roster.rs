// ==========================================
// 语言学校教务系统 - 学生/教师资料管理
// ==========================================
// 职责: 学生与教师的新增、编辑、删除; 冗余计数对账
// 红线: 资料编辑路径不修改冗余计数; 涉及关系行的变更复用选课引擎的事务内实现
// ==========================================

use crate::domain::enrollment::CounterDrift;
use crate::domain::student::{Student, StudentDraft, StudentUpdate};
use crate::domain::teacher::{Teacher, TeacherDraft, TeacherUpdate};
use crate::domain::types::{CounterEntity, EntityId, PersonStatus};
use crate::engine::enrollment_rules::{unassign_in_tx, unenroll_in_tx};
use crate::engine::error::{EngineError, EngineResult, RuleViolation};
use crate::engine::executor::{run_read, run_unit_of_work};
use crate::repository::{
    CourseRepository, EnrollmentRepository, EntityStore, StudentRepository, TeacherRepository,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// 编辑教师结果
#[derive(Debug, Clone, Serialize)]
pub struct TeacherUpdateOutcome {
    pub teacher: Teacher,
    /// 因停用而被解除的课程
    pub released_courses: Vec<EntityId>,
}

// ==========================================
// RosterManager - 资料管理器
// ==========================================
#[derive(Clone)]
pub struct RosterManager {
    store: EntityStore,
}

impl RosterManager {
    pub fn new(store: EntityStore) -> Self {
        Self { store }
    }

    // ===== 学生 =====

    /// 新增学生（同名且出生日期相同视为重复）
    #[instrument(skip(self, draft))]
    pub async fn add_student(&self, draft: StudentDraft) -> EngineResult<Student> {
        let result = run_unit_of_work(&self.store, move |conn| {
            let draft = draft.normalized()?;
            if let Some(existing) =
                StudentRepository::find_by_identity(conn, &draft.name, draft.birth_date)?
            {
                return Err(RuleViolation::DuplicateStudent {
                    existing_student_id: existing.student_id,
                }
                .into());
            }
            let student_id = StudentRepository::insert(conn, &draft)?;
            Ok(StudentRepository::get(conn, student_id)?)
        })
        .await;

        log_outcome("add_student", &result);
        result
    }

    /// 编辑学生资料
    #[instrument(skip(self, update))]
    pub async fn update_student(
        &self,
        student_id: EntityId,
        update: StudentUpdate,
    ) -> EngineResult<Student> {
        let result = run_unit_of_work(&self.store, move |conn| {
            StudentRepository::find_by_id(conn, student_id)?
                .ok_or_else(|| EngineError::not_found("Student", student_id))?;

            let update = update.normalized()?;
            if let Some(existing) =
                StudentRepository::find_by_identity(conn, &update.name, update.birth_date)?
            {
                if existing.student_id != student_id {
                    return Err(RuleViolation::DuplicateStudent {
                        existing_student_id: existing.student_id,
                    }
                    .into());
                }
            }

            StudentRepository::update_profile(conn, student_id, &update)?;
            Ok(StudentRepository::get(conn, student_id)?)
        })
        .await;

        log_outcome("update_student", &result);
        result
    }

    /// 删除学生: 先退掉全部课程, 再删除
    ///
    /// # 返回
    /// 被退掉的课程ID
    #[instrument(skip(self))]
    pub async fn remove_student(&self, student_id: EntityId) -> EngineResult<Vec<EntityId>> {
        let result = run_unit_of_work(&self.store, move |conn| {
            StudentRepository::find_by_id(conn, student_id)?
                .ok_or_else(|| EngineError::not_found("Student", student_id))?;

            let mut released = Vec::new();
            for enrollment in EnrollmentRepository::list_by_student(conn, student_id)? {
                unenroll_in_tx(conn, student_id, enrollment.course_id)?;
                released.push(enrollment.course_id);
            }
            StudentRepository::delete(conn, student_id)?;
            Ok(released)
        })
        .await;

        log_outcome("remove_student", &result);
        result
    }

    // ===== 教师 =====

    /// 新增教师（同名且邮箱相同视为重复）
    #[instrument(skip(self, draft))]
    pub async fn add_teacher(&self, draft: TeacherDraft) -> EngineResult<Teacher> {
        let result = run_unit_of_work(&self.store, move |conn| {
            let draft = draft.normalized()?;
            if let Some(existing) = TeacherRepository::find_by_identity(conn, &draft.name, &draft.email)? {
                return Err(RuleViolation::DuplicateTeacher {
                    existing_teacher_id: existing.teacher_id,
                }
                .into());
            }
            let teacher_id = TeacherRepository::insert(conn, &draft)?;
            Ok(TeacherRepository::get(conn, teacher_id)?)
        })
        .await;

        log_outcome("add_teacher", &result);
        result
    }

    /// 编辑教师资料
    ///
    /// 状态改为 INACTIVE 时, 同一事务内解除其负责的全部课程
    #[instrument(skip(self, update))]
    pub async fn update_teacher(
        &self,
        teacher_id: EntityId,
        update: TeacherUpdate,
    ) -> EngineResult<TeacherUpdateOutcome> {
        let result = run_unit_of_work(&self.store, move |conn| {
            let current = TeacherRepository::find_by_id(conn, teacher_id)?
                .ok_or_else(|| EngineError::not_found("Teacher", teacher_id))?;

            let update = update.normalized()?;
            if let Some(existing) = TeacherRepository::find_by_identity(conn, &update.name, &update.email)? {
                if existing.teacher_id != teacher_id {
                    return Err(RuleViolation::DuplicateTeacher {
                        existing_teacher_id: existing.teacher_id,
                    }
                    .into());
                }
            }

            TeacherRepository::update_profile(conn, teacher_id, &update)?;

            let mut released_courses = Vec::new();
            if current.status.is_active() && update.status == PersonStatus::Inactive {
                for course in CourseRepository::list_by_teacher(conn, teacher_id)? {
                    unassign_in_tx(conn, course.course_id)?;
                    released_courses.push(course.course_id);
                }
            }

            Ok(TeacherUpdateOutcome {
                teacher: TeacherRepository::get(conn, teacher_id)?,
                released_courses,
            })
        })
        .await;

        log_outcome("update_teacher", &result);
        result
    }

    /// 删除教师; 仍负责课程时拒绝
    #[instrument(skip(self))]
    pub async fn remove_teacher(&self, teacher_id: EntityId) -> EngineResult<()> {
        let result = run_unit_of_work(&self.store, move |conn| {
            TeacherRepository::find_by_id(conn, teacher_id)?
                .ok_or_else(|| EngineError::not_found("Teacher", teacher_id))?;

            let courses = CourseRepository::list_by_teacher(conn, teacher_id)?;
            if !courses.is_empty() {
                return Err(RuleViolation::TeacherHasCourses {
                    teacher_id,
                    course_count: courses.len(),
                }
                .into());
            }
            TeacherRepository::delete(conn, teacher_id)?;
            Ok(())
        })
        .await;

        log_outcome("remove_teacher", &result);
        result
    }

    // ===== 计数对账 =====

    /// 检查冗余计数是否与关系行一致
    pub async fn audit_counters(&self) -> EngineResult<Vec<CounterDrift>> {
        let drift = run_read(&self.store, |conn| {
            Ok(EnrollmentRepository::find_counter_drift(conn)?)
        })
        .await?;

        for d in &drift {
            warn!(entity = %d.entity, id = d.id, cached = d.cached, actual = d.actual, "冗余计数不一致");
        }
        Ok(drift)
    }

    /// 按关系行重写不一致的冗余计数
    ///
    /// # 返回
    /// 修正前检测到的不一致记录
    #[instrument(skip(self))]
    pub async fn reconcile_counters(&self) -> EngineResult<Vec<CounterDrift>> {
        let drift = run_unit_of_work(&self.store, |conn| {
            let drift = EnrollmentRepository::find_counter_drift(conn)?;
            for d in &drift {
                match d.entity {
                    CounterEntity::Student => StudentRepository::set_course_count(conn, d.id, d.actual)?,
                    CounterEntity::Course => CourseRepository::set_student_count(conn, d.id, d.actual)?,
                    CounterEntity::Teacher => TeacherRepository::set_course_count(conn, d.id, d.actual)?,
                }
            }
            Ok(drift)
        })
        .await?;

        if !drift.is_empty() {
            info!(fixed = drift.len(), "冗余计数已对账");
        }
        Ok(drift)
    }
}

fn log_outcome<T>(operation: &str, result: &EngineResult<T>) {
    match result {
        Ok(_) => info!(operation, "资料已保存"),
        Err(EngineError::Rule(violation)) => debug!(operation, %violation, "资料操作被拒绝"),
        Err(_) => {}
    }
}
