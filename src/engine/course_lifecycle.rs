// ==========================================
// 语言学校教务系统 - 课程生命周期管理
// ==========================================
// 职责: 课程新建/编辑/删除, 维护全局开课约束 (定义唯一、语言数上限、最少进行中课程)
// 级联: ACTIVE -> CANCELLED 与删除课程时, 退掉全部学生并解除教师
// 红线: 级联与状态变更在同一工作单元内提交, 不留下部分级联状态
// ==========================================

use crate::config::{EnrollmentLimits, LanguageCatalog};
use crate::domain::course::{Course, CourseDraft, CourseUpdate};
use crate::domain::types::{CourseStatus, EntityId, Level, Shift};
use crate::engine::enrollment_rules::{unassign_in_tx, unenroll_in_tx};
use crate::engine::error::{EngineError, EngineResult, RuleViolation};
use crate::engine::executor::run_unit_of_work;
use crate::repository::{CourseRepository, EnrollmentRepository, EntityStore};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// 级联清理结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub unenrolled_students: Vec<EntityId>,
    pub unassigned_teacher: Option<EntityId>,
}

/// 编辑课程结果
#[derive(Debug, Clone, Serialize)]
pub struct CourseUpdateOutcome {
    pub course: Course,
    /// 仅在本次编辑把课程取消时存在
    pub cascade: Option<CascadeReport>,
}

// ==========================================
// CourseLifecycleManager - 课程生命周期管理器
// ==========================================
#[derive(Clone)]
pub struct CourseLifecycleManager {
    store: EntityStore,
    limits: EnrollmentLimits,
    catalog: Arc<LanguageCatalog>,
}

impl CourseLifecycleManager {
    pub fn new(store: EntityStore, limits: EnrollmentLimits, catalog: LanguageCatalog) -> Self {
        Self {
            store,
            limits,
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    /// 新建课程
    ///
    /// # 规则 (按顺序)
    /// 1. 字段范围 (InvalidField)
    /// 2. 语言在目录中 (UnknownLanguage), 写入目录标准拼写
    /// 3. (language, shift, level) 不重复 (DuplicateCourseDefinition)
    /// 4. 新语言不得使开设语言数超过上限 (LanguageCatalogFull)
    #[instrument(skip(self, draft), fields(language = %draft.language, shift = %draft.shift, level = %draft.level))]
    pub async fn create_course(&self, draft: CourseDraft) -> EngineResult<Course> {
        let limits = self.limits;
        let catalog = Arc::clone(&self.catalog);

        let result = run_unit_of_work(&self.store, move |conn| {
            draft.validate()?;
            let language = canonical_language(&catalog, &draft.language)?;
            let draft = CourseDraft { language, ..draft };

            check_unique_definition(conn, &draft.language, draft.shift, draft.level, None)?;
            check_language_capacity(conn, &limits, &draft.language, None)?;

            let course_id = CourseRepository::insert(conn, &draft)?;
            Ok(CourseRepository::get(conn, course_id)?)
        })
        .await;

        match &result {
            Ok(course) => info!(course_id = course.course_id, "课程已创建"),
            Err(EngineError::Rule(violation)) => debug!(%violation, "新建课程被拒绝"),
            Err(_) => {}
        }
        result
    }

    /// 编辑课程
    ///
    /// 状态由 ACTIVE 改为 CANCELLED 时, 在同一事务内级联退课并解除教师
    #[instrument(skip(self, update), fields(status = %update.status))]
    pub async fn update_course(
        &self,
        course_id: EntityId,
        update: CourseUpdate,
    ) -> EngineResult<CourseUpdateOutcome> {
        let limits = self.limits;
        let catalog = Arc::clone(&self.catalog);

        let result = run_unit_of_work(&self.store, move |conn| {
            update_in_tx(conn, &limits, &catalog, course_id, update)
        })
        .await;

        match &result {
            Ok(outcome) => info!(
                course_id,
                cancelled = outcome.cascade.is_some(),
                "课程已更新"
            ),
            Err(EngineError::Rule(violation)) => debug!(course_id, %violation, "编辑课程被拒绝"),
            Err(_) => {}
        }
        result
    }

    /// 删除课程
    ///
    /// 删除最后一门进行中的课程会被拒绝 (SystemMinimumCoursesViolation);
    /// 删除前执行与取消相同的级联清理
    #[instrument(skip(self))]
    pub async fn remove_course(&self, course_id: EntityId) -> EngineResult<CascadeReport> {
        let limits = self.limits;

        let result = run_unit_of_work(&self.store, move |conn| {
            let course = CourseRepository::find_by_id(conn, course_id)?
                .ok_or_else(|| EngineError::not_found("Course", course_id))?;

            if course.is_active() {
                let active = CourseRepository::count_by_status(conn, CourseStatus::Active)?;
                if active <= i64::from(limits.min_active_courses) {
                    return Err(RuleViolation::SystemMinimumCoursesViolation {
                        course_id,
                        minimum: limits.min_active_courses,
                    }
                    .into());
                }
            }

            let report = cascade_in_tx(conn, course_id)?;
            CourseRepository::delete(conn, course_id)?;
            Ok(report)
        })
        .await;

        match &result {
            Ok(report) => info!(
                course_id,
                unenrolled = report.unenrolled_students.len(),
                "课程已删除"
            ),
            Err(EngineError::Rule(violation)) => debug!(course_id, %violation, "删除课程被拒绝"),
            Err(_) => {}
        }
        result
    }
}

// ==========================================
// 事务内实现
// ==========================================

fn update_in_tx(
    conn: &Connection,
    limits: &EnrollmentLimits,
    catalog: &LanguageCatalog,
    course_id: EntityId,
    update: CourseUpdate,
) -> EngineResult<CourseUpdateOutcome> {
    let current = CourseRepository::find_by_id(conn, course_id)?
        .ok_or_else(|| EngineError::not_found("Course", course_id))?;

    update.validate()?;
    // 语言未变时沿用已存拼写, 目录缩减后已开设的课程仍可编辑/取消
    let language = if current.same_language(&update.language) {
        current.language.clone()
    } else {
        canonical_language(catalog, &update.language)?
    };
    let update = CourseUpdate { language, ..update };

    if !current.status.can_transition_to(update.status) {
        return Err(RuleViolation::InvalidStatusTransition {
            from: current.status,
            to: update.status,
        }
        .into());
    }

    check_unique_definition(conn, &update.language, update.shift, update.level, Some(course_id))?;
    check_language_capacity(conn, limits, &update.language, Some(course_id))?;

    let cancelling = current.status != CourseStatus::Cancelled
        && update.status == CourseStatus::Cancelled;

    if !cancelling {
        if update.max_students < current.enrolled_student_count {
            return Err(RuleViolation::CapacityBelowEnrollment {
                max_students: update.max_students,
                enrolled: current.enrolled_student_count,
            }
            .into());
        }
        if !current.same_language(&update.language) {
            check_language_change(conn, course_id, &update.language)?;
        }
    }

    CourseRepository::update_fields(conn, course_id, &update)?;

    let cascade = if cancelling {
        Some(cascade_in_tx(conn, course_id)?)
    } else {
        None
    };

    Ok(CourseUpdateOutcome {
        course: CourseRepository::get(conn, course_id)?,
        cascade,
    })
}

/// 级联: 退掉全部学生, 再解除教师
///
/// 任一步失败都会使整个工作单元回滚
pub(crate) fn cascade_in_tx(conn: &Connection, course_id: EntityId) -> EngineResult<CascadeReport> {
    let mut report = CascadeReport::default();

    for enrollment in EnrollmentRepository::list_by_course(conn, course_id)? {
        unenroll_in_tx(conn, enrollment.student_id, course_id)?;
        report.unenrolled_students.push(enrollment.student_id);
    }
    report.unassigned_teacher = unassign_in_tx(conn, course_id)?;

    debug!(
        course_id,
        unenrolled = report.unenrolled_students.len(),
        teacher = ?report.unassigned_teacher,
        "级联清理完成"
    );
    Ok(report)
}

fn canonical_language(catalog: &LanguageCatalog, language: &str) -> EngineResult<String> {
    catalog
        .canonical(language)
        .map(str::to_string)
        .ok_or_else(|| {
            RuleViolation::UnknownLanguage {
                language: language.trim().to_string(),
            }
            .into()
        })
}

fn check_unique_definition(
    conn: &Connection,
    language: &str,
    shift: Shift,
    level: Level,
    exclude_id: Option<EntityId>,
) -> EngineResult<()> {
    if let Some(existing) = CourseRepository::find_by_definition(conn, language, shift, level, exclude_id)? {
        return Err(RuleViolation::DuplicateCourseDefinition {
            language: existing.language,
            shift,
            level,
            existing_course_id: existing.course_id,
        }
        .into());
    }
    Ok(())
}

/// 已开设的语言不受上限约束; 新语言要求当前开设数 < 上限
fn check_language_capacity(
    conn: &Connection,
    limits: &EnrollmentLimits,
    language: &str,
    exclude_id: Option<EntityId>,
) -> EngineResult<()> {
    let offered = CourseRepository::list_distinct_languages(conn, exclude_id)?;
    let needle = language.to_lowercase();
    if offered.iter().any(|l| l.to_lowercase() == needle) {
        return Ok(());
    }
    if offered.len() >= limits.max_distinct_languages.max(0) as usize {
        return Err(RuleViolation::LanguageCatalogFull {
            limit: limits.max_distinct_languages,
            language: language.to_string(),
        }
        .into());
    }
    Ok(())
}

/// 改语言时, 已选本课程的学生不得因此在同一语言下出现两门课
fn check_language_change(conn: &Connection, course_id: EntityId, language: &str) -> EngineResult<()> {
    for enrollment in EnrollmentRepository::list_by_course(conn, course_id)? {
        let clash = CourseRepository::list_by_student(conn, enrollment.student_id)?
            .into_iter()
            .find(|c| c.course_id != course_id && c.same_language(language));
        if let Some(existing) = clash {
            return Err(RuleViolation::DuplicateLanguage {
                student_id: enrollment.student_id,
                language: language.to_string(),
                existing_course_id: existing.course_id,
            }
            .into());
        }
    }
    Ok(())
}
