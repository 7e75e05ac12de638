// ==========================================
// 语言学校教务系统 - 课程领域模型
// ==========================================
// 不变量:
// - enrolled_student_count <= max_students
// - CANCELLED 课程没有 enrollment, 也没有教师
// - (language, shift, level) 全局唯一
// ==========================================

use crate::domain::types::{CourseStatus, EntityId, Level, Shift};
use crate::domain::validation::{
    check_int_range, FieldResult, MAX_DURATION_HOURS, MAX_MAX_STUDENTS, MIN_DURATION_HOURS,
    MIN_MAX_STUDENTS,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Course - 课程
// ==========================================
// 对齐: course 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: EntityId,
    pub language: String,
    pub shift: Shift,
    pub level: Level,
    pub start_date: NaiveDate,
    pub duration_hours: i32,
    pub max_students: i32,
    pub enrolled_student_count: i32, // 冗余计数 (缓存)
    pub status: CourseStatus,
    pub teacher_id: Option<EntityId>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Course {
    /// 是否已满员
    pub fn is_full(&self) -> bool {
        self.enrolled_student_count >= self.max_students
    }

    /// 剩余名额，最小为 0
    pub fn remaining_seats(&self) -> i32 {
        (self.max_students - self.enrolled_student_count).max(0)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, CourseStatus::Active)
    }

    /// 语言是否相同（忽略大小写）
    pub fn same_language(&self, language: &str) -> bool {
        self.language.to_lowercase() == language.to_lowercase()
    }
}

// ==========================================
// CourseDraft - 新建课程表单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDraft {
    pub language: String,
    pub shift: Shift,
    pub level: Level,
    pub start_date: NaiveDate,
    pub duration_hours: i32,
    pub max_students: i32,
}

impl CourseDraft {
    /// 数值字段范围校验（语言由 LanguageCatalog 校验）
    pub fn validate(&self) -> FieldResult<()> {
        check_int_range(
            "duration_hours",
            self.duration_hours,
            MIN_DURATION_HOURS,
            MAX_DURATION_HOURS,
        )?;
        check_int_range(
            "max_students",
            self.max_students,
            MIN_MAX_STUDENTS,
            MAX_MAX_STUDENTS,
        )?;
        Ok(())
    }
}

// ==========================================
// CourseUpdate - 编辑课程
// ==========================================
// status 从 ACTIVE 改为 CANCELLED 时触发级联
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseUpdate {
    pub language: String,
    pub shift: Shift,
    pub level: Level,
    pub start_date: NaiveDate,
    pub duration_hours: i32,
    pub max_students: i32,
    pub status: CourseStatus,
}

impl CourseUpdate {
    /// 以现有课程为底稿构造更新（便于只改个别字段）
    pub fn from_course(course: &Course) -> Self {
        Self {
            language: course.language.clone(),
            shift: course.shift,
            level: course.level,
            start_date: course.start_date,
            duration_hours: course.duration_hours,
            max_students: course.max_students,
            status: course.status,
        }
    }

    pub fn validate(&self) -> FieldResult<()> {
        check_int_range(
            "duration_hours",
            self.duration_hours,
            MIN_DURATION_HOURS,
            MAX_DURATION_HOURS,
        )?;
        check_int_range(
            "max_students",
            self.max_students,
            MIN_MAX_STUDENTS,
            MAX_MAX_STUDENTS,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(enrolled: i32, max: i32) -> Course {
        Course {
            course_id: 1,
            language: "Japanese".to_string(),
            shift: Shift::Morning,
            level: Level::Beginner,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            duration_hours: 40,
            max_students: max,
            enrolled_student_count: enrolled,
            status: CourseStatus::Active,
            teacher_id: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_capacity_helpers() {
        assert!(course(10, 10).is_full());
        assert!(!course(9, 10).is_full());
        assert_eq!(course(9, 10).remaining_seats(), 1);
        assert_eq!(course(12, 10).remaining_seats(), 0);
    }

    #[test]
    fn test_same_language_ignores_case() {
        assert!(course(0, 10).same_language("JAPANESE"));
        assert!(!course(0, 10).same_language("Korean"));
    }

    #[test]
    fn test_draft_ranges() {
        let mut draft = CourseDraft {
            language: "Japanese".to_string(),
            shift: Shift::Evening,
            level: Level::Beginner,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            duration_hours: 40,
            max_students: 10,
        };
        assert!(draft.validate().is_ok());

        draft.duration_hours = 60;
        assert_eq!(draft.validate().unwrap_err().field, "duration_hours");
    }
}
