// ==========================================
// 语言学校教务系统 - 选课与课程目录上限
// ==========================================

use serde::{Deserialize, Serialize};

/// 每名学生同时在读课程上限
pub const MAX_COURSES_PER_STUDENT: i32 = 3;

/// 每名教师同时负责课程上限
pub const MAX_COURSES_PER_TEACHER: i32 = 3;

/// 全校同时开设的不同语言上限
pub const MAX_DISTINCT_LANGUAGES: i32 = 12;

/// 全校至少保留的 ACTIVE 课程数
pub const MIN_ACTIVE_COURSES: i32 = 1;

/// 引擎使用的上限集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentLimits {
    pub max_courses_per_student: i32,
    pub max_courses_per_teacher: i32,
    pub max_distinct_languages: i32,
    pub min_active_courses: i32,
}

impl Default for EnrollmentLimits {
    fn default() -> Self {
        Self {
            max_courses_per_student: MAX_COURSES_PER_STUDENT,
            max_courses_per_teacher: MAX_COURSES_PER_TEACHER,
            max_distinct_languages: MAX_DISTINCT_LANGUAGES,
            min_active_courses: MIN_ACTIVE_COURSES,
        }
    }
}
