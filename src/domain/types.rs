// ==========================================
// 语言学校教务系统 - 领域类型定义
// ==========================================
// 存储格式: SCREAMING_SNAKE_CASE 字符串 (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 学生/教师/课程的主键类型 (SQLite INTEGER PRIMARY KEY)
pub type EntityId = i64;

// ==========================================
// 性别 (Gender)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Gender {
    /// 从字符串解析性别
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "MALE" => Gender::Male,
            "FEMALE" => Gender::Female,
            _ => Gender::Other, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

// ==========================================
// 人员状态 (Person Status)
// ==========================================
// 学生与教师共用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonStatus {
    Active,   // 在读/在职
    Inactive, // 停用
}

impl fmt::Display for PersonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl PersonStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "INACTIVE" => PersonStatus::Inactive,
            _ => PersonStatus::Active, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PersonStatus::Active => "ACTIVE",
            PersonStatus::Inactive => "INACTIVE",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, PersonStatus::Active)
    }
}

// ==========================================
// 课程状态 (Course Status)
// ==========================================
// 状态机:
//   ACTIVE -> COMPLETED  (终态, 无级联)
//   ACTIVE -> CANCELLED  (终态, 级联退课 + 解除教师)
// COMPLETED / CANCELLED 不可再迁出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseStatus {
    Active,    // 进行中
    Completed, // 已结课
    Cancelled, // 已取消
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl CourseStatus {
    /// 从字符串解析课程状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "COMPLETED" => CourseStatus::Completed,
            "CANCELLED" => CourseStatus::Cancelled,
            _ => CourseStatus::Active, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CourseStatus::Active => "ACTIVE",
            CourseStatus::Completed => "COMPLETED",
            CourseStatus::Cancelled => "CANCELLED",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CourseStatus::Active)
    }

    /// 判断状态迁移是否合法（保持原状态视为合法）
    pub fn can_transition_to(&self, next: CourseStatus) -> bool {
        *self == next || matches!(self, CourseStatus::Active)
    }
}

// ==========================================
// 上课时段 (Shift)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Morning,   // 上午
    Afternoon, // 下午
    Evening,   // 晚上
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Shift {
    /// 从字符串解析时段
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MORNING" => Some(Shift::Morning),
            "AFTERNOON" => Some(Shift::Afternoon),
            "EVENING" => Some(Shift::Evening),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Shift::Morning => "MORNING",
            Shift::Afternoon => "AFTERNOON",
            Shift::Evening => "EVENING",
        }
    }
}

// ==========================================
// 课程级别 (Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Beginner,     // 初级
    Intermediate, // 中级
    Advanced,     // 高级
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Level {
    /// 从字符串解析级别
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BEGINNER" => Some(Level::Beginner),
            "INTERMEDIATE" => Some(Level::Intermediate),
            "ADVANCED" => Some(Level::Advanced),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Level::Beginner => "BEGINNER",
            Level::Intermediate => "INTERMEDIATE",
            Level::Advanced => "ADVANCED",
        }
    }
}

// ==========================================
// 冗余计数所属实体 (Counter Entity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounterEntity {
    Student, // enrolled_course_count
    Course,  // enrolled_student_count
    Teacher, // assigned_course_count
}

impl fmt::Display for CounterEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl CounterEntity {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CounterEntity::Student => "STUDENT",
            CounterEntity::Course => "COURSE",
            CounterEntity::Teacher => "TEACHER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_status_transitions() {
        assert!(CourseStatus::Active.can_transition_to(CourseStatus::Completed));
        assert!(CourseStatus::Active.can_transition_to(CourseStatus::Cancelled));
        assert!(CourseStatus::Cancelled.can_transition_to(CourseStatus::Cancelled));
        assert!(!CourseStatus::Completed.can_transition_to(CourseStatus::Active));
        assert!(!CourseStatus::Cancelled.can_transition_to(CourseStatus::Completed));
        assert!(CourseStatus::Completed.is_terminal());
        assert!(!CourseStatus::Active.is_terminal());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Shift::from_str("evening"), Some(Shift::Evening));
        assert_eq!(Level::from_str("Beginner"), Some(Level::Beginner));
        assert_eq!(Shift::from_str("night"), None);
        assert_eq!(PersonStatus::from_str("inactive"), PersonStatus::Inactive);
        assert_eq!(CourseStatus::from_str("cancelled"), CourseStatus::Cancelled);
    }

    #[test]
    fn test_serde_uses_db_spelling() {
        let json = serde_json::to_string(&CourseStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
        let gender: Gender = serde_json::from_str("\"FEMALE\"").unwrap();
        assert_eq!(gender, Gender::Female);
        let json = serde_json::to_string(&CounterEntity::Teacher).unwrap();
        assert_eq!(json, "\"TEACHER\"");
    }
}
