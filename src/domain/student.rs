// ==========================================
// 语言学校教务系统 - 学生领域模型
// ==========================================
// 不变量: enrolled_course_count == 该学生的 enrollment 行数 <= 学生选课上限
// 红线: enrolled_course_count 只由选课引擎修改, 资料编辑路径不得触碰
// ==========================================

use crate::domain::types::{EntityId, Gender, PersonStatus};
use crate::domain::validation::{check_date_range, normalize_name, FieldResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Student - 学生
// ==========================================
// 对齐: student 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: EntityId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub status: PersonStatus,
    pub enrolled_course_count: i32, // 冗余计数 (缓存)
    pub registered_at: NaiveDateTime,
}

impl Student {
    /// 是否已达到选课上限
    pub fn at_quota(&self, max_courses: i32) -> bool {
        self.enrolled_course_count >= max_courses
    }
}

/// 学生出生日期允许范围
pub fn birth_date_bounds() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(1950, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(2015, 12, 31).unwrap_or(NaiveDate::MAX),
    )
}

// ==========================================
// StudentDraft - 新增学生表单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDraft {
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

impl StudentDraft {
    /// 校验并返回规范化后的表单
    pub fn normalized(&self) -> FieldResult<StudentDraft> {
        let (min, max) = birth_date_bounds();
        check_date_range("birth_date", self.birth_date, min, max)?;
        Ok(StudentDraft {
            name: normalize_name("name", &self.name)?,
            birth_date: self.birth_date,
            gender: self.gender,
        })
    }
}

// ==========================================
// StudentUpdate - 编辑学生资料
// ==========================================
// 不含计数字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentUpdate {
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub status: PersonStatus,
}

impl StudentUpdate {
    pub fn normalized(&self) -> FieldResult<StudentUpdate> {
        let (min, max) = birth_date_bounds();
        check_date_range("birth_date", self.birth_date, min, max)?;
        Ok(StudentUpdate {
            name: normalize_name("name", &self.name)?,
            birth_date: self.birth_date,
            gender: self.gender,
            status: self.status,
        })
    }
}
