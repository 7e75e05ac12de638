// ==========================================
// 语言学校教务系统 - 教师领域模型
// ==========================================
// 不变量: assigned_course_count <= 教师授课上限; 停用教师不得持有课程
// ==========================================

use crate::domain::types::{EntityId, Gender, PersonStatus};
use crate::domain::validation::{check_date_range, normalize_email, normalize_name, FieldResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Teacher - 教师
// ==========================================
// 对齐: teacher 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub teacher_id: EntityId,
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub status: PersonStatus,
    pub assigned_course_count: i32, // 冗余计数 (缓存)
    pub registered_at: NaiveDateTime,
}

impl Teacher {
    pub fn at_quota(&self, max_courses: i32) -> bool {
        self.assigned_course_count >= max_courses
    }
}

/// 教师出生日期允许范围
pub fn birth_date_bounds() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(1940, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(2010, 12, 31).unwrap_or(NaiveDate::MAX),
    )
}

// ==========================================
// TeacherDraft - 新增教师表单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherDraft {
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

impl TeacherDraft {
    pub fn normalized(&self) -> FieldResult<TeacherDraft> {
        let (min, max) = birth_date_bounds();
        check_date_range("birth_date", self.birth_date, min, max)?;
        Ok(TeacherDraft {
            name: normalize_name("name", &self.name)?,
            email: normalize_email("email", &self.email)?,
            birth_date: self.birth_date,
            gender: self.gender,
        })
    }
}

// ==========================================
// TeacherUpdate - 编辑教师资料
// ==========================================
// status 改为 INACTIVE 时由 RosterManager 级联解除其全部课程
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherUpdate {
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub status: PersonStatus,
}

impl TeacherUpdate {
    pub fn normalized(&self) -> FieldResult<TeacherUpdate> {
        let (min, max) = birth_date_bounds();
        check_date_range("birth_date", self.birth_date, min, max)?;
        Ok(TeacherUpdate {
            name: normalize_name("name", &self.name)?,
            email: normalize_email("email", &self.email)?,
            birth_date: self.birth_date,
            gender: self.gender,
            status: self.status,
        })
    }
}
