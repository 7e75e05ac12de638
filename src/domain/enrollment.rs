// ==========================================
// 语言学校教务系统 - 选课关系
// ==========================================
// 复合主键 (student_id, course_id); 只由选课引擎创建/删除, 不做原地修改
// ==========================================

use crate::domain::types::{CounterEntity, EntityId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: EntityId,
    pub course_id: EntityId,
    pub enrolled_at: NaiveDateTime,
}

/// 冗余计数与关系行不一致的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterDrift {
    pub entity: CounterEntity,
    pub id: EntityId,
    pub cached: i32,
    pub actual: i32,
}
