// ==========================================
// 语言学校教务系统 - 选课关系仓储
// ==========================================
// 红线: Repository 不含业务逻辑; 计数字段的同步由引擎在同一事务内完成
// ==========================================

use crate::domain::enrollment::{CounterDrift, Enrollment};
use crate::domain::types::{CounterEntity, EntityId};
use crate::repository::error::RepositoryResult;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

// ==========================================
// EnrollmentRepository - 选课关系仓储
// ==========================================
pub struct EnrollmentRepository;

impl EnrollmentRepository {
    fn map_row(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
        Ok(Enrollment {
            student_id: row.get(0)?,
            course_id: row.get(1)?,
            enrolled_at: row.get(2)?,
        })
    }

    /// 按复合主键查询
    pub fn find(
        conn: &Connection,
        student_id: EntityId,
        course_id: EntityId,
    ) -> RepositoryResult<Option<Enrollment>> {
        let enrollment = conn
            .query_row(
                r#"
                SELECT student_id, course_id, enrolled_at FROM enrollment
                WHERE student_id = ?1 AND course_id = ?2
                "#,
                params![student_id, course_id],
                Self::map_row,
            )
            .optional()?;
        Ok(enrollment)
    }

    /// 某课程的全部选课行
    pub fn list_by_course(conn: &Connection, course_id: EntityId) -> RepositoryResult<Vec<Enrollment>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT student_id, course_id, enrolled_at FROM enrollment
            WHERE course_id = ?1
            ORDER BY student_id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![course_id], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 某学生的全部选课行
    pub fn list_by_student(conn: &Connection, student_id: EntityId) -> RepositoryResult<Vec<Enrollment>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT student_id, course_id, enrolled_at FROM enrollment
            WHERE student_id = ?1
            ORDER BY course_id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![student_id], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 写入选课行
    pub fn insert(conn: &Connection, student_id: EntityId, course_id: EntityId) -> RepositoryResult<()> {
        conn.execute(
            "INSERT INTO enrollment (student_id, course_id, enrolled_at) VALUES (?1, ?2, ?3)",
            params![student_id, course_id, Utc::now().naive_utc()],
        )?;
        Ok(())
    }

    /// 删除选课行
    ///
    /// # 返回
    /// - Ok(true): 删除了一行
    /// - Ok(false): 不存在
    pub fn delete(conn: &Connection, student_id: EntityId, course_id: EntityId) -> RepositoryResult<bool> {
        let affected = conn.execute(
            "DELETE FROM enrollment WHERE student_id = ?1 AND course_id = ?2",
            params![student_id, course_id],
        )?;
        Ok(affected > 0)
    }

    /// 计数对账: 找出冗余计数与关系行不一致的学生/课程/教师
    pub fn find_counter_drift(conn: &Connection) -> RepositoryResult<Vec<CounterDrift>> {
        let mut drift = Vec::new();

        let mut stmt = conn.prepare(
            r#"
            SELECT s.student_id, s.enrolled_course_count,
                   (SELECT COUNT(*) FROM enrollment e WHERE e.student_id = s.student_id)
            FROM student s
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<(EntityId, i32, i32)>, _>>()?;
        drift.extend(rows.into_iter().filter(|(_, c, a)| c != a).map(|(id, cached, actual)| {
            CounterDrift {
                entity: CounterEntity::Student,
                id,
                cached,
                actual,
            }
        }));

        let mut stmt = conn.prepare(
            r#"
            SELECT c.course_id, c.enrolled_student_count,
                   (SELECT COUNT(*) FROM enrollment e WHERE e.course_id = c.course_id)
            FROM course c
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<(EntityId, i32, i32)>, _>>()?;
        drift.extend(rows.into_iter().filter(|(_, c, a)| c != a).map(|(id, cached, actual)| {
            CounterDrift {
                entity: CounterEntity::Course,
                id,
                cached,
                actual,
            }
        }));

        let mut stmt = conn.prepare(
            r#"
            SELECT t.teacher_id, t.assigned_course_count,
                   (SELECT COUNT(*) FROM course c WHERE c.teacher_id = t.teacher_id)
            FROM teacher t
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<(EntityId, i32, i32)>, _>>()?;
        drift.extend(rows.into_iter().filter(|(_, c, a)| c != a).map(|(id, cached, actual)| {
            CounterDrift {
                entity: CounterEntity::Teacher,
                id,
                cached,
                actual,
            }
        }));

        Ok(drift)
    }
}
