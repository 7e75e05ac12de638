// ==========================================
// 语言学校教务系统 - 学生数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约定: 所有函数接收 &Connection, 可在 EntityStore::unit_of_work 的事务内调用
// ==========================================

use crate::domain::student::{Student, StudentDraft, StudentUpdate};
use crate::domain::types::{EntityId, Gender, PersonStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const STUDENT_COLUMNS: &str = r#"
    student_id, name, birth_date, gender, status, enrolled_course_count, registered_at
"#;

// ==========================================
// StudentRepository - 学生仓储
// ==========================================
/// 职责: 管理 student 表的 CRUD 与计数字段写入
pub struct StudentRepository;

impl StudentRepository {
    fn map_row(row: &Row<'_>) -> rusqlite::Result<Student> {
        Ok(Student {
            student_id: row.get(0)?,
            name: row.get(1)?,
            birth_date: row.get(2)?,
            gender: Gender::from_str(&row.get::<_, String>(3)?),
            status: PersonStatus::from_str(&row.get::<_, String>(4)?),
            enrolled_course_count: row.get(5)?,
            registered_at: row.get(6)?,
        })
    }

    /// 新增学生（状态 ACTIVE, 计数 0）
    ///
    /// # 返回
    /// - Ok(EntityId): 新学生ID
    pub fn insert(conn: &Connection, draft: &StudentDraft) -> RepositoryResult<EntityId> {
        conn.execute(
            r#"
            INSERT INTO student (name, birth_date, gender, status, enrolled_course_count, registered_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            "#,
            params![
                draft.name,
                draft.birth_date,
                draft.gender.to_db_str(),
                PersonStatus::Active.to_db_str(),
                Utc::now().naive_utc(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按ID查询
    pub fn find_by_id(conn: &Connection, student_id: EntityId) -> RepositoryResult<Option<Student>> {
        let sql = format!("SELECT {} FROM student WHERE student_id = ?1", STUDENT_COLUMNS);
        let student = conn
            .query_row(&sql, params![student_id], Self::map_row)
            .optional()?;
        Ok(student)
    }

    /// 按ID查询, 不存在时返回 NotFound
    pub fn get(conn: &Connection, student_id: EntityId) -> RepositoryResult<Student> {
        Self::find_by_id(conn, student_id)?
            .ok_or_else(|| RepositoryError::not_found("Student", student_id))
    }

    /// 按姓名 + 出生日期查重
    pub fn find_by_identity(
        conn: &Connection,
        name: &str,
        birth_date: NaiveDate,
    ) -> RepositoryResult<Option<Student>> {
        let sql = format!(
            "SELECT {} FROM student WHERE name = ?1 AND birth_date = ?2 LIMIT 1",
            STUDENT_COLUMNS
        );
        let student = conn
            .query_row(&sql, params![name, birth_date], Self::map_row)
            .optional()?;
        Ok(student)
    }

    /// 查询全部学生（按姓名排序）
    pub fn list_all(conn: &Connection) -> RepositoryResult<Vec<Student>> {
        let sql = format!("SELECT {} FROM student ORDER BY name ASC", STUDENT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let students = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    /// 查询某课程的学生（按姓名排序）
    pub fn list_by_course(conn: &Connection, course_id: EntityId) -> RepositoryResult<Vec<Student>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT s.student_id, s.name, s.birth_date, s.gender, s.status,
                   s.enrolled_course_count, s.registered_at
            FROM enrollment e
            JOIN student s ON s.student_id = e.student_id
            WHERE e.course_id = ?1
            ORDER BY s.name ASC
            "#,
        )?;
        let students = stmt
            .query_map(params![course_id], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    /// 可加入某课程的候选学生
    ///
    /// 条件: ACTIVE、未达上限、未选本课程、未选同语言的任何课程
    pub fn list_eligible_for_course(
        conn: &Connection,
        course_id: EntityId,
        language: &str,
        max_courses_per_student: i32,
    ) -> RepositoryResult<Vec<Student>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT s.student_id, s.name, s.birth_date, s.gender, s.status,
                   s.enrolled_course_count, s.registered_at
            FROM student s
            WHERE s.status = 'ACTIVE'
              AND s.enrolled_course_count < ?3
              AND NOT EXISTS (
                  SELECT 1 FROM enrollment e
                  JOIN course c ON c.course_id = e.course_id
                  WHERE e.student_id = s.student_id
                    AND (e.course_id = ?1 OR lower(c.language) = lower(?2))
              )
            ORDER BY s.name ASC
            "#,
        )?;
        let students = stmt
            .query_map(
                params![course_id, language, max_courses_per_student],
                Self::map_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    /// 更新资料字段（不含计数）
    pub fn update_profile(
        conn: &Connection,
        student_id: EntityId,
        update: &StudentUpdate,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            r#"
            UPDATE student
            SET name = ?1, birth_date = ?2, gender = ?3, status = ?4
            WHERE student_id = ?5
            "#,
            params![
                update.name,
                update.birth_date,
                update.gender.to_db_str(),
                update.status.to_db_str(),
                student_id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Student", student_id));
        }
        Ok(())
    }

    /// 调整选课计数（下限为 0）
    pub fn adjust_course_count(
        conn: &Connection,
        student_id: EntityId,
        delta: i32,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            r#"
            UPDATE student
            SET enrolled_course_count = MAX(enrolled_course_count + ?1, 0)
            WHERE student_id = ?2
            "#,
            params![delta, student_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Student", student_id));
        }
        Ok(())
    }

    /// 直接写入选课计数（仅用于计数对账）
    pub fn set_course_count(
        conn: &Connection,
        student_id: EntityId,
        count: i32,
    ) -> RepositoryResult<()> {
        conn.execute(
            "UPDATE student SET enrolled_course_count = ?1 WHERE student_id = ?2",
            params![count, student_id],
        )?;
        Ok(())
    }

    /// 删除学生
    pub fn delete(conn: &Connection, student_id: EntityId) -> RepositoryResult<()> {
        let affected = conn.execute(
            "DELETE FROM student WHERE student_id = ?1",
            params![student_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Student", student_id));
        }
        Ok(())
    }

    /// 学生总数
    pub fn count(conn: &Connection) -> RepositoryResult<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM student", [], |row| row.get(0))?)
    }
}
