// ==========================================
// 语言学校教务系统 - 教师数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::teacher::{Teacher, TeacherDraft, TeacherUpdate};
use crate::domain::types::{EntityId, Gender, PersonStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const TEACHER_COLUMNS: &str = r#"
    teacher_id, name, email, birth_date, gender, status, assigned_course_count, registered_at
"#;

// ==========================================
// TeacherRepository - 教师仓储
// ==========================================
pub struct TeacherRepository;

impl TeacherRepository {
    fn map_row(row: &Row<'_>) -> rusqlite::Result<Teacher> {
        Ok(Teacher {
            teacher_id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            birth_date: row.get(3)?,
            gender: Gender::from_str(&row.get::<_, String>(4)?),
            status: PersonStatus::from_str(&row.get::<_, String>(5)?),
            assigned_course_count: row.get(6)?,
            registered_at: row.get(7)?,
        })
    }

    /// 新增教师（状态 ACTIVE, 计数 0）
    pub fn insert(conn: &Connection, draft: &TeacherDraft) -> RepositoryResult<EntityId> {
        conn.execute(
            r#"
            INSERT INTO teacher (name, email, birth_date, gender, status, assigned_course_count, registered_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
            "#,
            params![
                draft.name,
                draft.email,
                draft.birth_date,
                draft.gender.to_db_str(),
                PersonStatus::Active.to_db_str(),
                Utc::now().naive_utc(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按ID查询
    pub fn find_by_id(conn: &Connection, teacher_id: EntityId) -> RepositoryResult<Option<Teacher>> {
        let sql = format!("SELECT {} FROM teacher WHERE teacher_id = ?1", TEACHER_COLUMNS);
        let teacher = conn
            .query_row(&sql, params![teacher_id], Self::map_row)
            .optional()?;
        Ok(teacher)
    }

    /// 按ID查询, 不存在时返回 NotFound
    pub fn get(conn: &Connection, teacher_id: EntityId) -> RepositoryResult<Teacher> {
        Self::find_by_id(conn, teacher_id)?
            .ok_or_else(|| RepositoryError::not_found("Teacher", teacher_id))
    }

    /// 按姓名 + 邮箱查重
    pub fn find_by_identity(
        conn: &Connection,
        name: &str,
        email: &str,
    ) -> RepositoryResult<Option<Teacher>> {
        let sql = format!(
            "SELECT {} FROM teacher WHERE name = ?1 AND email = ?2 LIMIT 1",
            TEACHER_COLUMNS
        );
        let teacher = conn
            .query_row(&sql, params![name, email], Self::map_row)
            .optional()?;
        Ok(teacher)
    }

    /// 查询全部教师（按姓名排序）
    pub fn list_all(conn: &Connection) -> RepositoryResult<Vec<Teacher>> {
        let sql = format!("SELECT {} FROM teacher ORDER BY name ASC", TEACHER_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let teachers = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(teachers)
    }

    /// 还有授课余量的在职教师
    pub fn list_with_free_quota(
        conn: &Connection,
        max_courses_per_teacher: i32,
    ) -> RepositoryResult<Vec<Teacher>> {
        let sql = format!(
            r#"
            SELECT {} FROM teacher
            WHERE status = 'ACTIVE' AND assigned_course_count < ?1
            ORDER BY name ASC
            "#,
            TEACHER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let teachers = stmt
            .query_map(params![max_courses_per_teacher], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(teachers)
    }

    /// 更新资料字段（不含计数）
    pub fn update_profile(
        conn: &Connection,
        teacher_id: EntityId,
        update: &TeacherUpdate,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            r#"
            UPDATE teacher
            SET name = ?1, email = ?2, birth_date = ?3, gender = ?4, status = ?5
            WHERE teacher_id = ?6
            "#,
            params![
                update.name,
                update.email,
                update.birth_date,
                update.gender.to_db_str(),
                update.status.to_db_str(),
                teacher_id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Teacher", teacher_id));
        }
        Ok(())
    }

    /// 调整授课计数（下限为 0）
    pub fn adjust_course_count(
        conn: &Connection,
        teacher_id: EntityId,
        delta: i32,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            r#"
            UPDATE teacher
            SET assigned_course_count = MAX(assigned_course_count + ?1, 0)
            WHERE teacher_id = ?2
            "#,
            params![delta, teacher_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Teacher", teacher_id));
        }
        Ok(())
    }

    /// 直接写入授课计数（仅用于计数对账）
    pub fn set_course_count(
        conn: &Connection,
        teacher_id: EntityId,
        count: i32,
    ) -> RepositoryResult<()> {
        conn.execute(
            "UPDATE teacher SET assigned_course_count = ?1 WHERE teacher_id = ?2",
            params![count, teacher_id],
        )?;
        Ok(())
    }

    /// 删除教师
    pub fn delete(conn: &Connection, teacher_id: EntityId) -> RepositoryResult<()> {
        let affected = conn.execute(
            "DELETE FROM teacher WHERE teacher_id = ?1",
            params![teacher_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Teacher", teacher_id));
        }
        Ok(())
    }

    /// 教师总数
    pub fn count(conn: &Connection) -> RepositoryResult<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM teacher", [], |row| row.get(0))?)
    }
}
