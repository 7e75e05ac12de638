// ==========================================
// 语言学校教务系统 - 课程数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::course::{Course, CourseDraft, CourseUpdate};
use crate::domain::types::{CourseStatus, EntityId, Level, Shift};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COURSE_COLUMNS: &str = r#"
    c.course_id, c.language, c.shift, c.level, c.start_date, c.duration_hours,
    c.max_students, c.enrolled_student_count, c.status, c.teacher_id, c.updated_at
"#;

/// 非法枚举值转换为列转换错误
fn conversion_error(idx: usize, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("unexpected value '{}'", raw).into(),
    )
}

// ==========================================
// CourseRepository - 课程仓储
// ==========================================
pub struct CourseRepository;

impl CourseRepository {
    fn map_row(row: &Row<'_>) -> rusqlite::Result<Course> {
        let shift_raw: String = row.get(2)?;
        let level_raw: String = row.get(3)?;
        Ok(Course {
            course_id: row.get(0)?,
            language: row.get(1)?,
            shift: Shift::from_str(&shift_raw).ok_or_else(|| conversion_error(2, &shift_raw))?,
            level: Level::from_str(&level_raw).ok_or_else(|| conversion_error(3, &level_raw))?,
            start_date: row.get(4)?,
            duration_hours: row.get(5)?,
            max_students: row.get(6)?,
            enrolled_student_count: row.get(7)?,
            status: CourseStatus::from_str(&row.get::<_, String>(8)?),
            teacher_id: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn query_list(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepositoryResult<Vec<Course>> {
        let mut stmt = conn.prepare(sql)?;
        let courses = stmt
            .query_map(params, Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    /// 新建课程（状态 ACTIVE, 计数 0, 无教师）
    pub fn insert(conn: &Connection, draft: &CourseDraft) -> RepositoryResult<EntityId> {
        conn.execute(
            r#"
            INSERT INTO course (
                language, shift, level, start_date, duration_hours,
                max_students, enrolled_student_count, status, teacher_id, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, NULL, NULL)
            "#,
            params![
                draft.language,
                draft.shift.to_db_str(),
                draft.level.to_db_str(),
                draft.start_date,
                draft.duration_hours,
                draft.max_students,
                CourseStatus::Active.to_db_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按ID查询
    pub fn find_by_id(conn: &Connection, course_id: EntityId) -> RepositoryResult<Option<Course>> {
        let sql = format!("SELECT {} FROM course c WHERE c.course_id = ?1", COURSE_COLUMNS);
        let course = conn
            .query_row(&sql, params![course_id], Self::map_row)
            .optional()?;
        Ok(course)
    }

    /// 按ID查询, 不存在时返回 NotFound
    pub fn get(conn: &Connection, course_id: EntityId) -> RepositoryResult<Course> {
        Self::find_by_id(conn, course_id)?
            .ok_or_else(|| RepositoryError::not_found("Course", course_id))
    }

    /// 按 (language, shift, level) 查找课程, 可排除指定ID
    ///
    /// 语言比较忽略大小写
    pub fn find_by_definition(
        conn: &Connection,
        language: &str,
        shift: Shift,
        level: Level,
        exclude_id: Option<EntityId>,
    ) -> RepositoryResult<Option<Course>> {
        let sql = format!(
            r#"
            SELECT {} FROM course c
            WHERE lower(c.language) = lower(?1) AND c.shift = ?2 AND c.level = ?3
              AND (?4 IS NULL OR c.course_id <> ?4)
            LIMIT 1
            "#,
            COURSE_COLUMNS
        );
        let course = conn
            .query_row(
                &sql,
                params![language, shift.to_db_str(), level.to_db_str(), exclude_id],
                Self::map_row,
            )
            .optional()?;
        Ok(course)
    }

    /// 当前开设的不同语言（小写去重后的原始拼写, 按字母排序）
    ///
    /// # 参数
    /// - exclude_id: 统计时排除的课程（编辑课程时排除自身）
    pub fn list_distinct_languages(
        conn: &Connection,
        exclude_id: Option<EntityId>,
    ) -> RepositoryResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT MIN(language) FROM course
            WHERE (?1 IS NULL OR course_id <> ?1)
            GROUP BY lower(language)
            ORDER BY lower(language) ASC
            "#,
        )?;
        let languages = stmt
            .query_map(params![exclude_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(languages)
    }

    /// 查询全部课程（按语言排序）
    pub fn list_all(conn: &Connection) -> RepositoryResult<Vec<Course>> {
        let sql = format!(
            "SELECT {} FROM course c ORDER BY c.language ASC, c.course_id ASC",
            COURSE_COLUMNS
        );
        Self::query_list(conn, &sql, [])
    }

    /// 某学生所选课程（按语言排序）
    pub fn list_by_student(conn: &Connection, student_id: EntityId) -> RepositoryResult<Vec<Course>> {
        let sql = format!(
            r#"
            SELECT {} FROM enrollment e
            JOIN course c ON c.course_id = e.course_id
            WHERE e.student_id = ?1
            ORDER BY c.language ASC
            "#,
            COURSE_COLUMNS
        );
        Self::query_list(conn, &sql, params![student_id])
    }

    /// 某教师负责的课程（按语言排序）
    pub fn list_by_teacher(conn: &Connection, teacher_id: EntityId) -> RepositoryResult<Vec<Course>> {
        let sql = format!(
            "SELECT {} FROM course c WHERE c.teacher_id = ?1 ORDER BY c.language ASC",
            COURSE_COLUMNS
        );
        Self::query_list(conn, &sql, params![teacher_id])
    }

    /// 学生还可加入的课程: ACTIVE、未满、尚未选修
    pub fn list_open_for_student(
        conn: &Connection,
        student_id: EntityId,
    ) -> RepositoryResult<Vec<Course>> {
        let sql = format!(
            r#"
            SELECT {} FROM course c
            WHERE c.status = 'ACTIVE'
              AND c.enrolled_student_count < c.max_students
              AND NOT EXISTS (
                  SELECT 1 FROM enrollment e
                  WHERE e.course_id = c.course_id AND e.student_id = ?1
              )
            ORDER BY c.language ASC
            "#,
            COURSE_COLUMNS
        );
        Self::query_list(conn, &sql, params![student_id])
    }

    /// 尚未分配教师的 ACTIVE 课程
    pub fn list_without_teacher(conn: &Connection) -> RepositoryResult<Vec<Course>> {
        let sql = format!(
            r#"
            SELECT {} FROM course c
            WHERE c.status = 'ACTIVE' AND c.teacher_id IS NULL
            ORDER BY c.language ASC
            "#,
            COURSE_COLUMNS
        );
        Self::query_list(conn, &sql, [])
    }

    /// 更新课程字段（不含计数与教师）
    pub fn update_fields(
        conn: &Connection,
        course_id: EntityId,
        update: &CourseUpdate,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            r#"
            UPDATE course
            SET language = ?1, shift = ?2, level = ?3, start_date = ?4,
                duration_hours = ?5, max_students = ?6, status = ?7, updated_at = ?8
            WHERE course_id = ?9
            "#,
            params![
                update.language,
                update.shift.to_db_str(),
                update.level.to_db_str(),
                update.start_date,
                update.duration_hours,
                update.max_students,
                update.status.to_db_str(),
                Utc::now().naive_utc(),
                course_id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Course", course_id));
        }
        Ok(())
    }

    /// 设置/清除课程教师
    pub fn set_teacher(
        conn: &Connection,
        course_id: EntityId,
        teacher_id: Option<EntityId>,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE course SET teacher_id = ?1, updated_at = ?2 WHERE course_id = ?3",
            params![teacher_id, Utc::now().naive_utc(), course_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Course", course_id));
        }
        Ok(())
    }

    /// 调整在读人数（下限为 0）
    pub fn adjust_student_count(
        conn: &Connection,
        course_id: EntityId,
        delta: i32,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            r#"
            UPDATE course
            SET enrolled_student_count = MAX(enrolled_student_count + ?1, 0)
            WHERE course_id = ?2
            "#,
            params![delta, course_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Course", course_id));
        }
        Ok(())
    }

    /// 直接写入在读人数（仅用于计数对账）
    pub fn set_student_count(
        conn: &Connection,
        course_id: EntityId,
        count: i32,
    ) -> RepositoryResult<()> {
        conn.execute(
            "UPDATE course SET enrolled_student_count = ?1 WHERE course_id = ?2",
            params![count, course_id],
        )?;
        Ok(())
    }

    /// 删除课程
    pub fn delete(conn: &Connection, course_id: EntityId) -> RepositoryResult<()> {
        let affected = conn.execute("DELETE FROM course WHERE course_id = ?1", params![course_id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Course", course_id));
        }
        Ok(())
    }

    /// 课程总数
    pub fn count(conn: &Connection) -> RepositoryResult<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM course", [], |row| row.get(0))?)
    }

    /// 指定状态的课程数
    pub fn count_by_status(conn: &Connection, status: CourseStatus) -> RepositoryResult<i64> {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM course WHERE status = ?1",
            params![status.to_db_str()],
            |row| row.get(0),
        )?)
    }
}
