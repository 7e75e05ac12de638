// ==========================================
// 语言学校教务系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分连接外键开启/部分不开启”
// - 统一 busy_timeout，并发选课时后到的写事务排队等待而不是立即报 busy
// - 建库脚本集中在此处，测试与应用共用同一份 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 建库脚本（幂等）
///
/// 说明：
/// - 三个计数字段是冗余缓存，真实来源是 enrollment 行与 course.teacher_id
/// - enrollment 使用 (student_id, course_id) 复合主键
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS student (
    student_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    birth_date TEXT NOT NULL,
    gender TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    enrolled_course_count INTEGER NOT NULL DEFAULT 0 CHECK (enrolled_course_count >= 0),
    registered_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS teacher (
    teacher_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    birth_date TEXT NOT NULL,
    gender TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    assigned_course_count INTEGER NOT NULL DEFAULT 0 CHECK (assigned_course_count >= 0),
    registered_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS course (
    course_id INTEGER PRIMARY KEY AUTOINCREMENT,
    language TEXT NOT NULL,
    shift TEXT NOT NULL,
    level TEXT NOT NULL,
    start_date TEXT NOT NULL,
    duration_hours INTEGER NOT NULL,
    max_students INTEGER NOT NULL,
    enrolled_student_count INTEGER NOT NULL DEFAULT 0 CHECK (enrolled_student_count >= 0),
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    teacher_id INTEGER REFERENCES teacher(teacher_id),
    updated_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_course_teacher ON course(teacher_id);
CREATE INDEX IF NOT EXISTS idx_course_definition ON course(language, shift, level);

CREATE TABLE IF NOT EXISTS enrollment (
    student_id INTEGER NOT NULL REFERENCES student(student_id),
    course_id INTEGER NOT NULL REFERENCES course(course_id),
    enrolled_at TEXT NOT NULL,
    PRIMARY KEY (student_id, course_id)
);

CREATE INDEX IF NOT EXISTS idx_enrollment_course ON enrollment(course_id);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化 schema（幂等），并登记当前 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
