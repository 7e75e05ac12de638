// ==========================================
// 语言学校教务系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::language_catalog::LanguageCatalog;
use crate::config::limits::EnrollmentLimits;
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 读取正整数配置; 缺失或非法时回退默认值
    fn get_positive_i32(&self, key: &str, default: i32) -> Result<i32, Box<dyn Error>> {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<i32>() {
                Ok(v) if v > 0 => Ok(v),
                _ => {
                    warn!(key, value = %raw, default, "配置值非法, 使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// 加载选课/开课上限
    pub fn load_enrollment_limits(&self) -> Result<EnrollmentLimits, Box<dyn Error>> {
        let defaults = EnrollmentLimits::default();
        Ok(EnrollmentLimits {
            max_courses_per_student: self.get_positive_i32(
                config_keys::MAX_COURSES_PER_STUDENT,
                defaults.max_courses_per_student,
            )?,
            max_courses_per_teacher: self.get_positive_i32(
                config_keys::MAX_COURSES_PER_TEACHER,
                defaults.max_courses_per_teacher,
            )?,
            max_distinct_languages: self.get_positive_i32(
                config_keys::MAX_DISTINCT_LANGUAGES,
                defaults.max_distinct_languages,
            )?,
            min_active_courses: self.get_positive_i32(
                config_keys::MIN_ACTIVE_COURSES,
                defaults.min_active_courses,
            )?,
        })
    }

    /// 加载语言目录; JSON 非法或为空时回退内置目录
    pub fn load_language_catalog(&self) -> Result<LanguageCatalog, Box<dyn Error>> {
        let raw = match self.get_config_value(config_keys::LANGUAGE_CATALOG)? {
            Some(v) => v,
            None => return Ok(LanguageCatalog::default()),
        };

        match LanguageCatalog::from_json(&raw) {
            Ok(catalog) if !catalog.is_empty() => Ok(catalog),
            Ok(_) => {
                warn!("language_catalog 为空, 使用内置目录");
                Ok(LanguageCatalog::default())
            }
            Err(e) => {
                warn!(error = %e, "language_catalog 解析失败, 使用内置目录");
                Ok(LanguageCatalog::default())
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 选课上限
    pub const MAX_COURSES_PER_STUDENT: &str = "max_courses_per_student";
    pub const MAX_COURSES_PER_TEACHER: &str = "max_courses_per_teacher";

    // 课程目录
    pub const MAX_DISTINCT_LANGUAGES: &str = "max_distinct_languages";
    pub const MIN_ACTIVE_COURSES: &str = "min_active_courses";
    pub const LANGUAGE_CATALOG: &str = "language_catalog";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::EntityStore;

    fn manager() -> ConfigManager {
        let store = EntityStore::open_in_memory().unwrap();
        ConfigManager::from_connection(store.connection()).unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = manager();
        assert_eq!(config.load_enrollment_limits().unwrap(), EnrollmentLimits::default());
        assert_eq!(config.load_language_catalog().unwrap(), LanguageCatalog::default());
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = manager();
        config
            .set_global_config_value(config_keys::MAX_COURSES_PER_STUDENT, "5")
            .unwrap();
        config
            .set_global_config_value(config_keys::MAX_DISTINCT_LANGUAGES, "-1")
            .unwrap();

        let limits = config.load_enrollment_limits().unwrap();
        assert_eq!(limits.max_courses_per_student, 5);
        assert_eq!(limits.max_distinct_languages, 12);
    }

    #[test]
    fn test_language_catalog_override() {
        let config = manager();
        config
            .set_global_config_value(config_keys::LANGUAGE_CATALOG, r#"["Latin","Esperanto"]"#)
            .unwrap();
        let catalog = config.load_language_catalog().unwrap();
        assert_eq!(catalog.len(), 2);

        config
            .set_global_config_value(config_keys::LANGUAGE_CATALOG, "not json")
            .unwrap();
        assert_eq!(config.load_language_catalog().unwrap(), LanguageCatalog::default());
    }
}
