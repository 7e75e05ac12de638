// ==========================================
// 语言学校教务系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;

use crate::api::{CourseApi, DashboardApi, EnrollmentApi, RosterApi};
use crate::config::{ConfigManager, EnrollmentLimits, LanguageCatalog};
use crate::engine::{CourseLifecycleManager, EnrollmentRuleEngine, RosterManager};
use crate::repository::EntityStore;

/// 应用状态
///
/// 包含所有API实例和共享资源, 由表现层持有
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 选课API
    pub enrollment_api: Arc<EnrollmentApi>,

    /// 课程API
    pub course_api: Arc<CourseApi>,

    /// 学生/教师资料API
    pub roster_api: Arc<RosterApi>,

    /// 首页概览API
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理器（维护脚本修改上限时使用）
    pub config_manager: Arc<ConfigManager>,

    /// 启动时加载的上限
    pub limits: EnrollmentLimits,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时创建并建表）
    ///
    /// # 说明
    /// 上限与语言目录在启动时从 config_kv 读取一次; 修改配置后需重建 AppState
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let store =
            EntityStore::open(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        Self::from_store(db_path, store)
    }

    /// 基于已打开的 EntityStore 装配（测试可传入内存库）
    pub fn from_store(db_path: String, store: EntityStore) -> Result<Self, String> {
        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(store.connection())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let limits = config_manager
            .load_enrollment_limits()
            .map_err(|e| format!("无法加载选课上限: {}", e))?;
        let catalog: LanguageCatalog = config_manager
            .load_language_catalog()
            .map_err(|e| format!("无法加载语言目录: {}", e))?;

        tracing::info!(
            max_courses_per_student = limits.max_courses_per_student,
            max_courses_per_teacher = limits.max_courses_per_teacher,
            max_distinct_languages = limits.max_distinct_languages,
            catalog_size = catalog.len(),
            "配置加载完成"
        );

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let rule_engine = EnrollmentRuleEngine::new(store.clone(), limits);
        let lifecycle = CourseLifecycleManager::new(store.clone(), limits, catalog);
        let roster = RosterManager::new(store.clone());

        // ==========================================
        // 创建API实例
        // ==========================================
        let enrollment_api = Arc::new(EnrollmentApi::new(rule_engine, store.clone()));
        let course_api = Arc::new(CourseApi::new(lifecycle, store.clone()));
        let roster_api = Arc::new(RosterApi::new(roster, store.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(store, limits));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            enrollment_api,
            course_api,
            roster_api,
            dashboard_api,
            config_manager,
            limits,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 LANGUAGE_SCHOOL_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("LANGUAGE_SCHOOL_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./language_school.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("language-school");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("language_school.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_from_in_memory_store() {
        let store = EntityStore::open_in_memory().unwrap();
        let state = AppState::from_store(":memory:".to_string(), store).unwrap();
        assert_eq!(state.limits, EnrollmentLimits::default());
    }
}
