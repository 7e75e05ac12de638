// ==========================================
// 语言学校教务系统 - 配置层
// ==========================================
// 职责: 选课上限、语言目录等系统配置
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod language_catalog;
pub mod limits;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use language_catalog::LanguageCatalog;
pub use limits::EnrollmentLimits;
