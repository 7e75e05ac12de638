// ==========================================
// 语言学校教务系统 - 应用层
// ==========================================
// 职责: 装配存储、引擎与 API, 供表现层持有
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
