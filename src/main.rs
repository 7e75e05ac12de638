// ==========================================
// 语言学校教务系统 - 主入口
// ==========================================
// 打开 (必要时创建) 数据库, 加载配置, 输出概览与计数对账结果
// 环境变量:
// - LANGUAGE_SCHOOL_DB_PATH: 数据库路径
// - LOG_FORMAT=json: JSON 行日志
// - RUST_LOG: 日志级别
// ==========================================

use anyhow::{anyhow, Context};
use language_school::api::OperatorContext;
use language_school::app::{get_default_db_path, AppState};
use language_school::logging::{self, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(LogFormat::from_env());

    tracing::info!("==================================================");
    tracing::info!("{}", language_school::APP_NAME);
    tracing::info!("系统版本: {}", language_school::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(|e| anyhow!(e)).context("无法初始化AppState")?;
    let ctx = OperatorContext::system();

    let (summary, drift) = futures::future::join(
        state.dashboard_api.summary(&ctx),
        state.roster_api.audit_counters(&ctx),
    )
    .await;

    let summary = summary.context("概览查询失败")?;
    tracing::info!(
        students = summary.total_students,
        teachers = summary.total_teachers,
        courses = summary.total_courses,
        active_courses = summary.active_courses,
        languages = summary.distinct_languages,
        language_slots_left = summary.language_slots_left,
        "系统概览"
    );

    let drift = drift.context("计数检查失败")?;
    if drift.is_empty() {
        tracing::info!("冗余计数一致");
    } else {
        tracing::warn!(count = drift.len(), "发现冗余计数不一致, 可调用 reconcile_counters 修正");
    }

    Ok(())
}
