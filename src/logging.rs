// ==========================================
// 语言学校教务系统 - 日志初始化
// ==========================================
// 工具: tracing + tracing-subscriber
// 约定: 业务规则拒绝记 debug/info, 基础设施失败由 API 层记 error
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 未设置 RUST_LOG 时的过滤器
const DEFAULT_FILTER: &str = "info";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人类可读的单行文本
    Text,
    /// JSON 行, 带当前 span 字段 (operator, student_id ...)
    Json,
}

impl LogFormat {
    /// 从 LOG_FORMAT 读取, 只认 "json" (忽略大小写), 其余一律文本
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(v) => Self::parse(&v),
            Err(_) => LogFormat::Text,
        }
    }

    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 过滤器, 例如 RUST_LOG=language_school::engine=debug 可看到规则拒绝明细
/// - LOG_FORMAT: json 时输出 JSON 行
///
/// # 示例
/// ```no_run
/// use language_school::logging::{self, LogFormat};
/// logging::init(LogFormat::from_env());
/// ```
pub fn init(format: LogFormat) {
    match format {
        LogFormat::Text => fmt()
            .with_env_filter(env_filter())
            .with_target(true)
            .with_line_number(true)
            .init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(env_filter())
            .with_current_span(true)
            .init(),
    }
}

/// 测试用: debug 级别写入测试输出, 重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
    }
}
