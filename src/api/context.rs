// ==========================================
// 语言学校教务系统 - 操作人上下文
// ==========================================
// 表现层完成登录校验后构造, 显式传入每个 API 调用; 核心层不读取会话状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorContext {
    pub user_id: String,
    pub display_name: String,
}

impl OperatorContext {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }

    /// 系统内部调用（启动任务、维护脚本）
    pub fn system() -> Self {
        Self::new("system", "System")
    }
}

impl fmt::Display for OperatorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.display_name, self.user_id)
    }
}
