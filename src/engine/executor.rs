// ==========================================
// 语言学校教务系统 - 存储调用执行器
// ==========================================
// 职责: 把同步的 rusqlite 工作单元放到 tokio 阻塞线程池执行,
//       引擎对外暴露 async 接口, 请求任务在等待存储时可以让出
// ==========================================

use crate::engine::error::EngineResult;
use crate::repository::EntityStore;
use rusqlite::Connection;

/// 在一个事务工作单元内执行 (闭包返回 Err 时整体回滚)
pub async fn run_unit_of_work<T, F>(store: &EntityStore, f: F) -> EngineResult<T>
where
    F: FnOnce(&Connection) -> EngineResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || store.unit_of_work(f)).await?
}

/// 只读查询
pub async fn run_read<T, F>(store: &EntityStore, f: F) -> EngineResult<T>
where
    F: FnOnce(&Connection) -> EngineResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || store.read(f)).await?
}
