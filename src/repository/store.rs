// ==========================================
// 语言学校教务系统 - 实体存储 (Entity Store)
// ==========================================
// 职责: 持有数据库连接, 提供只读访问与事务工作单元 (unit of work)
// 并发: unit_of_work 使用 BEGIN IMMEDIATE, 在读取前置条件之前就拿到写锁;
//       跨连接的并发写事务由 busy_timeout 排队, 后到者在先到者提交后重新读取
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{Connection, TransactionBehavior};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

// ==========================================
// EntityStore - 实体存储
// ==========================================
/// 各 Repository 的查询都以 `&Connection` 为参数,
/// 由调用方决定在只读连接上执行还是在工作单元事务内执行。
#[derive(Clone)]
pub struct EntityStore {
    conn: Arc<Mutex<Connection>>,
}

impl EntityStore {
    /// 打开数据库文件并初始化 schema
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 打开内存数据库（测试与演示用）
    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 共享底层连接（供 ConfigManager 等复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在连接上执行只读查询
    pub fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }

    /// 在一个 IMMEDIATE 事务内执行一组读写
    ///
    /// # 语义
    /// - 闭包返回 Ok: 提交
    /// - 闭包返回 Err (含业务规则拒绝): 事务随 drop 回滚, 不留下部分写入
    pub fn unit_of_work<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let out = f(&tx)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        trace!("unit of work committed");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_of_work_rolls_back_on_error() {
        let store = EntityStore::open_in_memory().unwrap();

        let result: Result<(), RepositoryError> = store.unit_of_work(|conn| {
            conn.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', 'k', 'v')",
                [],
            )?;
            Err(RepositoryError::InternalError("abort".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = store
            .read(|conn| {
                conn.query_row("SELECT COUNT(*) FROM config_kv", [], |row| row.get(0))
                    .map_err(RepositoryError::from)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_unit_of_work_commits_on_success() {
        let store = EntityStore::open_in_memory().unwrap();

        store
            .unit_of_work(|conn| {
                conn.execute(
                    "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', 'k', 'v')",
                    [],
                )
                .map_err(RepositoryError::from)
            })
            .unwrap();

        let count: i64 = store
            .read(|conn| {
                conn.query_row("SELECT COUNT(*) FROM config_kv", [], |row| row.get(0))
                    .map_err(RepositoryError::from)
            })
            .unwrap();
        assert_eq!(count, 1);
    }
}
