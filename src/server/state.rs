use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::Database;
use crate::embed::Embedder;
use crate::storage::ObjectStorage;

/// 应用状态，进程启动时构建一次，随请求共享
pub struct AppState {
    /// 数据库连接池
    pub db: Database,
    /// 对象存储客户端
    pub storage: ObjectStorage,
    /// 嵌入生成器，推理需要独占会话
    pub embedder: Mutex<Embedder>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(db: Database, storage: ObjectStorage, embedder: Embedder) -> Arc<Self> {
        Arc::new(AppState { db, storage, embedder: Mutex::new(embedder) })
    }
}
