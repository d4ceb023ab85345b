use std::time::Duration;

use log::{info, warn};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod crud;
pub mod model;

pub use model::*;

pub type Database = PgPool;

/// 启动时的连接重试次数与间隔，重试耗尽后视为致命错误
const MAX_CONNECT_RETRIES: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// 初始化数据库连接池并执行迁移
pub async fn init_db(url: &str) -> Result<Database, sqlx::Error> {
    let mut attempt = 1;
    let pool = loop {
        info!("尝试连接数据库 ({}/{})", attempt, MAX_CONNECT_RETRIES);
        match PgPoolOptions::new().max_connections(5).connect(url).await {
            Ok(pool) => break pool,
            Err(e) if attempt < MAX_CONNECT_RETRIES => {
                warn!("数据库连接失败: {}，{} 秒后重试", e, CONNECT_RETRY_DELAY.as_secs());
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    };

    info!("检查数据库迁移");
    sqlx::migrate!().run(&pool).await?;

    Ok(pool)
}
