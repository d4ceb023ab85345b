use clap::Parser;
use log::{error, info};
use prometheus::{BasicAuthentication, labels};
use tokio::net::TcpListener;
use tokio::task::spawn_blocking;
use tokio::time::{Duration, sleep};

use crate::cli::SubCommandExtend;
use crate::config::{DatabaseOptions, ModelOptions, Opts, StorageOptions};
use crate::db::init_db;
use crate::embed::Embedder;
use crate::server;
use crate::storage::ObjectStorage;

#[derive(Parser, Debug, Clone)]
pub struct ServerCommand {
    #[command(flatten)]
    pub db: DatabaseOptions,
    #[command(flatten)]
    pub storage: StorageOptions,
    #[command(flatten)]
    pub model: ModelOptions,
    /// 监听地址
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub addr: String,
    /// 允许跨域访问的来源，多个来源用逗号分隔
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173,http://127.0.0.1:5173"
    )]
    pub allowed_origins: Vec<String>,
    /// prometheus 主动推送地址
    #[arg(long, value_name = "URL")]
    pub prometheus_push: Option<String>,
    /// 自定义 instance 标签值
    #[arg(long, value_name = "NAME")]
    pub prometheus_instance: Option<String>,
    /// prometheus 认证信息，格式为 username:password
    #[arg(long, value_name = "AUTH")]
    pub prometheus_auth: Option<String>,
}

impl SubCommandExtend for ServerCommand {
    async fn run(&self, _opts: &Opts) -> anyhow::Result<()> {
        let db = init_db(&self.db.database_url).await?;
        let storage = ObjectStorage::connect(&self.storage).await;
        let embedder = Embedder::load(&self.model.model_path)?;

        // 创建应用状态
        let state = server::AppState::new(db, storage, embedder);

        // 创建应用
        let app = server::create_app(state, &self.allowed_origins);

        if let Some(url) = self.prometheus_push.clone() {
            let instance = self.prometheus_instance.clone().unwrap_or_else(|| self.addr.clone());
            let auth = self.prometheus_auth.clone().map(|s| {
                let (username, password) = s.split_once(':').expect("invalid prometheus auth");
                (username.to_string(), password.to_string())
            });
            tokio::spawn(async move {
                loop {
                    let metric_families = prometheus::gather();
                    let url = url.clone();
                    let instance = instance.clone();
                    let auth = auth.clone();
                    let r = spawn_blocking(move || {
                        prometheus::push_metrics(
                            "travellens",
                            labels! {
                                "instance".to_string() => instance.clone(),
                            },
                            &url,
                            metric_families,
                            auth.map(|(username, password)| BasicAuthentication {
                                username,
                                password,
                            }),
                        )
                    })
                    .await
                    .unwrap();
                    if let Err(e) = r {
                        error!("推送指标失败: {e}");
                    }
                    sleep(Duration::from_secs(30)).await;
                }
            });
        }

        // 启动服务器
        info!("服务器启动：http://{}", &self.addr);
        let listener = TcpListener::bind(&self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
