use std::path::PathBuf;

use clap::Parser;
use indicatif::ProgressBar;
use log::info;

use crate::cli::SubCommandExtend;
use crate::config::{DatabaseOptions, ModelOptions, Opts, StorageOptions};
use crate::db::init_db;
use crate::embed::Embedder;
use crate::storage::ObjectStorage;
use crate::utils::pb_style;
use crate::{eval, ingest};

#[derive(Parser, Debug, Clone)]
pub struct LoadCommand {
    #[command(flatten)]
    pub db: DatabaseOptions,
    #[command(flatten)]
    pub storage: StorageOptions,
    #[command(flatten)]
    pub model: ModelOptions,
    /// 数据集根目录，一级子目录名作为标签
    pub path: PathBuf,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,jpeg,png")]
    pub suffix: String,
}

impl SubCommandExtend for LoadCommand {
    async fn run(&self, _opts: &Opts) -> anyhow::Result<()> {
        let db = init_db(&self.db.database_url).await?;
        let storage = ObjectStorage::connect(&self.storage).await;
        let mut embedder = Embedder::load(&self.model.model_path)?;

        info!("开始扫描目录: {}", self.path.display());
        let dataset = eval::scan_ground_truth(&self.path, &self.suffix);
        let items = dataset
            .into_iter()
            .flat_map(|(label, paths)| paths.into_iter().map(move |path| (label.clone(), path)))
            .collect::<Vec<_>>();
        info!("扫描完成，共 {} 张图片", items.len());

        let pb = ProgressBar::new(items.len() as u64).with_style(pb_style());
        let summary = ingest::ingest_batch(&db, &storage, &mut embedder, items, |msg| {
            pb.set_message(msg.to_string());
            pb.inc(1);
        })
        .await;
        pb.finish_with_message(format!(
            "导入完成: 成功 {} 张，失败 {} 张",
            summary.succeeded, summary.failed
        ));

        Ok(())
    }
}
