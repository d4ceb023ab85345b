use std::path::PathBuf;

use log::{debug, warn};
use tokio::task::block_in_place;

use crate::db::{self, Database, ImageRecord};
use crate::embed::Embedder;
use crate::error::Result;
use crate::metrics;
use crate::storage::ObjectStorage;

/// 单个条目的入库流程：上传对象存储 -> 计算嵌入 -> 写入数据库
///
/// 三步之间没有回滚：上传成功但后续步骤失败时，远端对象会残留，
/// 数据库中不会出现对应记录
pub async fn ingest_one(
    db: &Database,
    storage: &ObjectStorage,
    embedder: &mut Embedder,
    label: &str,
    filename: &str,
    data: &[u8],
) -> Result<ImageRecord> {
    let result = async {
        let url = storage.upload(label, filename, data.to_vec()).await?;
        let embedding = block_in_place(|| embedder.embed_bytes(data))?;
        db::crud::insert_image(db, label, &url, &embedding).await
    }
    .await;

    match &result {
        Ok(record) => {
            metrics::inc_ingest("ok");
            debug!("入库完成: {}", record.path);
        }
        Err(e) => metrics::inc_ingest(e.kind()),
    }
    result
}

/// 批量入库的统计结果
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// 顺序入库一批 (标签, 文件) 条目
///
/// 单个条目失败只记录日志并跳过，批次总是运行到结束
pub async fn ingest_batch(
    db: &Database,
    storage: &ObjectStorage,
    embedder: &mut Embedder,
    items: Vec<(String, PathBuf)>,
    mut progress: impl FnMut(&str),
) -> IngestSummary {
    let mut summary = IngestSummary::default();

    for (label, path) in items {
        let filename = match path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => {
                warn!("跳过没有文件名的路径: {}", path.display());
                summary.failed += 1;
                continue;
            }
        };

        let result = match tokio::fs::read(&path).await {
            Ok(data) => ingest_one(db, storage, embedder, &label, &filename, &data).await,
            Err(e) => {
                warn!("读取文件失败: {}: {}", path.display(), e);
                metrics::inc_ingest("read_error");
                summary.failed += 1;
                progress(&format!("失败: {}", path.display()));
                continue;
            }
        };

        match result {
            Ok(record) => {
                summary.succeeded += 1;
                progress(&record.path);
            }
            Err(e) => {
                warn!("入库失败: {}: {}", path.display(), e);
                summary.failed += 1;
                progress(&format!("失败: {}", path.display()));
            }
        }
    }

    summary
}
