use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum_typed_multipart::TypedMultipart;
use log::{info, warn};
use tokio::task::block_in_place;

use super::error::Result;
use super::state::AppState;
use super::types::*;
use crate::db::crud;
use crate::{ingest, metrics};

/// 检索相似图片
#[utoipa::path(
    post,
    path = "/predict/",
    request_body(content = PredictForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = PredictResponse),
    )
)]
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    data: TypedMultipart<PredictRequest>,
) -> Result<Json<PredictResponse>> {
    let start = Instant::now();
    info!("检索上传图片，top_k = {}", data.top_k);

    // 与批量导入不同，单次查询的任何失败都会让整个请求失败
    let embedding = {
        let mut embedder = state.embedder.lock().await;
        block_in_place(|| embedder.embed_bytes(&data.file))?
    };
    let hits = crud::search_similar(&state.db, &embedding, data.top_k).await?;

    metrics::inc_search(data.top_k);
    metrics::observe_search_duration(data.top_k, start.elapsed().as_secs_f32());

    Ok(Json(PredictResponse { results: group_by_label(hits) }))
}

/// 上传一批同标签的图片并入库
#[utoipa::path(
    post,
    path = "/upload/",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = UploadResponse),
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    data: TypedMultipart<UploadRequest>,
) -> Result<Json<UploadResponse>> {
    let mut images_path = Vec::new();
    let mut embedder = state.embedder.lock().await;

    for file in &data.files {
        let filename = match &file.metadata.file_name {
            Some(name) => name.clone(),
            None => {
                warn!("跳过未携带文件名的分片");
                continue;
            }
        };

        // 与离线批量导入采用同一策略：单个文件失败只跳过，不中断整个请求
        let result = ingest::ingest_one(
            &state.db,
            &state.storage,
            &mut embedder,
            &data.label,
            &filename,
            &file.contents,
        )
        .await;
        match result {
            Ok(record) => images_path.push(record.path),
            Err(e) => warn!("上传处理失败: {}: {}", filename, e),
        }
    }

    Ok(Json(UploadResponse {
        label: data.label.clone(),
        uploaded_count: images_path.len(),
        images_path,
    }))
}

/// 列出所有图片，按标签聚合
#[utoipa::path(
    get,
    path = "/AllImages/",
    responses(
        (status = 200, body = [ImagesByLabel]),
    )
)]
pub async fn all_images_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ImagesByLabel>>> {
    let records = crud::all_images(&state.db).await?;

    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.label).or_default().push(record.path);
    }
    let groups = grouped
        .into_iter()
        .map(|(label, images)| ImagesByLabel { label, images })
        .collect::<Vec<_>>();
    Ok(Json(groups))
}

/// 标签统计
#[utoipa::path(
    get,
    path = "/LabelsSummary/",
    responses(
        (status = 200, body = LabelsSummaryResponse),
    )
)]
pub async fn labels_summary_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LabelsSummaryResponse>> {
    let summary = crud::label_summary(&state.db).await?;
    Ok(Json(LabelsSummaryResponse { total_labels: summary.len(), summary }))
}
