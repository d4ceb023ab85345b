use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::{LabelCount, SearchHit};

/// 检索请求参数
#[derive(TryFromMultipart)]
pub struct PredictRequest {
    pub file: Bytes,
    pub top_k: usize,
}

/// 检索表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct PredictForm {
    /// 上传的查询图片
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// 返回的最近邻数量
    pub top_k: usize,
}

/// 上传请求参数
#[derive(TryFromMultipart)]
pub struct UploadRequest {
    pub files: Vec<FieldData<Bytes>>,
    pub label: String,
}

/// 上传表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct UploadForm {
    /// 上传的图片文件，可以是多张
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: String,
    /// 这批图片共享的标签
    pub label: String,
}

/// 检索结果中的单张图片
#[derive(Debug, Serialize, ToSchema)]
pub struct RankedImage {
    /// 图片的公开访问路径
    pub path: String,
    /// 与查询向量的距离
    pub distance: f64,
}

/// 按标签聚合的检索结果
#[derive(Debug, Serialize, ToSchema)]
pub struct LabelGroup {
    pub label: String,
    pub images: Vec<RankedImage>,
}

/// 检索响应
#[derive(Debug, Serialize, ToSchema)]
pub struct PredictResponse {
    pub results: Vec<LabelGroup>,
}

/// 上传响应
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub label: String,
    pub uploaded_count: usize,
    pub images_path: Vec<String>,
}

/// 按标签聚合的全量图片列表
#[derive(Debug, Serialize, ToSchema)]
pub struct ImagesByLabel {
    pub label: String,
    pub images: Vec<String>,
}

/// 标签统计响应
#[derive(Debug, Serialize, ToSchema)]
pub struct LabelsSummaryResponse {
    pub total_labels: usize,
    pub summary: Vec<LabelCount>,
}

/// 将检索结果按标签分组，保持标签首次出现的次序
pub fn group_by_label(hits: Vec<SearchHit>) -> Vec<LabelGroup> {
    let mut groups: Vec<LabelGroup> = Vec::new();
    for hit in hits {
        let image = RankedImage { path: hit.path, distance: hit.distance };
        match groups.iter().position(|group| group.label == hit.label) {
            Some(idx) => groups[idx].images.push(image),
            None => groups.push(LabelGroup { label: hit.label, images: vec![image] }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(label: &str, path: &str, distance: f64) -> SearchHit {
        SearchHit { label: label.to_string(), path: path.to_string(), distance }
    }

    #[test]
    fn group_by_label_keeps_rank_order() {
        let hits = vec![
            hit("lighthouse", "lighthouse/a.jpg", 0.0),
            hit("bridge", "bridge/b.jpg", 0.2),
            hit("lighthouse", "lighthouse/c.jpg", 0.3),
        ];
        let groups = group_by_label(hits);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "lighthouse");
        assert_eq!(groups[0].images.len(), 2);
        assert_eq!(groups[0].images[1].path, "lighthouse/c.jpg");
        assert_eq!(groups[1].label, "bridge");
        assert_eq!(groups[1].images[0].distance, 0.2);
    }

    #[test]
    fn group_by_label_empty() {
        assert!(group_by_label(vec![]).is_empty());
    }
}
