use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// 图片记录
#[derive(Debug, Clone, FromRow)]
pub struct ImageRecord {
    /// 记录 ID
    pub id: i64,
    /// 分类标签
    pub label: String,
    /// 图片的公开访问路径，全库唯一
    pub path: String,
}

/// 单条检索结果
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SearchHit {
    pub label: String,
    pub path: String,
    /// 与查询向量的欧氏距离，双方均已归一化
    pub distance: f64,
}

/// 标签统计
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}
