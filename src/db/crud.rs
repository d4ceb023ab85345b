use pgvector::Vector;

use super::Database;
use super::model::{ImageRecord, LabelCount, SearchHit};
use crate::embed::{EMBED_DIM, l2_normalize};
use crate::error::{Error, Result};

/// 校验嵌入向量维度
fn ensure_dim(embedding: &[f32]) -> Result<()> {
    if embedding.len() != EMBED_DIM {
        return Err(Error::DimensionMismatch { expected: EMBED_DIM, got: embedding.len() });
    }
    Ok(())
}

/// 插入图片记录，按 path 幂等
///
/// path 已存在时不产生新行，直接返回已有记录
pub async fn insert_image(
    pool: &Database,
    label: &str,
    path: &str,
    embedding: &[f32],
) -> Result<ImageRecord> {
    ensure_dim(embedding)?;

    let inserted = sqlx::query_as::<_, ImageRecord>(
        r#"
        INSERT INTO image (label, path, embedding)
        VALUES ($1, $2, $3)
        ON CONFLICT (path) DO NOTHING
        RETURNING id, label, path
        "#,
    )
    .bind(label)
    .bind(path)
    .bind(Vector::from(embedding.to_vec()))
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(record) => Ok(record),
        // 唯一约束生效，查出已有记录返回
        None => {
            let existing =
                sqlx::query_as::<_, ImageRecord>("SELECT id, label, path FROM image WHERE path = $1")
                    .bind(path)
                    .fetch_one(pool)
                    .await?;
            Ok(existing)
        }
    }
}

/// 按距离检索最近的 k 条记录
///
/// 查询向量在此再做一次归一化，保证与入库向量的度量一致；
/// 距离相同的记录顺序由存储决定，不保证稳定
pub async fn search_similar(
    pool: &Database,
    embedding: &[f32],
    k: usize,
) -> Result<Vec<SearchHit>> {
    ensure_dim(embedding)?;

    let mut query = embedding.to_vec();
    l2_normalize(&mut query);

    let hits = sqlx::query_as::<_, SearchHit>(
        r#"
        SELECT label, path, embedding <-> $1 AS distance
        FROM image
        ORDER BY embedding <-> $1
        LIMIT $2
        "#,
    )
    .bind(Vector::from(query))
    .bind(k as i64)
    .fetch_all(pool)
    .await?;

    Ok(hits)
}

/// 列出所有图片记录，按标签和 ID 排序
pub async fn all_images(pool: &Database) -> Result<Vec<ImageRecord>> {
    let records =
        sqlx::query_as::<_, ImageRecord>("SELECT id, label, path FROM image ORDER BY label, id")
            .fetch_all(pool)
            .await?;
    Ok(records)
}

/// 按标签统计图片数量，标签升序
pub async fn label_summary(pool: &Database) -> Result<Vec<LabelCount>> {
    let summary = sqlx::query_as::<_, LabelCount>(
        "SELECT label, COUNT(*) AS count FROM image GROUP BY label ORDER BY label",
    )
    .fetch_all(pool)
    .await?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dim_accepts_expected_length() {
        assert!(ensure_dim(&vec![0.0; EMBED_DIM]).is_ok());
    }

    #[test]
    fn ensure_dim_rejects_wrong_length() {
        let err = ensure_dim(&[0.0; 3]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: EMBED_DIM, got: 3 }));
    }
}
