use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::db::SearchHit;
use crate::utils::suffix_regex;

/// 标签到图片路径集合的映射，一级子目录名即标签
pub type GroundTruth = BTreeMap<String, Vec<PathBuf>>;

/// 扫描数据集目录构建评估基准
///
/// 只扫描两层结构 `root/<label>/<image>`，根目录下的散落文件
/// 和无法读取的条目直接忽略
pub fn scan_ground_truth(root: &Path, suffix: &str) -> GroundTruth {
    let re = suffix_regex(suffix);
    let mut ground_truth = GroundTruth::new();

    for entry in WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if path.extension().map(|ext| re.is_match(&ext.to_string_lossy())) != Some(true) {
            continue;
        }
        let Some(label) = path.parent().and_then(|parent| parent.file_name()) else {
            continue;
        };
        let label = label.to_string_lossy().to_string();
        ground_truth.entry(label).or_default().push(path);
    }

    for images in ground_truth.values_mut() {
        images.sort();
    }
    ground_truth
}

/// 单次查询的精确率、召回率与 F1
///
/// 召回率按留一法计算：分母为同标签图片数减一
pub fn precision_recall_f1(hits: &[SearchHit], label: &str, total_relevant: usize) -> (f64, f64, f64) {
    if hits.is_empty() || total_relevant == 0 {
        return (0.0, 0.0, 0.0);
    }

    let matched = hits.iter().filter(|hit| hit.label == label).count() as f64;
    let precision = matched / hits.len() as f64;
    let recall = matched / total_relevant as f64;
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    (precision, recall, f1)
}

/// 一组查询指标的累加器
#[derive(Debug, Default)]
pub struct MetricsAccumulator {
    precisions: Vec<f64>,
    recalls: Vec<f64>,
    f1_scores: Vec<f64>,
}

impl MetricsAccumulator {
    pub fn push(&mut self, precision: f64, recall: f64, f1: f64) {
        self.precisions.push(precision);
        self.recalls.push(recall);
        self.f1_scores.push(f1);
    }

    pub fn merge(&mut self, other: &MetricsAccumulator) {
        self.precisions.extend_from_slice(&other.precisions);
        self.recalls.extend_from_slice(&other.recalls);
        self.f1_scores.extend_from_slice(&other.f1_scores);
    }

    pub fn len(&self) -> usize {
        self.precisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precisions.is_empty()
    }

    /// 各项指标的均值
    pub fn summary(&self) -> MetricSummary {
        MetricSummary {
            precision: mean(&self.precisions),
            recall: mean(&self.recalls),
            f1_score: mean(&self.f1_scores),
        }
    }
}

/// 指标均值
#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// 单个标签的评估结果
#[derive(Debug, Serialize)]
pub struct LabelReport {
    pub label: String,
    pub queries: usize,
    #[serde(flatten)]
    pub summary: MetricSummary,
}

/// 完整的评估报告
#[derive(Debug, Serialize)]
pub struct EvalReport {
    pub k: usize,
    pub total_queries: usize,
    pub labels: Vec<LabelReport>,
    pub overall: MetricSummary,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() { 0.0 } else { values.iter().sum::<f64>() / values.len() as f64 }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn hit(label: &str) -> SearchHit {
        SearchHit { label: label.to_string(), path: format!("{label}/x.jpg"), distance: 0.1 }
    }

    #[test]
    fn metrics_with_partial_match() {
        let hits = vec![hit("lighthouse"), hit("lighthouse"), hit("bridge")];
        let (p, r, f1) = precision_recall_f1(&hits, "lighthouse", 2);
        assert!((p - 2.0 / 3.0).abs() < 1e-9);
        assert!((r - 1.0).abs() < 1e-9);
        assert!((f1 - 0.8).abs() < 1e-9);
    }

    #[rstest]
    #[case::empty_hits(vec![], 2)]
    #[case::no_relevant(vec![hit("bridge")], 0)]
    fn metrics_degenerate_cases(#[case] hits: Vec<SearchHit>, #[case] total_relevant: usize) {
        assert_eq!(precision_recall_f1(&hits, "lighthouse", total_relevant), (0.0, 0.0, 0.0));
    }

    #[test]
    fn metrics_without_any_match() {
        let hits = vec![hit("bridge"), hit("tower")];
        assert_eq!(precision_recall_f1(&hits, "lighthouse", 3), (0.0, 0.0, 0.0));
    }

    #[test]
    fn accumulator_mean_and_merge() {
        let mut label = MetricsAccumulator::default();
        label.push(1.0, 0.5, 0.6);
        label.push(0.0, 0.5, 0.2);

        let mut overall = MetricsAccumulator::default();
        overall.merge(&label);
        overall.push(1.0, 1.0, 1.0);

        assert_eq!(label.len(), 2);
        assert_eq!(overall.len(), 3);
        let summary = label.summary();
        assert!((summary.precision - 0.5).abs() < 1e-9);
        assert!((summary.recall - 0.5).abs() < 1e-9);
        assert!((summary.f1_score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn empty_accumulator_summary_is_zero() {
        let summary = MetricsAccumulator::default().summary();
        assert_eq!(summary.precision, 0.0);
        assert_eq!(summary.recall, 0.0);
        assert_eq!(summary.f1_score, 0.0);
    }
}
