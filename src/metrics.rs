use std::sync::LazyLock;

use prometheus::*;

static METRIC_SEARCH_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("tl_search_count", "count of similarity searches", &["top_k"])
        .unwrap()
});

static METRIC_SEARCH_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "tl_search_duration",
        "duration of the whole predict path in seconds",
        &["top_k"]
    )
    .unwrap()
});

static METRIC_INGEST_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("tl_ingest_count", "count of ingested items by outcome", &[
        "outcome"
    ])
    .unwrap()
});

/// 增加检索计数
pub fn inc_search(top_k: usize) {
    METRIC_SEARCH_COUNT.with_label_values(&[&top_k.to_string()]).inc();
}

/// 记录单次检索耗时
pub fn observe_search_duration(top_k: usize, duration: f32) {
    METRIC_SEARCH_DURATION.with_label_values(&[&top_k.to_string()]).observe(duration as f64);
}

/// 按结果类别记录一次入库
pub fn inc_ingest(outcome: &str) {
    METRIC_INGEST_COUNT.with_label_values(&[outcome]).inc();
}
