use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use tokio::task::block_in_place;

use crate::cli::{OutputFormat, SubCommandExtend};
use crate::config::{DatabaseOptions, ModelOptions, Opts};
use crate::db::{crud, init_db};
use crate::embed::Embedder;
use crate::error::Error;
use crate::eval::{self, EvalReport, LabelReport, MetricsAccumulator};

#[derive(Parser, Debug, Clone)]
pub struct EvaluateCommand {
    #[command(flatten)]
    pub db: DatabaseOptions,
    #[command(flatten)]
    pub model: ModelOptions,
    /// 评估数据集根目录，一级子目录名作为标签
    pub path: PathBuf,
    /// 每次查询返回的最近邻数量
    #[arg(short = 'k', long, default_value_t = 5)]
    pub top_k: usize,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,jpeg,png")]
    pub suffix: String,
    /// 输出格式
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for EvaluateCommand {
    async fn run(&self, _opts: &Opts) -> anyhow::Result<()> {
        let db = init_db(&self.db.database_url).await?;
        let mut embedder = Embedder::load(&self.model.model_path)?;

        let ground_truth = eval::scan_ground_truth(&self.path, &self.suffix);
        info!("评估数据集: {} 个标签", ground_truth.len());

        let mut labels = Vec::new();
        let mut overall = MetricsAccumulator::default();

        for (label, images) in &ground_truth {
            // 留一法要求同标签至少有两张图片
            if images.len() < 2 {
                info!("标签 {} 图片不足，跳过", label);
                continue;
            }
            let total_relevant = images.len() - 1;
            let mut acc = MetricsAccumulator::default();

            for query in images {
                let embedding = match block_in_place(|| embedder.embed_file(query)) {
                    Ok(embedding) => embedding,
                    Err(Error::Decode(e)) => {
                        warn!("跳过无法解析的图片: {}: {}", query.display(), e);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                let hits = crud::search_similar(&db, &embedding, self.top_k).await?;
                let (precision, recall, f1) = eval::precision_recall_f1(&hits, label, total_relevant);
                acc.push(precision, recall, f1);
            }

            if !acc.is_empty() {
                overall.merge(&acc);
                labels.push(LabelReport {
                    label: label.clone(),
                    queries: acc.len(),
                    summary: acc.summary(),
                });
            }
        }

        let report = EvalReport {
            k: self.top_k,
            total_queries: overall.len(),
            labels,
            overall: overall.summary(),
        };
        print_report(&report, self)
    }
}

fn print_report(report: &EvalReport, opts: &EvaluateCommand) -> anyhow::Result<()> {
    match opts.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?)
        }
        OutputFormat::Table => {
            for label in &report.labels {
                println!("# {} ({} 次查询)", label.label, label.queries);
                println!("  Precision@{}: {:.4}", report.k, label.summary.precision);
                println!("  Recall@{}:    {:.4}", report.k, label.summary.recall);
                println!("  F1@{}:        {:.4}", report.k, label.summary.f1_score);
            }
            println!();
            println!("== 总体 ({} 次查询) ==", report.total_queries);
            println!("  Precision@{}: {:.4}", report.k, report.overall.precision);
            println!("  Recall@{}:    {:.4}", report.k, report.overall.recall);
            println!("  F1@{}:        {:.4}", report.k, report.overall.f1_score);
        }
    }
    Ok(())
}
