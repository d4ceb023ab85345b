use clap::{Parser, ValueEnum};
use tokio::task::block_in_place;

use crate::cli::SubCommandExtend;
use crate::config::{DatabaseOptions, ModelOptions, Opts};
use crate::db::{SearchHit, crud, init_db};
use crate::embed::Embedder;

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    #[command(flatten)]
    pub db: DatabaseOptions,
    #[command(flatten)]
    pub model: ModelOptions,
    /// 被搜索的图片路径
    pub image: String,
    /// 返回的最近邻数量
    #[arg(short = 'k', long, default_value_t = 5)]
    pub top_k: usize,
    /// 输出格式
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, _opts: &Opts) -> anyhow::Result<()> {
        let mut embedder = Embedder::load(&self.model.model_path)?;
        let embedding = block_in_place(|| embedder.embed_file(&self.image))?;

        let db = init_db(&self.db.database_url).await?;
        let hits = crud::search_similar(&db, &embedding, self.top_k).await?;

        print_result(&hits, self)
    }
}

fn print_result(hits: &[SearchHit], opts: &SearchCommand) -> anyhow::Result<()> {
    match opts.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(hits)?)
        }
        OutputFormat::Table => {
            for hit in hits {
                println!("{:.4}\t{}\t{}", hit.distance, hit.label, hit.path);
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone)]
pub enum OutputFormat {
    Json,
    Table,
}
