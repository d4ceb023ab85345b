use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::*;

#[derive(Parser, Debug, Clone)]
#[command(name = "travellens", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 批量导入图片数据集
    Load(LoadCommand),
    /// 从数据库中检索相似图片
    Search(SearchCommand),
    /// 启动 HTTP 检索服务
    Server(ServerCommand),
    /// 离线评估检索质量
    Evaluate(EvaluateCommand),
}

/// 数据库连接配置
#[derive(Parser, Debug, Clone)]
pub struct DatabaseOptions {
    /// PostgreSQL 连接字符串
    #[arg(long, env = "DATABASE_URL", value_name = "URL")]
    pub database_url: String,
}

/// 对象存储配置
#[derive(Parser, Debug, Clone)]
pub struct StorageOptions {
    /// S3 兼容服务地址，不填则使用 AWS 默认地址
    #[arg(long, env = "S3_ENDPOINT", value_name = "URL")]
    pub s3_endpoint: Option<String>,
    /// 存储桶名称
    #[arg(long, env = "S3_BUCKET", value_name = "NAME", default_value = "images")]
    pub s3_bucket: String,
    /// 存储区域
    #[arg(long, env = "S3_REGION", value_name = "REGION", default_value = "us-east-1")]
    pub s3_region: String,
    /// 公开访问地址前缀，不填则由 endpoint 和 bucket 推导
    #[arg(long, env = "S3_PUBLIC_URL", value_name = "URL")]
    pub s3_public_url: Option<String>,
}

impl StorageOptions {
    /// 对象公开访问地址的前缀，不含结尾斜杠
    pub fn public_base(&self) -> String {
        match &self.s3_public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => match &self.s3_endpoint {
                Some(endpoint) => {
                    format!("{}/{}", endpoint.trim_end_matches('/'), self.s3_bucket)
                }
                None => format!("https://{}.s3.{}.amazonaws.com", self.s3_bucket, self.s3_region),
            },
        }
    }
}

/// 嵌入模型配置
#[derive(Parser, Debug, Clone)]
pub struct ModelOptions {
    /// ResNet-50 特征提取模型的 ONNX 文件路径
    #[arg(long, env = "MODEL_PATH", value_name = "FILE", default_value = "models/resnet50.onnx")]
    pub model_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_opts() -> StorageOptions {
        StorageOptions {
            s3_endpoint: None,
            s3_bucket: "images".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_public_url: None,
        }
    }

    #[test]
    fn public_base_prefers_explicit_url() {
        let opts = StorageOptions {
            s3_public_url: Some("https://cdn.example.com/images/".to_string()),
            ..storage_opts()
        };
        assert_eq!(opts.public_base(), "https://cdn.example.com/images");
    }

    #[test]
    fn public_base_derived_from_endpoint() {
        let opts = StorageOptions {
            s3_endpoint: Some("http://127.0.0.1:9000".to_string()),
            ..storage_opts()
        };
        assert_eq!(opts.public_base(), "http://127.0.0.1:9000/images");
    }

    #[test]
    fn public_base_defaults_to_aws() {
        assert_eq!(storage_opts().public_base(), "https://images.s3.us-east-1.amazonaws.com");
    }
}
