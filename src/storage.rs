use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use log::{debug, info};

use crate::config::StorageOptions;
use crate::error::{Error, Result};

/// 对象存储适配层，负责上传图片并生成公开访问地址
#[derive(Clone)]
pub struct ObjectStorage {
    client: Client,
    bucket: String,
    public_base: String,
}

impl ObjectStorage {
    /// 根据配置连接 S3 兼容的对象存储，凭证从标准 AWS 环境变量读取
    pub async fn connect(opts: &StorageOptions) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(opts.s3_region.clone()));
        if let Some(endpoint) = &opts.s3_endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;
        let client = Client::new(&config);

        let public_base = opts.public_base();
        info!("对象存储就绪: bucket = {}，公开地址前缀 {}", opts.s3_bucket, public_base);

        Self { client, bucket: opts.s3_bucket.clone(), public_base }
    }

    /// 上传图片字节到 `{label}/{filename}`
    ///
    /// 同名对象会被直接覆盖，重复上传不会报错
    pub async fn upload(&self, label: &str, filename: &str, data: Vec<u8>) -> Result<String> {
        let key = object_key(label, filename);
        debug!("上传对象: {}", key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(data.into())
            .send()
            .await
            .map_err(|e| Error::Upload(format!("{}: {}", key, DisplayErrorContext(&e))))?;

        Ok(self.public_url(&key))
    }

    /// 对象的稳定公开访问地址
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

/// 远端对象路径，按标签分目录
pub fn object_key(label: &str, filename: &str) -> String {
    format!("{}/{}", label, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_is_label_scoped() {
        assert_eq!(object_key("lighthouse", "photo.jpg"), "lighthouse/photo.jpg");
    }
}
