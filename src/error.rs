use thiserror::Error;

/// 统一错误类型，覆盖嵌入、存储与检索全流程
#[derive(Debug, Error)]
pub enum Error {
    /// 图片无法解析
    #[error("图片解析失败: {0}")]
    Decode(#[from] image::ImageError),
    /// 模型推理失败
    #[error("模型推理失败: {0}")]
    Inference(String),
    /// 嵌入向量维度不符，记录不会写入
    #[error("嵌入向量维度不符: 期望 {expected}，实际 {got}")]
    DimensionMismatch { expected: usize, got: usize },
    /// 对象存储上传失败
    #[error("对象存储上传失败: {0}")]
    Upload(String),
    /// 数据库错误
    #[error("数据库错误: {0}")]
    Store(#[from] sqlx::Error),
}

impl From<ort::Error> for Error {
    fn from(err: ort::Error) -> Self {
        Error::Inference(err.to_string())
    }
}

impl Error {
    /// 错误类别标识，用于对外的结构化错误响应
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Decode(_) => "decode_error",
            Error::Inference(_) => "inference_error",
            Error::DimensionMismatch { .. } => "dimension_mismatch",
            Error::Upload(_) => "upload_error",
            Error::Store(_) => "store_error",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_kind() {
        let err = Error::from(image::load_from_memory(b"not an image").unwrap_err());
        assert_eq!(err.kind(), "decode_error");
    }

    #[test]
    fn dimension_mismatch_message() {
        let err = Error::DimensionMismatch { expected: 2048, got: 3 };
        assert_eq!(err.kind(), "dimension_mismatch");
        assert!(err.to_string().contains("2048"));
        assert!(err.to_string().contains('3'));
    }
}
