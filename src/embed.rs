use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;
use log::{debug, info};
use ort::session::Session;
use ort::value::Tensor;

use crate::error::{Error, Result};

/// 嵌入向量维度，由 ResNet-50 特征提取器决定
pub const EMBED_DIM: usize = 2048;

/// 模型输入的空间分辨率
const INPUT_SIZE: u32 = 224;

/// ImageNet 各通道均值，BGR 顺序，与预训练模型的预处理保持一致
const IMAGENET_MEAN_BGR: [f32; 3] = [103.939, 116.779, 123.68];

/// 图片嵌入生成器
///
/// 进程启动时加载一次，推理会话在整个生命周期内复用
pub struct Embedder {
    session: Session,
    input_name: String,
    output_name: String,
}

impl Embedder {
    /// 从 ONNX 模型文件加载嵌入生成器
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self> {
        let model_path = model_path.as_ref();
        info!("加载嵌入模型: {}", model_path.display());

        let session = Session::builder()?.commit_from_file(model_path)?;
        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| Error::Inference("模型没有输入张量".to_string()))?;
        let output_name = session
            .outputs()
            .first()
            .map(|output| output.name().to_string())
            .ok_or_else(|| Error::Inference("模型没有输出张量".to_string()))?;
        debug!("模型输入: {}，输出: {}", input_name, output_name);

        Ok(Self { session, input_name, output_name })
    }

    /// 计算一张图片的嵌入向量，结果已做 L2 归一化
    pub fn embed_bytes(&mut self, data: &[u8]) -> Result<Vec<f32>> {
        let image = image::load_from_memory(data)?;
        self.embed_image(&image)
    }

    /// 读取本地文件并计算嵌入向量
    pub fn embed_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<f32>> {
        let image = image::open(path)?;
        self.embed_image(&image)
    }

    fn embed_image(&mut self, image: &DynamicImage) -> Result<Vec<f32>> {
        let (shape, data) = preprocess(image);
        let input = Tensor::from_array((shape, data))?;

        let outputs = self.session.run(ort::inputs![self.input_name.as_str() => input])?;
        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| Error::Inference(format!("模型缺少输出 {}", self.output_name)))?;
        let (shape, data) = output.try_extract_tensor::<f32>()?;

        let dims = shape.iter().map(|&d| d as usize).collect::<Vec<_>>();
        let mut embedding = pool_features(&dims, data)?;
        l2_normalize(&mut embedding);
        Ok(embedding)
    }
}

/// 将图片缩放到模型输入尺寸并做通道预处理，返回 NCHW 形状和数据
fn preprocess(image: &DynamicImage) -> (Vec<usize>, Vec<f32>) {
    let size = INPUT_SIZE as usize;
    let resized = image.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle).to_rgb8();

    let mut data = vec![0.0f32; 3 * size * size];
    for (x, y, pixel) in resized.enumerate_pixels() {
        let idx = y as usize * size + x as usize;
        // RGB -> BGR，逐通道减去 ImageNet 均值
        data[idx] = pixel[2] as f32 - IMAGENET_MEAN_BGR[0];
        data[size * size + idx] = pixel[1] as f32 - IMAGENET_MEAN_BGR[1];
        data[2 * size * size + idx] = pixel[0] as f32 - IMAGENET_MEAN_BGR[2];
    }

    (vec![1, 3, size, size], data)
}

/// 将模型输出压缩为一维特征向量
///
/// 导出的计算图可能自带全局平均池化（输出 `[1, C]`），也可能输出
/// 未池化的特征图（`[1, C, H, W]`），后者在此做全局平均池化
fn pool_features(dims: &[usize], data: &[f32]) -> Result<Vec<f32>> {
    let features = match *dims {
        [1, c] => data[..c].to_vec(),
        [1, c, h, w] => {
            let plane = h * w;
            let mut pooled = vec![0.0f32; c];
            for (i, value) in pooled.iter_mut().enumerate() {
                let offset = i * plane;
                *value = data[offset..offset + plane].iter().sum::<f32>() / plane as f32;
            }
            pooled
        }
        _ => return Err(Error::Inference(format!("意外的模型输出形状: {dims:?}"))),
    };

    if features.len() != EMBED_DIM {
        return Err(Error::Inference(format!(
            "模型输出维度 {} 与预期 {} 不符",
            features.len(),
            EMBED_DIM
        )));
    }
    Ok(features)
}

/// 向量除以自身的 L2 范数，零向量保持不变
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    #[test]
    fn l2_normalize_unit_norm() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        let mut v = vec![0.0; 4];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0; 4]);
    }

    #[test]
    fn preprocess_shape_and_channel_order() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([10, 20, 30])));
        let (shape, data) = preprocess(&image);

        assert_eq!(shape, vec![1, 3, 224, 224]);
        assert_eq!(data.len(), 3 * 224 * 224);
        // 纯色图片缩放后仍为纯色，通道顺序为 BGR
        assert!((data[0] - (30.0 - IMAGENET_MEAN_BGR[0])).abs() < 1e-4);
        assert!((data[224 * 224] - (20.0 - IMAGENET_MEAN_BGR[1])).abs() < 1e-4);
        assert!((data[2 * 224 * 224] - (10.0 - IMAGENET_MEAN_BGR[2])).abs() < 1e-4);
    }

    #[test]
    fn pool_features_pooled_output() {
        let data = vec![1.0f32; EMBED_DIM];
        let features = pool_features(&[1, EMBED_DIM], &data).unwrap();
        assert_eq!(features.len(), EMBED_DIM);
        assert_eq!(features[0], 1.0);
    }

    #[test]
    fn pool_features_unpooled_output() {
        // 每个通道的 2x2 特征图取平均
        let mut data = Vec::with_capacity(EMBED_DIM * 4);
        for i in 0..EMBED_DIM {
            data.extend_from_slice(&[i as f32, i as f32, i as f32 + 2.0, i as f32 + 2.0]);
        }
        let features = pool_features(&[1, EMBED_DIM, 2, 2], &data).unwrap();
        assert_eq!(features.len(), EMBED_DIM);
        assert!((features[0] - 1.0).abs() < 1e-6);
        assert!((features[7] - 8.0).abs() < 1e-6);
    }

    #[test]
    fn pool_features_rejects_unknown_shape() {
        let result = pool_features(&[2, 3], &[0.0; 6]);
        assert!(matches!(result, Err(Error::Inference(_))));
    }

    #[test]
    fn pool_features_rejects_wrong_width() {
        let result = pool_features(&[1, 512], &[0.0; 512]);
        assert!(matches!(result, Err(Error::Inference(_))));
    }
}
