pub mod artifact;
pub mod colorops;
pub mod config;
pub mod errors;
pub mod features;
pub mod labels;
pub mod model;
pub mod normalizer;
pub mod segmenter;
pub mod traits;

pub mod mocks;

use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use artifact::ArtifactBundle;
pub use config::Config;
pub use errors::{FruitClassError, Result};
pub use features::{FeatureVector, FEATURE_COUNT};
pub use labels::LabelMap;
pub use model::Model;
pub use normalizer::MinMaxScaler;
pub use traits::*;

#[cfg(test)]
pub use mocks::*;

/// 1画像分の分類結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

/// 画像 → セグメンテーション → 特徴量 → 正規化 → 分類 → ラベル復号
/// を束ねるパイプライン
///
/// モデル・スケーラ・ラベル表は構築時に受け取り、以後は読み取り専用。
/// 推論ごとの状態は全て呼び出しローカルなので&selfのまま並列に呼べる。
pub struct FruitPipeline<M: ProbabilityModel> {
    model: M,
    scaler: MinMaxScaler,
    labels: LabelMap,
}

impl<M: ProbabilityModel> FruitPipeline<M> {
    /// アーティファクト間の形状整合性は構築時に確定させ、
    /// リクエスト単位では再検証しない
    pub fn new(model: M, bundle: ArtifactBundle) -> Result<Self> {
        bundle.validate()?;

        if model.input_dim() != FEATURE_COUNT {
            return Err(FruitClassError::ArtifactShape {
                artifact: "classifier".to_string(),
                expected: format!("input dimension {FEATURE_COUNT}"),
                actual: format!("input dimension {}", model.input_dim()),
            });
        }
        if model.num_classes() != bundle.labels.len() {
            return Err(FruitClassError::ArtifactShape {
                artifact: "classifier / label map".to_string(),
                expected: format!("{} classes", bundle.labels.len()),
                actual: format!("{} classes", model.num_classes()),
            });
        }

        Ok(Self {
            model,
            scaler: bundle.scaler,
            labels: bundle.labels,
        })
    }

    /// デコード済み画像1枚を分類する
    pub fn classify(&self, img: &DynamicImage) -> Result<Prediction> {
        if img.width() == 0 || img.height() == 0 {
            return Err(FruitClassError::InvalidImage {
                path: "(in-memory)".to_string(),
                reason: "zero-area image".to_string(),
            });
        }

        let rgb_img = img.to_rgb8();
        let segmentation = segmenter::segment(&rgb_img);
        let features = features::extract_features(&segmentation)?;
        let normalized = self.scaler.transform(&features);
        let probabilities = self.model.predict_proba(normalized.view())?;

        // 信頼度は分布の最大値。単一ラベルだけ返すAPIで捨てないこと。
        let (index, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .ok_or_else(|| FruitClassError::ArtifactShape {
                artifact: "classifier".to_string(),
                expected: "non-empty probability distribution".to_string(),
                actual: "empty distribution".to_string(),
            })?;

        let label = self.labels.get(index)?.to_string();
        Ok(Prediction { label, confidence })
    }

    pub fn classify_file(&self, path: &Path) -> Result<Prediction> {
        let img = image::open(path).map_err(|e| FruitClassError::InvalidImage {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.classify(&img)
    }

    /// ディレクトリ内の画像をまとめて分類し、1画像1行のJSONで出力する
    ///
    /// 画像単位の失敗はバッチを止めない。全件失敗した場合のみエラー。
    pub fn process_directory(&self, input_dir: &Path) -> Result<()> {
        if !input_dir.exists() {
            return Err(FruitClassError::FileSystem {
                path: input_dir.to_path_buf(),
                operation: "ディレクトリ存在確認".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "入力ディレクトリが存在しません",
                ),
            });
        }

        let image_files = self.collect_image_files(input_dir)?;

        if image_files.is_empty() {
            println!("処理対象の画像ファイルが見つかりません");
            return Ok(());
        }

        let pb = ProgressBar::new(image_files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        let results: Vec<(PathBuf, Result<Prediction>)> = image_files
            .par_iter()
            .map(|path| {
                let result = self.classify_file(path);
                pb.inc(1);
                (path.clone(), result)
            })
            .collect();

        pb.finish_with_message("処理完了");

        let mut failed = 0usize;
        for (path, result) in &results {
            match result {
                Ok(prediction) => {
                    println!("{}\t{}", path.display(), serde_json::to_string(prediction)?);
                }
                Err(e) => {
                    failed += 1;
                    eprintln!("{}\t{}", path.display(), e);
                }
            }
        }

        if failed == results.len() {
            return Err(FruitClassError::Validation {
                field: "input_dir".to_string(),
                reason: "no image could be classified".to_string(),
            });
        }

        Ok(())
    }

    fn collect_image_files(&self, input_path: &Path) -> Result<Vec<PathBuf>> {
        let mut image_files = Vec::new();

        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() && self.is_supported_image_format(path) {
                image_files.push(path.to_path_buf());
            }
        }

        Ok(image_files)
    }

    pub fn is_supported_image_format(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            matches!(
                extension.to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif" | "tiff" | "avif"
            )
        } else {
            false
        }
    }
}

// ONNXモデルと成果物バンドルからの構築（非ジェネリック）
impl FruitPipeline<Model> {
    pub fn with_onnx_model(model_path: &Path, artifact_path: &Path) -> Result<Self> {
        let model = Model::new(model_path)?;
        let bundle = ArtifactBundle::load(artifact_path)?;
        Self::new(model, bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn fixture_bundle() -> ArtifactBundle {
        ArtifactBundle {
            version: 1,
            scaler: MinMaxScaler::new(
                vec![1.0, 0.0, 15.0, 0.0],
                vec![1_000_000.0, 360.0, 255.0, 255.0],
            )
            .unwrap(),
            labels: LabelMap::new(vec![
                "apple".to_string(),
                "banana".to_string(),
                "orange".to_string(),
            ])
            .unwrap(),
        }
    }

    fn orange_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([230, 140, 40])))
    }

    #[test]
    fn test_pipeline_rejects_label_count_mismatch() {
        let mock = MockProbabilityModel::new(2, 0);
        let error = FruitPipeline::new(mock, fixture_bundle()).unwrap_err();
        assert!(matches!(error, FruitClassError::ArtifactShape { .. }));
    }

    #[test]
    fn test_classify_reports_peak_label_and_confidence() -> Result<()> {
        let pipeline = FruitPipeline::new(MockProbabilityModel::new(3, 2), fixture_bundle())?;
        let prediction = pipeline.classify(&orange_image())?;

        assert_eq!(prediction.label, "orange");
        assert!((prediction.confidence - 0.6).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_classify_is_idempotent() -> Result<()> {
        let pipeline = FruitPipeline::new(create_mock_model(), fixture_bundle())?;
        let img = orange_image();

        let first = pipeline.classify(&img)?;
        let second = pipeline.classify(&img)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_classify_fails_on_achromatic_image() -> Result<()> {
        let pipeline = FruitPipeline::new(create_mock_model(), fixture_bundle())?;
        let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([0, 0, 0])));

        let error = pipeline.classify(&black).unwrap_err();
        assert!(matches!(error, FruitClassError::EmptySegmentation));
        Ok(())
    }

    #[test]
    fn test_classify_rejects_zero_area_image() -> Result<()> {
        let pipeline = FruitPipeline::new(create_mock_model(), fixture_bundle())?;
        let empty = DynamicImage::new_rgb8(0, 0);

        let error = pipeline.classify(&empty).unwrap_err();
        assert!(matches!(error, FruitClassError::InvalidImage { .. }));
        Ok(())
    }

    #[test]
    fn test_supported_formats() {
        let pipeline = FruitPipeline::new(create_mock_model(), fixture_bundle()).unwrap();
        let test_cases = vec![
            ("test.jpg", true),
            ("test.jpeg", true),
            ("test.png", true),
            ("test.webp", true),
            ("test.txt", false),
            ("test", false),
        ];

        for (filename, expected) in test_cases {
            assert_eq!(
                pipeline.is_supported_image_format(Path::new(filename)),
                expected,
                "format check failed for {filename}"
            );
        }
    }
}
