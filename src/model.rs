use std::path::Path;

use ndarray::prelude::*;
use ort::session::{builder::SessionBuilder, Session};
use ort::value::TensorRef;
use parking_lot::Mutex;

use crate::{
    errors::{FruitClassError, Result},
    features::FEATURE_COUNT,
    traits::ProbabilityModel,
};

// skl2onnx形式でエクスポートされた決定木アンサンブルのテンソル名
const INPUT_NAME: &str = "float_input";
const OUTPUT_NAME: &str = "probabilities";

/// ONNX化した学習済みアンサンブル分類器
///
/// 内部構造（木の本数や投票方式）には関知しない。読み込み時に入出力の
/// 形状だけを検証し、以後は凍結されたまま推論に使う。
pub struct Model {
    num_classes: usize,
    session: Mutex<Session>,
}

impl Model {
    pub fn new(model_path: &Path) -> Result<Self> {
        let mut session = SessionBuilder::new()
            .map_err(|e| FruitClassError::Model {
                operation: "セッションビルダー初期化".to_string(),
                source: Box::new(e),
            })?
            .with_memory_pattern(true)
            .map_err(|e| FruitClassError::Model {
                operation: "メモリパターン設定".to_string(),
                source: Box::new(e),
            })?
            .commit_from_file(model_path)
            .map_err(|e| FruitClassError::ArtifactLoad {
                path: model_path.to_path_buf(),
                operation: "モデルファイル読み込み".to_string(),
                source: Box::new(e),
            })?;

        // 入力次元の検証（バッチ次元は動的でよい）
        let input = session.inputs().first().ok_or_else(|| FruitClassError::Model {
            operation: "モデル入力取得".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "モデルに入力テンソルがありません",
            )),
        })?;
        let input_dim = input
            .dtype()
            .tensor_shape()
            .and_then(|shape| shape.last().copied())
            .ok_or_else(|| FruitClassError::Model {
                operation: "モデル入力形状取得".to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "テンソル形状が取得できません",
                )),
            })?;
        if input_dim != FEATURE_COUNT as i64 {
            return Err(FruitClassError::ArtifactShape {
                artifact: "classifier".to_string(),
                expected: format!("input dimension {FEATURE_COUNT}"),
                actual: format!("input dimension {input_dim}"),
            });
        }

        // ウォームアップ実行。テンソル名の不一致もここで落ち、
        // 出力からクラス数が確定する。
        let data = Array2::<f32>::zeros((1, FEATURE_COUNT));
        let num_classes = {
            let outputs = session
                .run(ort::inputs![INPUT_NAME => TensorRef::from_array_view(&data).map_err(|e| FruitClassError::Model {
                    operation: "初期化テンソル作成".to_string(),
                    source: Box::new(e),
                })?])
                .map_err(|e| FruitClassError::Model {
                    operation: "モデル初期化実行".to_string(),
                    source: Box::new(e),
                })?;
            let probabilities = outputs
                .get(OUTPUT_NAME)
                .ok_or_else(|| FruitClassError::ArtifactShape {
                    artifact: "classifier".to_string(),
                    expected: format!("output tensor named `{OUTPUT_NAME}`"),
                    actual: "no such output".to_string(),
                })?
                .try_extract_array::<f32>()
                .map_err(|e| FruitClassError::Model {
                    operation: "確率テンソル抽出".to_string(),
                    source: Box::new(e),
                })?
                .into_dimensionality::<Ix2>()
                .map_err(|e| FruitClassError::Model {
                    operation: "確率テンソル形状変換".to_string(),
                    source: Box::new(e),
                })?;
            probabilities.shape()[1]
        };

        if num_classes == 0 {
            return Err(FruitClassError::ArtifactShape {
                artifact: "classifier".to_string(),
                expected: "at least one output class".to_string(),
                actual: "0 classes".to_string(),
            });
        }

        Ok(Self {
            num_classes,
            session: Mutex::new(session),
        })
    }
}

impl ProbabilityModel for Model {
    fn input_dim(&self) -> usize {
        FEATURE_COUNT
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn predict_proba(&self, features: ArrayView1<f32>) -> Result<Array1<f32>> {
        if features.len() != FEATURE_COUNT {
            return Err(FruitClassError::Validation {
                field: "features".to_string(),
                reason: format!("expected length {FEATURE_COUNT}, got {}", features.len()),
            });
        }

        let batch = features.insert_axis(Axis(0));
        let mut binding = self.session.lock();
        let outputs = binding.run(
            ort::inputs![INPUT_NAME => TensorRef::from_array_view(&batch.as_standard_layout())?],
        )?;
        let probabilities = outputs[OUTPUT_NAME]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix2>()?;
        Ok(probabilities.row(0).to_owned())
    }
}
