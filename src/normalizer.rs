use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{FruitClassError, Result};
use crate::features::{FeatureVector, FEATURE_COUNT};

/// 学習時に確定した特徴量ごとのmin-maxスケーラ
///
/// パラメータは凍結済みアーティファクトから読み込む。推論時の入力から
/// 再計算してはならない（モデルの意味が変わってしまう）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: Vec<f32>,
    data_max: Vec<f32>,
}

impl MinMaxScaler {
    pub fn new(data_min: Vec<f32>, data_max: Vec<f32>) -> Result<Self> {
        let scaler = Self { data_min, data_max };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Deserialize経由で構築された場合の形状確認
    pub fn validate(&self) -> Result<()> {
        if self.data_min.len() != FEATURE_COUNT || self.data_max.len() != FEATURE_COUNT {
            return Err(FruitClassError::ArtifactShape {
                artifact: "scaler".to_string(),
                expected: format!("{FEATURE_COUNT} min/max pairs"),
                actual: format!(
                    "{} mins, {} maxes",
                    self.data_min.len(),
                    self.data_max.len()
                ),
            });
        }

        for (i, (min, max)) in self.data_min.iter().zip(&self.data_max).enumerate() {
            if !(max > min) {
                return Err(FruitClassError::ArtifactShape {
                    artifact: "scaler".to_string(),
                    expected: format!("data_max[{i}] > data_min[{i}]"),
                    actual: format!("min={min}, max={max}"),
                });
            }
        }

        Ok(())
    }

    /// 凍結済みのmin/maxによるアフィン変換
    ///
    /// 学習時のレンジ外の値は [0,1] の外に写る。これは仕様どおりの挙動で、
    /// クランプはしない。
    pub fn transform(&self, features: &FeatureVector) -> Array1<f32> {
        let raw = features.to_array();
        Array1::from_iter(
            raw.iter()
                .zip(&self.data_min)
                .zip(&self.data_max)
                .map(|((value, min), max)| (value - min) / (max - min)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_scaler() -> MinMaxScaler {
        MinMaxScaler::new(
            vec![100.0, 0.0, 20.0, 40.0],
            vec![50_000.0, 360.0, 255.0, 255.0],
        )
        .unwrap()
    }

    fn features_from(values: [f32; FEATURE_COUNT]) -> FeatureVector {
        FeatureVector {
            area: values[0] as usize,
            avg_hue: values[1],
            avg_saturation: values[2],
            avg_value: values[3],
        }
    }

    #[test]
    fn test_minimum_maps_to_zero_and_maximum_to_one() {
        let scaler = fixture_scaler();

        let at_min = scaler.transform(&features_from([100.0, 0.0, 20.0, 40.0]));
        for value in &at_min {
            assert!(value.abs() < 1e-6);
        }

        let at_max = scaler.transform(&features_from([50_000.0, 360.0, 255.0, 255.0]));
        for value in &at_max {
            assert!((value - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_out_of_range_input_is_not_clamped() {
        let scaler = fixture_scaler();
        let normalized = scaler.transform(&features_from([60_000.0, 0.0, 10.0, 100.0]));

        assert!(normalized[0] > 1.0);
        assert!(normalized[2] < 0.0);
        assert!(normalized[3] > 0.0 && normalized[3] < 1.0);
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let error = MinMaxScaler::new(vec![0.0; 3], vec![1.0; 3]).unwrap_err();
        assert!(matches!(error, FruitClassError::ArtifactShape { .. }));
    }

    #[test]
    fn test_degenerate_range_is_rejected() {
        let error = MinMaxScaler::new(vec![0.0, 0.0, 5.0, 0.0], vec![1.0, 1.0, 5.0, 1.0]).unwrap_err();
        assert!(matches!(error, FruitClassError::ArtifactShape { .. }));
    }
}
