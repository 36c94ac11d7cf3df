use crate::errors::Result;
use crate::features::FEATURE_COUNT;
use crate::traits::ProbabilityModel;
use ndarray::prelude::*;

/// テスト用のモック分類器
///
/// peak_indexのクラスに最大確率を割り当てる決定的な分布を返す。
#[derive(Debug, Clone)]
pub struct MockProbabilityModel {
    pub num_classes: usize,
    pub peak_index: usize,
}

impl MockProbabilityModel {
    pub const fn new(num_classes: usize, peak_index: usize) -> Self {
        Self {
            num_classes,
            peak_index,
        }
    }
}

impl ProbabilityModel for MockProbabilityModel {
    fn input_dim(&self) -> usize {
        FEATURE_COUNT
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn predict_proba(&self, _features: ArrayView1<f32>) -> Result<Array1<f32>> {
        // peakに0.6、残りを均等配分して合計1にする
        if self.num_classes == 1 {
            return Ok(arr1(&[1.0]));
        }
        let rest = 0.4 / (self.num_classes - 1) as f32;
        let mut distribution = Array1::from_elem(self.num_classes, rest);
        distribution[self.peak_index] = 0.6;
        Ok(distribution)
    }
}

/// テスト用のファクトリー関数
pub const fn create_mock_model() -> MockProbabilityModel {
    MockProbabilityModel::new(3, 0)
}
