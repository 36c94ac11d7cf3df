use ndarray::prelude::*;

use crate::errors::{FruitClassError, Result};
use crate::segmenter::Segmentation;

/// 分類器の入力次元。学習時の特徴量と同じ順序・同じ個数で固定。
pub const FEATURE_COUNT: usize = 4;

/// 前景画素から集計した生の特徴量
///
/// 順序は [area, avg_hue, avg_saturation, avg_value] で固定。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub area: usize,
    pub avg_hue: f32,
    pub avg_saturation: f32,
    pub avg_value: f32,
}

impl FeatureVector {
    pub fn to_array(&self) -> Array1<f32> {
        arr1(&[
            self.area as f32,
            self.avg_hue,
            self.avg_saturation,
            self.avg_value,
        ])
    }
}

/// 角度データの円環平均（度単位、戻り値は [0,360)）
///
/// 色相は360度で巻き戻るため算術平均は境界付近で破綻する
/// （例: 359度と1度の平均は0度であって180度ではない）。
/// 単位円上のベクトル和の偏角として計算する。空の入力はNone。
pub fn circular_mean<I>(degrees: I) -> Option<f32>
where
    I: IntoIterator<Item = f32>,
{
    let mut sin_sum = 0.0f64;
    let mut cos_sum = 0.0f64;
    let mut count = 0usize;

    for degree in degrees {
        let radian = f64::from(degree).to_radians();
        sin_sum += radian.sin();
        cos_sum += radian.cos();
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(sin_sum.atan2(cos_sum).to_degrees().rem_euclid(360.0) as f32)
}

/// セグメンテーション結果から特徴量を集計する
///
/// 前景画素が1つも無い場合、空集合の平均は定義できないため
/// EmptySegmentationを返す。0やNaNで埋めて下流に流してはならない。
pub fn extract_features(segmentation: &Segmentation) -> Result<FeatureVector> {
    let area = segmentation.area();
    if area == 0 {
        return Err(FruitClassError::EmptySegmentation);
    }

    let mask = &segmentation.mask;
    let foreground = |plane: &Array2<f32>| -> f64 {
        plane
            .iter()
            .zip(mask.iter())
            .filter(|&(_, &m)| m)
            .map(|(&v, _)| f64::from(v))
            .sum()
    };

    let avg_hue = circular_mean(
        segmentation
            .hue
            .iter()
            .zip(mask.iter())
            .filter(|&(_, &m)| m)
            .map(|(&h, _)| h),
    )
    .ok_or(FruitClassError::EmptySegmentation)?;

    let avg_saturation = (foreground(&segmentation.saturation) / area as f64) as f32;
    let avg_value = (foreground(&segmentation.value) / area as f64) as f32;

    Ok(FeatureVector {
        area,
        avg_hue,
        avg_saturation,
        avg_value,
    })
}
