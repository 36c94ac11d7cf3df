use image::RgbImage;
use ndarray::prelude::*;

use crate::colorops::hsv::split_hsv;

/// 彩度の固定しきい値（0–255スケール）
///
/// 学習済みモデルはこのしきい値で切り出した前景の統計量で学習されている。
pub const SATURATION_THRESHOLD: f32 = 15.0;

/// HSVチャンネルと前景マスク
///
/// 不変条件: 全プレーンとマスクの形状は入力画像の (height, width) に一致する。
pub struct Segmentation {
    pub hue: Array2<f32>,
    pub saturation: Array2<f32>,
    pub value: Array2<f32>,
    pub mask: Array2<bool>,
}

impl Segmentation {
    /// 前景（果実）画素数
    pub fn area(&self) -> usize {
        self.mask.iter().filter(|&&foreground| foreground).count()
    }
}

/// 彩度しきい値による前景抽出
///
/// 背景のみの画像では全要素falseのマスクになる。ここではエラーにせず、
/// 特徴量抽出側で扱う。
pub fn segment(image: &RgbImage) -> Segmentation {
    let (hue, saturation, value) = split_hsv(image);
    let mask = saturation.mapv(|s| s > SATURATION_THRESHOLD);

    Segmentation {
        hue,
        saturation,
        value,
        mask,
    }
}
