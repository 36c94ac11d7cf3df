use image::{Pixel, Primitive, Rgb, RgbImage};
use ndarray::prelude::*;
use nshare::AsNdarray3;
use num_traits::AsPrimitive;

use crate::colorops::get_max_value;

/// 色相は度単位 [0,360)、彩度・明度は 0–255 スケールで返す
pub fn rgb_to_hsv<S>(pixel: &Rgb<S>) -> (f32, f32, f32)
where
    Rgb<S>: Pixel<Subpixel = S>,
    S: Primitive + AsPrimitive<f32> + 'static,
{
    let max_value: f32 = get_max_value::<S>().as_();
    let Rgb([r, g, b]) = pixel;
    let r = r.as_() / max_value;
    let g = g.as_() / max_value;
    let b = b.as_() / max_value;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let hue = hue.rem_euclid(360.0);

    let saturation = if max == 0.0 { 0.0 } else { delta / max * 255.0 };
    let value = max * 255.0;

    (hue, saturation, value)
}

/// RGB画像を (hue, saturation, value) の3プレーンに分解する
///
/// 各プレーンの形状は (height, width)。
pub fn split_hsv(image: &RgbImage) -> (Array2<f32>, Array2<f32>, Array2<f32>) {
    let (width, height) = image.dimensions();
    let shape = (height as usize, width as usize);

    // (channels, height, width) ビューとして参照
    let rgb = image.as_ndarray3();

    let mut hue = Array2::<f32>::zeros(shape);
    let mut saturation = Array2::<f32>::zeros(shape);
    let mut value = Array2::<f32>::zeros(shape);

    for y in 0..shape.0 {
        for x in 0..shape.1 {
            let pixel = Rgb([rgb[[0, y, x]], rgb[[1, y, x]], rgb[[2, y, x]]]);
            let (h, s, v) = rgb_to_hsv(&pixel);
            hue[[y, x]] = h;
            saturation[[y, x]] = s;
            value[[y, x]] = v;
        }
    }

    (hue, saturation, value)
}
