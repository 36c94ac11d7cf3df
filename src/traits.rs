use crate::errors::Result;
use ndarray::prelude::*;

/// 確率出力つき分類器の抽象化
///
/// 依存関係逆転原則（DIP）に従い、具象クラスではなく抽象に依存する
pub trait ProbabilityModel: Send + Sync {
    /// 分類器が受け取る特徴量の次元数
    fn input_dim(&self) -> usize;

    /// 出力クラス数（ラベル表の要素数と一致していなければならない）
    fn num_classes(&self) -> usize;

    /// 1件分の特徴量からクラス確率分布を得る（低レベルAPI）
    ///
    /// 戻り値は長さnum_classes、非負、合計はおよそ1。
    fn predict_proba(&self, features: ArrayView1<f32>) -> Result<Array1<f32>>;
}
