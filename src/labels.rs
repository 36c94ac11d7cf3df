use serde::{Deserialize, Serialize};

use crate::errors::{FruitClassError, Result};

/// クラスインデックスと果物名の固定対応表
///
/// 学習時に確定した全単射。推論中は読み取り専用。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap(Vec<String>);

impl LabelMap {
    pub fn new(labels: Vec<String>) -> Result<Self> {
        let map = Self(labels);
        map.validate()?;
        Ok(map)
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(FruitClassError::ArtifactShape {
                artifact: "label map".to_string(),
                expected: "at least one label".to_string(),
                actual: "0 labels".to_string(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// インデックスから果物名を引く
    ///
    /// 形状検証済みの分類器出力では範囲外は起きないはずなので、
    /// 起きた場合は内部整合性エラーとして扱う。
    pub fn get(&self, index: usize) -> Result<&str> {
        self.0
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| FruitClassError::ArtifactShape {
                artifact: "label map".to_string(),
                expected: format!("class index < {}", self.0.len()),
                actual: format!("index {index}"),
            })
    }
}
