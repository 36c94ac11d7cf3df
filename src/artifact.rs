use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{FruitClassError, Result};
use crate::labels::LabelMap;
use crate::normalizer::MinMaxScaler;

/// 現在サポートするバンドル形式のバージョン
pub const ARTIFACT_VERSION: u32 = 1;

/// 学習側が書き出すスケーラとラベル表のバンドル
///
/// モデル本体（ONNX）とは別のJSONドキュメントとして配布される。
/// プロセス起動時に一度だけ読み込み、以後は不変。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub version: u32,
    pub scaler: MinMaxScaler,
    pub labels: LabelMap,
}

impl ArtifactBundle {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| FruitClassError::ArtifactLoad {
            path: path.to_path_buf(),
            operation: "バンドル読み込み".to_string(),
            source: Box::new(e),
        })?;

        let bundle: Self =
            serde_json::from_str(&raw).map_err(|e| FruitClassError::ArtifactLoad {
                path: path.to_path_buf(),
                operation: "バンドルJSONデコード".to_string(),
                source: Box::new(e),
            })?;

        bundle.validate()?;
        Ok(bundle)
    }

    /// 形式バージョンと内部形状の検証。起動時に失敗させる。
    pub fn validate(&self) -> Result<()> {
        if self.version != ARTIFACT_VERSION {
            return Err(FruitClassError::ArtifactShape {
                artifact: "artifact bundle".to_string(),
                expected: format!("version {ARTIFACT_VERSION}"),
                actual: format!("version {}", self.version),
            });
        }
        self.scaler.validate()?;
        self.labels.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_JSON: &str = r#"{
        "version": 1,
        "scaler": {
            "data_min": [100.0, 0.0, 20.0, 40.0],
            "data_max": [50000.0, 360.0, 255.0, 255.0]
        },
        "labels": ["apple", "banana", "orange"]
    }"#;

    #[test]
    fn test_bundle_roundtrip() {
        let bundle: ArtifactBundle = serde_json::from_str(FIXTURE_JSON).unwrap();
        bundle.validate().unwrap();
        assert_eq!(bundle.labels.len(), 3);

        let reencoded = serde_json::to_string(&bundle).unwrap();
        let reparsed: ArtifactBundle = serde_json::from_str(&reencoded).unwrap();
        reparsed.validate().unwrap();
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let bundle: ArtifactBundle = serde_json::from_str(FIXTURE_JSON).unwrap();
        let bundle = ArtifactBundle {
            version: 2,
            ..bundle
        };
        assert!(matches!(
            bundle.validate().unwrap_err(),
            FruitClassError::ArtifactShape { .. }
        ));
    }

    #[test]
    fn test_malformed_scaler_is_rejected_at_validate() {
        // Deserializeはnewを通らないので、validateが形状を拾うこと
        let json = r#"{
            "version": 1,
            "scaler": { "data_min": [0.0], "data_max": [1.0] },
            "labels": ["apple"]
        }"#;
        let bundle: ArtifactBundle = serde_json::from_str(json).unwrap();
        assert!(matches!(
            bundle.validate().unwrap_err(),
            FruitClassError::ArtifactShape { .. }
        ));
    }

    #[test]
    fn test_missing_file_is_a_load_failure() {
        let error = ArtifactBundle::load(Path::new("/nonexistent/artifacts.json")).unwrap_err();
        assert!(matches!(error, FruitClassError::ArtifactLoad { .. }));
    }
}
