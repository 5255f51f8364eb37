use super::{BuildingBlock, CommandLine, Scaler};
use crate::result::Result;
use crate::stage::Stage;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureSelectionIo {
    /// Extracted features, a file or a directory of feature tables
    pub input_features: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureSelectionProperties {
    /// Labels of the training set in csv format
    pub label: Option<String>,
    /// `start:stop:step` range of feature counts to try
    pub feature_range: String,
    pub num_thread: u32,
    pub variance_threshold: f64,
    pub scaler: Scaler,
    /// Where the selected features are written
    pub excel: String,
    /// `num_split:test_size`
    pub kfold_parameters: String,
    pub rfe_steps: u32,
    pub plot: bool,
    pub plot_num_features: u32,
}

impl Default for FeatureSelectionProperties {
    fn default() -> Self {
        Self {
            label: None,
            feature_range: "20:none:10".to_string(),
            num_thread: 10,
            variance_threshold: 7.0,
            scaler: Scaler::Robust,
            excel: "training_features/selected_features.xlsx".to_string(),
            kfold_parameters: "5:0.2".to_string(),
            rfe_steps: 40,
            plot: true,
            plot_num_features: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureSelection {
    pub io: FeatureSelectionIo,
    pub properties: FeatureSelectionProperties,
}

impl BuildingBlock for FeatureSelection {
    fn name(&self) -> &'static str {
        "feature_selection"
    }

    fn inputs(&self) -> Vec<(&'static str, &Path)> {
        vec![("input_features", self.io.input_features.as_path())]
    }

    fn arguments(&self, stage: &Stage) -> Result<Vec<String>> {
        let p = &self.properties;
        Ok(CommandLine::new()
            .arg("--features", stage.input("input_features")?.display())
            .opt("--label", p.label.as_deref())
            .arg("--feature_range", &p.feature_range)
            .arg("--num_thread", p.num_thread)
            .arg("--variance_threshold", p.variance_threshold)
            .arg("--scaler", p.scaler)
            .arg("--excel", &p.excel)
            .arg("--kfold_parameters", &p.kfold_parameters)
            .arg("--rfe_steps", p.rfe_steps)
            .switch("--plot", p.plot)
            .arg("--plot_num_features", p.plot_num_features)
            .into_vec())
    }
}
