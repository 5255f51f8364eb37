use super::{BuildingBlock, CommandLine, Scaler};
use crate::result::Result;
use crate::stage::Stage;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateModelIo {
    /// Selected features in excel format
    pub input_excel: PathBuf,
    /// Where the fitted models are saved
    pub output_model: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateModelProperties {
    pub hyperparameter_path: String,
    pub num_thread: u32,
    pub scaler: Scaler,
    pub label: Option<String>,
    pub sheets: Option<String>,
    pub outliers: Option<String>,
}

impl Default for GenerateModelProperties {
    fn default() -> Self {
        Self {
            hyperparameter_path: "training_features/hyperparameters.xlsx".to_string(),
            num_thread: 10,
            scaler: Scaler::Robust,
            label: None,
            sheets: None,
            outliers: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateModel {
    pub io: GenerateModelIo,
    pub properties: GenerateModelProperties,
}

impl BuildingBlock for GenerateModel {
    fn name(&self) -> &'static str {
        "generate_model"
    }

    fn inputs(&self) -> Vec<(&'static str, &Path)> {
        vec![("input_excel", self.io.input_excel.as_path())]
    }

    fn outputs(&self) -> Vec<(&'static str, &Path)> {
        vec![("output_model", self.io.output_model.as_path())]
    }

    fn arguments(&self, stage: &Stage) -> Result<Vec<String>> {
        let p = &self.properties;
        Ok(CommandLine::new()
            .arg("--features", stage.input("input_excel")?.display())
            .arg("--model_output", stage.output("output_model")?.display())
            .arg("--hyperparameters", &p.hyperparameter_path)
            .arg("--num_thread", p.num_thread)
            .arg("--scaler", p.scaler)
            .opt("--label", p.label.as_deref())
            .opt("--sheets", p.sheets.as_deref())
            .opt("--outliers", p.outliers.as_deref())
            .into_vec())
    }
}
