use super::{ArchiveRequest, BuildingBlock, CommandLine, Scaler};
use crate::result::Result;
use crate::stage::Stage;
use crate::utils;
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_hyperparameters() -> PathBuf {
    PathBuf::from("training_results/hyperparameters.xlsx")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelTrainingIo {
    /// Selected features in excel format
    pub input_excel: PathBuf,
    /// Labels of the training set in csv format
    pub label: PathBuf,
    /// Hyperparameters chosen during training
    #[serde(default = "default_hyperparameters")]
    pub hyperparameters: PathBuf,
    /// Zip receiving the training results
    pub training_output: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelTrainingProperties {
    /// Threads searching the hyperparameter space
    pub num_thread: Option<u32>,
    pub scaler: Option<Scaler>,
    /// `num_split:test_size`
    pub kfold_parameters: Option<String>,
    /// Outlier names, or a file listing one per line
    pub outliers: Option<String>,
    pub precision_weight: Option<f64>,
    pub recall_weight: Option<f64>,
    pub class0_weight: Option<f64>,
    pub report_weight: Option<f64>,
    pub difference_weight: Option<f64>,
    /// Fewer than 300 samples or a slow machine
    pub small: bool,
}

#[derive(Debug, Clone)]
pub struct ModelTraining {
    pub io: ModelTrainingIo,
    pub properties: ModelTrainingProperties,
}

impl ModelTraining {
    /// Directory the tool writes its results to
    fn results_dir(&self, stage: &Stage) -> Result<PathBuf> {
        Ok(utils::strip_zip_extension(stage.output("training_output")?))
    }
}

impl BuildingBlock for ModelTraining {
    fn name(&self) -> &'static str {
        "model_training"
    }

    fn inputs(&self) -> Vec<(&'static str, &Path)> {
        vec![
            ("input_excel", self.io.input_excel.as_path()),
            ("label", self.io.label.as_path()),
        ]
    }

    fn outputs(&self) -> Vec<(&'static str, &Path)> {
        vec![
            ("training_output", self.io.training_output.as_path()),
            ("hyperparameters", self.io.hyperparameters.as_path()),
        ]
    }

    fn staged_output(&self, key: &str, unique_dir: &Path, host: &Path) -> PathBuf {
        let file_name = host.file_name().unwrap_or(host.as_os_str());
        if key == "hyperparameters" {
            let results = utils::strip_zip_extension(&self.io.training_output);
            let results = results.file_name().unwrap_or(results.as_os_str());
            unique_dir.join(results).join(file_name)
        } else {
            unique_dir.join(file_name)
        }
    }

    fn arguments(&self, stage: &Stage) -> Result<Vec<String>> {
        let p = &self.properties;
        Ok(CommandLine::new()
            .arg("--excel", stage.input("input_excel")?.display())
            .arg("--label", stage.input("label")?.display())
            .arg("--training_output", self.results_dir(stage)?.display())
            .opt("--num_thread", p.num_thread)
            .opt("--scaler", p.scaler)
            .opt("--kfold_parameters", p.kfold_parameters.as_deref())
            .opt("--outliers", p.outliers.as_deref())
            .opt("--precision_weight", p.precision_weight)
            .opt("--recall_weight", p.recall_weight)
            .opt("--class0_weight", p.class0_weight)
            .opt("--report_weight", p.report_weight)
            .opt("--difference_weight", p.difference_weight)
            .switch("--small", p.small)
            .into_vec())
    }

    fn archive(&self, stage: &Stage) -> Result<Option<ArchiveRequest>> {
        Ok(Some(ArchiveRequest {
            destination: stage.host_output("training_output")?.to_path_buf(),
            sources: vec![self.results_dir(stage)?],
        }))
    }
}
