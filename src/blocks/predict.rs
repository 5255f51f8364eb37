use super::{ArchiveRequest, BuildingBlock, CommandLine, Scaler};
use crate::result::Result;
use crate::stage::Stage;
use crate::utils;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictIo {
    /// Features of the new data in excel format
    pub input_excel: PathBuf,
    /// Sequences to predict
    pub input_fasta: PathBuf,
    /// Features extracted from the new data
    #[serde(default)]
    pub extracted: Option<PathBuf>,
    /// Zip receiving the prediction results
    pub prediction_results: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictProperties {
    pub scaler: Option<Scaler>,
    /// Directory holding the trained models
    pub model_output: Option<String>,
    pub prediction_threshold: Option<f64>,
    /// Number of similar training samples reported per prediction
    pub number_similar_samples: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Predict {
    pub io: PredictIo,
    pub properties: PredictProperties,
}

impl Predict {
    fn results_dir(&self, stage: &Stage) -> Result<PathBuf> {
        Ok(utils::strip_zip_extension(stage.output("prediction_results")?))
    }
}

impl BuildingBlock for Predict {
    fn name(&self) -> &'static str {
        "predict"
    }

    fn inputs(&self) -> Vec<(&'static str, &Path)> {
        let mut inputs = vec![
            ("input_excel", self.io.input_excel.as_path()),
            ("input_fasta", self.io.input_fasta.as_path()),
        ];
        if let Some(extracted) = &self.io.extracted {
            inputs.push(("extracted", extracted.as_path()));
        }
        inputs
    }

    fn outputs(&self) -> Vec<(&'static str, &Path)> {
        vec![("prediction_results", self.io.prediction_results.as_path())]
    }

    fn arguments(&self, stage: &Stage) -> Result<Vec<String>> {
        let p = &self.properties;
        Ok(CommandLine::new()
            .arg("--excel", stage.input("input_excel")?.display())
            .opt(
                "--extracted",
                stage.declared_input("extracted").map(Path::display),
            )
            .arg("--fasta_file", stage.input("input_fasta")?.display())
            .arg("--res_dir", self.results_dir(stage)?.display())
            .opt("--scaler", p.scaler)
            .opt("--model_output", p.model_output.as_deref())
            .opt("--prediction_threshold", p.prediction_threshold)
            .opt("--number_similar_samples", p.number_similar_samples)
            .into_vec())
    }

    fn archive(&self, stage: &Stage) -> Result<Option<ArchiveRequest>> {
        Ok(Some(ArchiveRequest {
            destination: stage.host_output("prediction_results")?.to_path_buf(),
            sources: vec![self.results_dir(stage)?],
        }))
    }
}
