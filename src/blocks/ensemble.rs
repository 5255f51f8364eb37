use super::{ArchiveRequest, BuildingBlock, CommandLine, Scaler};
use crate::result::Result;
use crate::stage::Stage;
use crate::utils;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnsembleIo {
    pub input_excel: PathBuf,
    #[serde(alias = "input_hyperparameter")]
    pub input_hyperparameter_path: PathBuf,
    /// Labels of the training set in csv format
    pub label: Option<PathBuf>,
    /// Ensemble results, zipped when the name ends in `.zip`
    pub output_ensemble: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnsembleProperties {
    pub sheets: Option<String>,
    pub prediction_threshold: f64,
    pub num_thread: Option<u32>,
    pub precision_weight: f64,
    pub recall_weight: f64,
    pub class0_weight: f64,
    pub report_weight: f64,
    pub difference_weight: f64,
    pub kfold_parameters: String,
    pub scaler: Scaler,
    /// Comma separated outlier names, or a file listing one per line
    pub outliers: Option<String>,
}

impl Default for EnsembleProperties {
    fn default() -> Self {
        Self {
            sheets: None,
            prediction_threshold: 0.5,
            num_thread: None,
            precision_weight: 1.0,
            recall_weight: 0.8,
            class0_weight: 0.5,
            report_weight: 0.25,
            difference_weight: 0.8,
            kfold_parameters: "5:0.2".to_string(),
            scaler: Scaler::Robust,
            outliers: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ensemble {
    pub io: EnsembleIo,
    pub properties: EnsembleProperties,
}

impl Ensemble {
    fn results_dir(&self, stage: &Stage) -> Result<PathBuf> {
        Ok(utils::strip_zip_extension(stage.output("output_ensemble")?))
    }

    fn zipped(&self) -> bool {
        utils::strip_zip_extension(&self.io.output_ensemble) != self.io.output_ensemble
    }
}

impl BuildingBlock for Ensemble {
    fn name(&self) -> &'static str {
        "ensemble"
    }

    fn inputs(&self) -> Vec<(&'static str, &Path)> {
        let mut inputs = vec![
            ("input_excel", self.io.input_excel.as_path()),
            ("input_hyperparameter_path", self.io.input_hyperparameter_path.as_path()),
        ];
        if let Some(label) = &self.io.label {
            inputs.push(("label", label.as_path()));
        }
        inputs
    }

    fn outputs(&self) -> Vec<(&'static str, &Path)> {
        vec![("output_ensemble", self.io.output_ensemble.as_path())]
    }

    fn arguments(&self, stage: &Stage) -> Result<Vec<String>> {
        let p = &self.properties;
        Ok(CommandLine::new()
            .arg("--excel", stage.input("input_excel")?.display())
            .arg("--hyperparameter_path", stage.input("input_hyperparameter_path")?.display())
            .opt("--sheets", p.sheets.as_deref())
            .opt("--label", stage.declared_input("label").map(Path::display))
            .arg("--ensemble_output", self.results_dir(stage)?.display())
            .arg("--prediction_threshold", p.prediction_threshold)
            .opt("--num_thread", p.num_thread)
            .arg("--precision_weight", p.precision_weight)
            .arg("--recall_weight", p.recall_weight)
            .arg("--class0_weight", p.class0_weight)
            .arg("--report_weight", p.report_weight)
            .arg("--difference_weight", p.difference_weight)
            .arg("--kfold_parameters", &p.kfold_parameters)
            .arg("--scaler", p.scaler)
            .list("--outliers", p.outliers.as_deref())
            .into_vec())
    }

    fn archive(&self, stage: &Stage) -> Result<Option<ArchiveRequest>> {
        if !self.zipped() {
            return Ok(None);
        }
        Ok(Some(ArchiveRequest {
            destination: stage.host_output("output_ensemble")?.to_path_buf(),
            sources: vec![self.results_dir(stage)?],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockKind;
    use crate::blocks::test_support::{plan, table};

    const IO: &str =
        "input_excel = \"f.xlsx\"\ninput_hyperparameter_path = \"h.xlsx\"\noutput_ensemble = \"ensemble\"";

    #[test]
    fn test_default_arguments() {
        let block = BlockKind::Ensemble.build(table(IO), toml::Table::new()).unwrap();
        let stage = plan(block.as_ref());
        let args = block.arguments(&stage).unwrap();

        assert_eq!(args[0], "--excel");
        assert_eq!(args[1], stage.unique_dir.join("f.xlsx").display().to_string());
        assert_eq!(args[3], stage.unique_dir.join("h.xlsx").display().to_string());
        assert_eq!(args[5], stage.unique_dir.join("ensemble").display().to_string());
        assert_eq!(
            &args[6..],
            &[
                "--prediction_threshold", "0.5",
                "--precision_weight", "1",
                "--recall_weight", "0.8",
                "--class0_weight", "0.5",
                "--report_weight", "0.25",
                "--difference_weight", "0.8",
                "--kfold_parameters", "5:0.2",
                "--scaler", "robust",
            ]
        );
        assert!(block.archive(&stage).unwrap().is_none());
    }

    #[test]
    fn test_sheets_label_and_outliers() {
        let block = BlockKind::Ensemble
            .build(
                table(
                    "input_excel = \"f.xlsx\"\ninput_hyperparameter = \"h.xlsx\"\nlabel = \"/host/labels.csv\"\noutput_ensemble = \"ensemble\"",
                ),
                table(
                    "sheets = \"ch2_20\"\nprediction_threshold = 0.7\nnum_thread = 8\noutliers = \"seq_3,seq_9\"",
                ),
            )
            .unwrap();
        let stage = plan(block.as_ref());
        let args = block.arguments(&stage).unwrap().join(" ");

        assert!(args.contains("--sheets ch2_20 --label"));
        assert!(args.contains(&format!(
            "--label {}",
            stage.unique_dir.join("labels.csv").display()
        )));
        assert!(args.contains("--prediction_threshold 0.7 --num_thread 8"));
        assert!(args.ends_with("--scaler robust --outliers seq_3 seq_9"));
    }

    #[test]
    fn test_zipped_output_is_archived() {
        let block = Ensemble {
            io: EnsembleIo {
                input_excel: PathBuf::from("/host/f.xlsx"),
                input_hyperparameter_path: PathBuf::from("/host/h.xlsx"),
                label: None,
                output_ensemble: PathBuf::from("/host/ensemble.zip"),
            },
            properties: EnsembleProperties::default(),
        };
        let stage = plan(&block);
        let request = block.archive(&stage).unwrap().unwrap();

        assert_eq!(request.destination, PathBuf::from("/host/ensemble.zip"));
        assert_eq!(request.sources, vec![stage.unique_dir.join("ensemble")]);
        assert!(
            block
                .arguments(&stage)
                .unwrap()
                .contains(&stage.unique_dir.join("ensemble").display().to_string())
        );
    }
}
