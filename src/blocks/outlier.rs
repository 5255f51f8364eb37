use super::{BuildingBlock, CommandLine, Scaler};
use crate::result::Result;
use crate::stage::Stage;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutlierIo {
    /// Selected features in excel format
    pub input_excel: PathBuf,
    pub output_outlier: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlierProperties {
    pub num_thread: Option<u32>,
    pub scaler: Option<Scaler>,
    /// Expected proportion of outliers in the data
    pub contamination: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Outlier {
    pub io: OutlierIo,
    pub properties: OutlierProperties,
}

impl BuildingBlock for Outlier {
    fn name(&self) -> &'static str {
        "outlier"
    }

    fn inputs(&self) -> Vec<(&'static str, &Path)> {
        vec![("input_excel", self.io.input_excel.as_path())]
    }

    fn outputs(&self) -> Vec<(&'static str, &Path)> {
        vec![("output_outlier", self.io.output_outlier.as_path())]
    }

    fn arguments(&self, stage: &Stage) -> Result<Vec<String>> {
        let p = &self.properties;
        Ok(CommandLine::new()
            .arg("-e", stage.input("input_excel")?.display())
            .arg("-o", stage.output("output_outlier")?.display())
            .opt("--num_thread", p.num_thread)
            .opt("--scaler", p.scaler)
            .opt("--contamination", p.contamination)
            .into_vec())
    }
}
