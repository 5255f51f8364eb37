//! Feature extraction with POSSUM and iFeature.

use super::{BuildingBlock, CommandLine};
use crate::error::Error;
use crate::result::Result;
use crate::stage::Stage;
use log::debug;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Directory inside the working directory receiving the unpacked PSSM archive
const PROFILES_DIR: &str = "pssm_profiles";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureExtractionIo {
    /// Protein sequences in fasta format
    #[serde(alias = "input_fasta")]
    pub input_fasta_file: PathBuf,
    /// Zip holding previously generated PSSM profiles
    pub pssm: Option<PathBuf>,
    /// Csv with every extracted feature
    pub every_features: Option<PathBuf>,
    /// Excel with the features of the new data
    pub new_features: Option<PathBuf>,
}

/// Whether features are extracted for training or filtered for prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    #[default]
    Extract,
    Read,
    Filter,
}

/// Which extraction programs to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extractor {
    Possum,
    Ifeature,
    #[default]
    Both,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Purpose::Extract => "extract",
            Purpose::Read => "read",
            Purpose::Filter => "filter",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Extractor::Possum => "possum",
            Extractor::Ifeature => "ifeature",
            Extractor::Both => "both",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureExtractionProperties {
    pub pssm_dir: String,
    pub fasta_dir: String,
    pub ifeature_dir: String,
    pub possum_dir: String,
    pub ifeature_out: String,
    pub possum_out: String,
    /// Extracted features from the training or the new data
    pub extracted_out: String,
    /// Selected training features, used to filter the features of new data
    pub excel: String,
    pub purpose: Purpose,
    /// Restart from the long commands
    pub long: bool,
    pub run: Extractor,
    /// Threads used to generate the PSSM profiles
    pub num_thread: u32,
    /// Feature families to extract, `all` or a comma separated list
    #[serde(rename = "type")]
    pub kind: String,
    pub type_file: Option<String>,
    /// `sheet:model,model` selections of feature sheets and kfold models
    pub sheets: Option<String>,
}

impl Default for FeatureExtractionProperties {
    fn default() -> Self {
        Self {
            pssm_dir: "pssm".to_string(),
            fasta_dir: "fasta_files".to_string(),
            ifeature_dir: "iFeature".to_string(),
            possum_dir: "POSSUM_Toolkit".to_string(),
            ifeature_out: "ifeature_features".to_string(),
            possum_out: "possum_features".to_string(),
            extracted_out: "training_features".to_string(),
            excel: "training_features/selected_features.xlsx".to_string(),
            purpose: Purpose::default(),
            long: false,
            run: Extractor::default(),
            num_thread: 100,
            kind: "all".to_string(),
            type_file: None,
            sheets: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureExtraction {
    pub io: FeatureExtractionIo,
    pub properties: FeatureExtractionProperties,
}

impl FeatureExtraction {
    /// PSSM folder handed to the tool, inside the unpacked archive when one is given
    fn pssm_dir(&self, stage: &Stage) -> PathBuf {
        match self.io.pssm {
            Some(_) => stage.unique_dir.join(PROFILES_DIR).join(&self.properties.pssm_dir),
            None => PathBuf::from(&self.properties.pssm_dir),
        }
    }

    /// Extraction folder, moved into the working directory when its files are collected
    fn extracted_out(&self, stage: &Stage) -> PathBuf {
        if self.io.every_features.is_some() || self.io.new_features.is_some() {
            stage.unique_dir.join(&self.properties.extracted_out)
        } else {
            PathBuf::from(&self.properties.extracted_out)
        }
    }
}

impl BuildingBlock for FeatureExtraction {
    fn name(&self) -> &'static str {
        "feature_extraction"
    }

    fn inputs(&self) -> Vec<(&'static str, &Path)> {
        let mut inputs = vec![("input_fasta_file", self.io.input_fasta_file.as_path())];
        if let Some(pssm) = &self.io.pssm {
            inputs.push(("pssm", pssm.as_path()));
        }
        inputs
    }

    fn outputs(&self) -> Vec<(&'static str, &Path)> {
        let mut outputs = Vec::new();
        if let Some(every) = &self.io.every_features {
            outputs.push(("every_features", every.as_path()));
        }
        if let Some(new) = &self.io.new_features {
            outputs.push(("new_features", new.as_path()));
        }
        outputs
    }

    fn staged_output(&self, key: &str, unique_dir: &Path, _host: &Path) -> PathBuf {
        let file_name = match key {
            "every_features" => "every_features.csv",
            _ => "new_features.xlsx",
        };
        unique_dir.join(&self.properties.extracted_out).join(file_name)
    }

    fn prepare(&self, stage: &Stage) -> Result<()> {
        let Some(archive) = stage.declared_input("pssm") else {
            return Ok(());
        };

        let mut zip = ZipArchive::new(File::open(archive)?).map_err(|_| {
            Error::InvalidManifest(format!("pssm: {} is not a zip archive", archive.display()))
        })?;
        let destination = stage.unique_dir.join(PROFILES_DIR);
        debug!("Unpacking {} PSSM files to {}", zip.len(), destination.display());
        zip.extract(&destination)?;
        Ok(())
    }

    fn arguments(&self, stage: &Stage) -> Result<Vec<String>> {
        let p = &self.properties;
        Ok(CommandLine::new()
            .arg("-i", stage.input("input_fasta_file")?.display())
            .arg("--pssm_dir", self.pssm_dir(stage).display())
            .arg("--fasta_dir", &p.fasta_dir)
            .arg("--ifeature_dir", &p.ifeature_dir)
            .arg("--possum_dir", &p.possum_dir)
            .arg("--ifeature_out", &p.ifeature_out)
            .arg("--possum_out", &p.possum_out)
            .arg("--extracted_out", self.extracted_out(stage).display())
            .arg("--excel", &p.excel)
            .arg("--purpose", p.purpose)
            .switch("--long", p.long)
            .arg("--run", p.run)
            .arg("--num_thread", p.num_thread)
            .arg("--type", &p.kind)
            .opt("--type_file", p.type_file.as_deref())
            .opt("--sheets", p.sheets.as_deref())
            .into_vec())
    }
}
