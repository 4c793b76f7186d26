//! Run configuration.
//!
//! A [`RunConfig`] is built once per invocation (defaults, optionally
//! overridden by a TOML file and then by command-line flags) and passed by
//! reference into every stage of the pipeline.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::Result;

/// Formula name used when a product line has no configured formula.
pub const UNKNOWN_FORMULA: &str = "Onbekend";

/// Settings shared by every product-line run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory holding the `art*`, `atk*`, `mvm*`, `lev*`, `uic*`, `stc*`
    /// and `adc*` export files.
    pub input_dir: PathBuf,
    /// Root directory for converted files; each product line writes into
    /// its own sub-folder.
    pub output_dir: PathBuf,
    /// Location of the cached specification document.
    pub specification_cache: PathBuf,
    /// Endpoint returning the specification document.
    pub specification_url: String,
    /// Endpoint prefix used to create options; the attribute id and
    /// `/specificationAttributeOptions` are appended.
    pub options_url: String,
    /// Key sent as the `apikey` header on remote calls.
    pub api_key: Option<String>,
    /// Create missing catalogue options remotely instead of only logging them.
    pub post_options: bool,
    /// When set, only the article with this number is converted.
    pub debug_article: Option<String>,
    /// Base URL prefixed to image file names in the image mapping export.
    pub image_base_url: String,
    /// Product-line code → formula display name.
    pub formulas: BTreeMap<String, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        let formulas = [
            ("pw", "Pronto Wonen"),
            ("bs", "Baenks"),
            ("in", "INHOUSE"),
            ("pm", "Profijt Meubel"),
        ]
        .into_iter()
        .map(|(line, formula)| (line.to_string(), formula.to_string()))
        .collect();

        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("converted-files"),
            specification_cache: PathBuf::from("SpecificationAttributeRespons.json"),
            specification_url: "https://img.katanapim.com/api/v1/Specifications?PageSize=150"
                .to_string(),
            options_url: "https://img.katanapim.com/api/v2/specificationAttributes".to_string(),
            api_key: None,
            post_options: false,
            debug_article: None,
            image_base_url:
                "https://img.leenweb.app/katanaPIM/dropfiles/output_files/ART_DOCS".to_string(),
            formulas,
        }
    }
}

impl RunConfig {
    /// Loads the configuration from a TOML file. Keys missing from the file
    /// keep their default value.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Formula display name for a product-line code such as `pw`.
    pub fn formula_for(&self, line: &str) -> &str {
        self.formulas
            .get(&line.to_ascii_lowercase())
            .map(String::as_str)
            .unwrap_or(UNKNOWN_FORMULA)
    }

    /// Output folder for a product-line code.
    pub fn line_output_dir(&self, line: &str) -> PathBuf {
        self.output_dir.join(line)
    }
}
