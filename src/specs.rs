//! Specification document: the option lists behind coded article fields.
//!
//! The document is fetched from the PIM specification service, cached on
//! disk and reused until the cache is invalidated (for example after new
//! options were created remotely).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::config::RunConfig;
use crate::error::{ConvertError, Result};
use crate::io::flatfile::Loaded;

/// HTTP request timeout for the specification service.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpecificationDocument {
    #[serde(default)]
    pub items: Vec<SpecificationItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpecificationItem {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub options: Vec<SpecificationOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpecificationOption {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl SpecificationDocument {
    pub fn from_json(source: &str) -> Result<Self> {
        let document: SpecificationDocument = serde_json::from_str(source)?;
        Ok(document)
    }
}

/// Anything able to produce a fresh specification document.
pub trait SpecificationSource {
    fn fetch(&self) -> Result<SpecificationDocument>;
}

/// Blocking client for the remote PIM service.
pub struct PimClient {
    client: Client,
    specification_url: String,
    options_url: String,
    api_key: String,
}

/// Outcome of creating a catalogue option remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Created,
    AlreadyExists,
}

/// Anything able to create catalogue options.
pub trait OptionPublisher {
    fn create_option(&self, attribute_id: u32, code: &str, name: &str) -> Result<PublishOutcome>;
}

impl PimClient {
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(ConvertError::MissingApiKey("the PIM service"))?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            specification_url: config.specification_url.clone(),
            options_url: config.options_url.clone(),
            api_key,
        })
    }
}

impl SpecificationSource for PimClient {
    #[instrument(level = "info", skip(self), fields(url = %self.specification_url))]
    fn fetch(&self) -> Result<SpecificationDocument> {
        let response = self
            .client
            .get(&self.specification_url)
            .header("apikey", &self.api_key)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConvertError::RemoteStatus {
                url: self.specification_url.clone(),
                status: status.as_u16(),
            });
        }
        let document: SpecificationDocument = response.json()?;
        info!(items = document.items.len(), "fetched specification document");
        Ok(document)
    }
}

impl OptionPublisher for PimClient {
    #[instrument(level = "info", skip(self))]
    fn create_option(&self, attribute_id: u32, code: &str, name: &str) -> Result<PublishOutcome> {
        let url = format!(
            "{}/{attribute_id}/specificationAttributeOptions",
            self.options_url
        );
        let payload = json!({
            "name": name,
            "code": code,
            "subTitle": "",
            "displayOrder": 0,
        });
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()?;

        let status = response.status().as_u16();
        match status {
            200 | 201 => Ok(PublishOutcome::Created),
            400 => {
                let body = response.text()?;
                if body.contains("already exists") {
                    Ok(PublishOutcome::AlreadyExists)
                } else {
                    Err(ConvertError::RemoteStatus { url, status })
                }
            }
            _ => Err(ConvertError::RemoteStatus { url, status }),
        }
    }
}

/// On-disk copy of the specification document.
#[derive(Debug, Clone)]
pub struct SpecificationCache {
    path: PathBuf,
}

impl SpecificationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached document.
    pub fn load(&self) -> Result<Loaded<SpecificationDocument>> {
        match fs::read_to_string(&self.path) {
            Ok(source) => Ok(Loaded::Data(SpecificationDocument::from_json(&source)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                Ok(Loaded::Missing(self.path.clone()))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Fetches a fresh document and replaces the cached copy.
    pub fn refresh(&self, source: &dyn SpecificationSource) -> Result<SpecificationDocument> {
        let document = source.fetch()?;
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&document)?)?;
        debug!(path = %self.path.display(), "specification cache written");
        Ok(document)
    }

    /// Returns the cached document, fetching it first when absent.
    pub fn load_or_refresh(&self, source: &dyn SpecificationSource) -> Result<SpecificationDocument> {
        match self.load()? {
            Loaded::Data(document) => Ok(document),
            Loaded::Missing(_) => self.refresh(source),
        }
    }

    /// Drops the cached copy so that the next load fetches a fresh one.
    pub fn invalidate(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "specification cache invalidated");
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
