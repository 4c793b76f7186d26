//! End-to-end conversion of the product lines found in the input directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::articles;
use crate::attributes::{self, AttributeTable};
use crate::config::RunConfig;
use crate::discovery::{self, InputBundle, ProductLine};
use crate::error::Result;
use crate::grandparent::{self, GrandparentBuilder};
use crate::images::{self, IMAGE_LINE};
use crate::io::excel_write;
use crate::io::flatfile::Loaded;
use crate::lookup::{AttributeKey, OptionTables};
use crate::memo;
use crate::model::{ArticleRecord, WorkbookData};
use crate::options_sync::{self, CATALOGUE_ATTRIBUTES};
use crate::projection::{ArticleLayout, Projector};
use crate::runlog::{LogChannel, RunLog};
use crate::specs::{OptionPublisher, PimClient, SpecificationCache, SpecificationSource};
use crate::suppliers;

/// Outcome of one product-line run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub suffix: String,
    pub line: String,
    pub records_read: usize,
    pub article_rows: usize,
    pub grandparent_rows: usize,
    pub memo_entries: usize,
    pub options_posted: usize,
    /// Every file written by the run, workbooks first.
    pub outputs: Vec<PathBuf>,
}

/// Conversion driver. Remote collaborators are optional: without a source
/// the cached specification document is used as is, and without a
/// publisher missing catalogue options are only reported.
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    source: Option<&'a dyn SpecificationSource>,
    publisher: Option<&'a dyn OptionPublisher>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            source: None,
            publisher: None,
        }
    }

    pub fn with_source(mut self, source: &'a dyn SpecificationSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Missing options are only published when `post_options` is enabled.
    pub fn with_publisher(mut self, publisher: &'a dyn OptionPublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    fn cache(&self) -> SpecificationCache {
        SpecificationCache::new(&self.config.specification_cache)
    }

    /// Processes every product line sequentially.
    #[instrument(level = "info", skip(self), fields(input = %self.config.input_dir.display()))]
    pub fn run_all(&self) -> Result<Vec<RunSummary>> {
        let lines = discovery::detect_product_lines(&self.config.input_dir)?;
        if lines.is_empty() {
            warn!("no article files found");
        }
        lines
            .iter()
            .map(|line| self.run_product_line(line))
            .collect()
    }

    #[instrument(level = "info", skip(self), fields(suffix = %line.suffix))]
    pub fn run_product_line(&self, line: &ProductLine) -> Result<RunSummary> {
        let config = self.config;
        let output_dir = config.line_output_dir(&line.line);
        fs::create_dir_all(&output_dir)?;
        let bundle = InputBundle::locate(&config.input_dir, line)?;
        let mut log = RunLog::new();
        let mut summary = RunSummary {
            suffix: line.suffix.clone(),
            line: line.line.clone(),
            ..RunSummary::default()
        };

        let mut options = self.load_option_tables(&mut log);
        summary.options_posted = self.reconcile_options(&bundle, &mut options, &mut log)?;

        let mut records = match articles::read_articles(&bundle.articles)? {
            Loaded::Data(records) => records,
            Loaded::Missing(path) => {
                log.record(
                    LogChannel::General,
                    format!("Article file not found: {}", path.display()),
                );
                Vec::new()
            }
        };
        if let Some(article) = &config.debug_article {
            articles::retain_article(&mut records, article);
            info!(article = %article, kept = records.len(), "debug filter applied");
        }
        summary.records_read = records.len();

        let attribute_table = match attributes::read_attributes(bundle.attributes.as_deref())? {
            Loaded::Data(table) => table,
            Loaded::Missing(_) => {
                log.record(LogChannel::Attributes, "Attribute file not found");
                AttributeTable::default()
            }
        };
        let layout = ArticleLayout::new(attributes::select_fields(&attribute_table, &mut log));
        let projector = Projector {
            layout: &layout,
            attributes: &attribute_table,
            options: &options,
            line: &line.line,
        };
        let article_table = projector.build_table(&records, &mut log);
        summary.article_rows = article_table.rows.len();
        let article_path = output_dir.join(format!("{}.xlsx", line.stem()));
        excel_write::write_workbook(
            &article_path,
            &WorkbookData {
                tables: vec![article_table],
            },
        )?;
        summary.outputs.push(article_path);

        let memos = match memo::read_memos(bundle.memos.as_deref())? {
            Loaded::Data(memos) => memos,
            Loaded::Missing(_) => {
                log.record(LogChannel::General, "Memo file not found");
                Default::default()
            }
        };
        let suppliers = suppliers::read_supplier_directory(bundle.suppliers.as_deref())?;
        if suppliers.is_empty() {
            log.record(LogChannel::General, "No supplier names available");
        }

        let groups = grandparent::aggregate(&records, &mut log);
        let builder = GrandparentBuilder {
            options: &options,
            memos: &memos,
            suppliers: &suppliers,
            line: &line.line,
            formula: config.formula_for(&line.line),
        };
        let grandparent_table = builder.build_table(&groups);
        summary.grandparent_rows = grandparent_table.rows.len();
        let grandparent_path = output_dir.join(format!("{}_GP.xlsx", line.stem()));
        excel_write::write_workbook(
            &grandparent_path,
            &WorkbookData {
                tables: vec![grandparent_table],
            },
        )?;
        summary.outputs.push(grandparent_path);

        let memo_document = builder.memo_document(&groups);
        summary.memo_entries = memo_document.product.len();
        let memo_path = output_dir.join(format!("art{}_GP-memovelden.json", line.line));
        fs::write(&memo_path, serde_json::to_string_pretty(&memo_document)?)?;
        summary.outputs.push(memo_path);

        if line.line == IMAGE_LINE {
            if let Some(path) = self.export_images(&bundle, &records, &output_dir, &mut log)? {
                summary.outputs.push(path);
            }
        }

        summary
            .outputs
            .extend(log.write_to(&output_dir, &line.suffix)?);
        info!(
            articles = summary.article_rows,
            parents = summary.grandparent_rows,
            memos = summary.memo_entries,
            "product line converted"
        );
        Ok(summary)
    }

    /// Builds the option tables from the cached (or freshly fetched)
    /// specification document. Failures leave the tables empty so that
    /// every code falls back to its raw value.
    fn load_option_tables(&self, log: &mut RunLog) -> OptionTables {
        let cache = self.cache();
        let document = match self.source {
            Some(source) => cache.load_or_refresh(source).map(Loaded::Data),
            None => cache.load(),
        };
        match document {
            Ok(Loaded::Data(document)) => OptionTables::from_document(&document, log),
            Ok(Loaded::Missing(path)) => {
                log.record(
                    LogChannel::General,
                    format!("Specification document not cached at {}", path.display()),
                );
                OptionTables::default()
            }
            Err(error) => {
                log.record(
                    LogChannel::General,
                    format!("Specification document unavailable: {error}"),
                );
                OptionTables::default()
            }
        }
    }

    /// Returns the number of options created remotely.
    fn reconcile_options(
        &self,
        bundle: &InputBundle,
        options: &mut OptionTables,
        log: &mut RunLog,
    ) -> Result<usize> {
        let publisher = self.publisher.filter(|_| self.config.post_options);
        let mut posted = 0;

        for (key, attribute_id) in CATALOGUE_ATTRIBUTES {
            let path = match key {
                AttributeKey::CatalogueVariant => bundle.catalogue_variants.as_deref(),
                _ => bundle.catalogue_kinds.as_deref(),
            };
            match options_sync::read_catalogue_options(path, key.code())? {
                Loaded::Data(file_options) => {
                    let summary = options_sync::reconcile(
                        key,
                        attribute_id,
                        &file_options,
                        options,
                        publisher,
                        log,
                    );
                    posted += summary.posted;
                }
                Loaded::Missing(_) => {
                    log.record(
                        LogChannel::Options,
                        format!("No option file for {key}, skipped"),
                    );
                }
            }
        }

        if posted > 0 {
            self.cache().invalidate()?;
        }
        Ok(posted)
    }

    fn export_images(
        &self,
        bundle: &InputBundle,
        records: &[ArticleRecord],
        output_dir: &Path,
        log: &mut RunLog,
    ) -> Result<Option<PathBuf>> {
        let mapping =
            match images::read_image_mapping(bundle.images.as_deref(), &self.config.image_base_url)? {
                Loaded::Data(mapping) => mapping,
                Loaded::Missing(_) => {
                    log.record(LogChannel::General, "No image file found for the image mapping");
                    return Ok(None);
                }
            };
        let path = output_dir.join(format!("images_{IMAGE_LINE}.xlsx"));
        excel_write::write_workbook(
            &path,
            &WorkbookData {
                tables: vec![mapping.to_table(records)],
            },
        )?;
        Ok(Some(path))
    }
}

/// Runs every product line with the remote service configured in `config`.
/// Without an API key the cached specification document is used and no
/// options are published.
pub fn run_all(config: &RunConfig) -> Result<Vec<RunSummary>> {
    match PimClient::from_config(config) {
        Ok(client) => Pipeline::new(config)
            .with_source(&client)
            .with_publisher(&client)
            .run_all(),
        Err(error) => {
            warn!(%error, "remote service disabled");
            Pipeline::new(config).run_all()
        }
    }
}

/// Fetches the specification document and replaces the cached copy.
pub fn refresh_specifications(config: &RunConfig) -> Result<PathBuf> {
    let client = PimClient::from_config(config)?;
    let cache = SpecificationCache::new(&config.specification_cache);
    cache.refresh(&client)?;
    Ok(cache.path().to_path_buf())
}
