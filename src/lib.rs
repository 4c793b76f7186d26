//! Core library for the catalog-convert command line application.
//!
//! The library turns the flat-file exports of a retail ERP (article,
//! attribute, memo, supplier and option files per product line) into the
//! article and parent-level workbooks plus the memo JSON consumed by the
//! product information system. IO adapters live under [`io`], the typed
//! record model in [`model`] and [`schema`], value reconstruction in
//! [`merge`] and [`attributes`], code resolution in [`lookup`], row assembly
//! in [`projection`] and [`grandparent`], and the orchestration in
//! [`pipeline`].

pub mod articles;
pub mod attributes;
pub mod config;
pub mod discovery;
pub mod error;
pub mod grandparent;
pub mod images;
pub mod io;
pub mod lookup;
pub mod memo;
pub mod merge;
pub mod model;
pub mod options_sync;
pub mod pipeline;
pub mod projection;
pub mod runlog;
pub mod schema;
pub mod specs;
pub mod suppliers;

pub use config::RunConfig;
pub use error::{ConvertError, Result};
pub use pipeline::{Pipeline, RunSummary};
