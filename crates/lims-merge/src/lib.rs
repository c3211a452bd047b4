//! # lims-merge
//!
//! Cross-schema record subset migration engine.
//!
//! Merges a plate-rooted subset of two independently-keyed LIMS schemas
//! into a third, structurally identical schema:
//!
//! - **Global reference tables** are copied whole from both sources
//! - **Worksets** computed by walking the foreign-key graph forward from
//!   the selected root plates, one closure per source
//! - **Identity preservation** for the first source, per-table **offset
//!   reindexing** for the second, with every declared foreign key
//!   rewritten through in-memory identifier maps
//! - **Unique-text de-collision** with deterministic suffixing
//! - One destination transaction around the whole run
//!
//! ## Example
//!
//! ```rust,no_run
//! use lims_merge::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("merge.yaml")?;
//!     let orchestrator = Orchestrator::new(config).await?;
//!     let result = orchestrator.run().await?;
//!     println!("Merged {} rows", result.rows_copied);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod dest;
pub mod drivers;
pub mod error;
pub mod migrate;
pub mod orchestrator;
pub mod record;
pub mod remap;
pub mod source;
pub mod workset;

// Re-exports for convenient access
pub use catalog::{TableCatalog, TableSpec};
pub use config::{Config, DestConfig, MergeConfig, SourceConfig};
pub use dest::DestWriter;
pub use error::{MergeError, Result};
pub use orchestrator::{MergeResult, Orchestrator};
pub use record::{Record, SqlValue};
pub use remap::{IdMaps, IdentifierMap, RemapPolicy};
pub use source::SourceReader;
pub use workset::{Workset, WorksetBuilder};
