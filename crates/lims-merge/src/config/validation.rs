//! Configuration validation.

use super::Config;
use crate::error::{MergeError, Result};

/// Validate the configuration. Runs before any connection is opened.
pub fn validate(config: &Config) -> Result<()> {
    if config.source.host.is_empty() {
        return Err(MergeError::Config("source.host is required".into()));
    }
    if config.source.user.is_empty() {
        return Err(MergeError::Config("source.user is required".into()));
    }
    if config.source.lims_schema.is_empty() {
        return Err(MergeError::Config("source.lims_schema is required".into()));
    }
    if config.source.labbench_schema.is_empty() {
        return Err(MergeError::Config(
            "source.labbench_schema is required".into(),
        ));
    }
    if config.source.lims_schema == config.source.labbench_schema {
        return Err(MergeError::Config(
            "source schemas must be distinct".into(),
        ));
    }

    if config.dest.host.is_empty() {
        return Err(MergeError::Config("dest.host is required".into()));
    }
    if config.dest.database.is_empty() {
        return Err(MergeError::Config("dest.database is required".into()));
    }
    if config.dest.user.is_empty() {
        return Err(MergeError::Config("dest.user is required".into()));
    }

    if config.merge.max_plates == 0 {
        return Err(MergeError::Config(
            "merge.max_plates must be at least 1".into(),
        ));
    }
    if config.merge.batch_size == 0 {
        return Err(MergeError::Config(
            "merge.batch_size must be at least 1".into(),
        ));
    }

    Ok(())
}
