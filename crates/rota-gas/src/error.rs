//! Error types for rota-gas
//!
//! Malformed sheets are not errors; they come back as
//! [`ImportFailure`](crate::record::ImportFailure) records. Only problems
//! that leave nothing to reason about surface here.

use thiserror::Error;

use crate::record::ImportType;

/// Errors returned by the import entry points
#[derive(Debug, Error)]
pub enum ImportError {
    /// The buffer could not be loaded as a workbook
    #[error("failed to load workbook: {0}")]
    Load(#[from] rota_xlsx::XlsxError),

    /// The request targets a layout this parser does not handle
    #[error("import type {0} is not handled by the GAS parser")]
    UnsupportedImportType(ImportType),

    /// Invalid parser configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}
