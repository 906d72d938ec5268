//! Errors raised while loading an XLSX package

use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Why a package could not be turned into a [`rota_core::Workbook`]
#[derive(Debug, Error)]
pub enum XlsxError {
    /// The file could not be opened or read
    #[error("cannot read workbook file: {0}")]
    Io(#[from] std::io::Error),

    /// Not a zip archive, or a damaged one
    #[error("not a readable zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A package part is not well-formed XML
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A zip archive that is not a SpreadsheetML package
    #[error("not an XLSX workbook: {0}")]
    InvalidFormat(String),

    /// A part that the package or its relationships point at is absent
    #[error("package part '{0}' is missing")]
    MissingPart(String),

    /// Content inside a part that cannot be understood
    #[error("unreadable content: {0}")]
    Parse(String),

    /// A cell position or sheet name the workbook model rejects
    #[error(transparent)]
    Core(#[from] rota_core::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_problem() {
        let missing = XlsxError::MissingPart("xl/worksheets/sheet3.xml".into());
        assert_eq!(
            missing.to_string(),
            "package part 'xl/worksheets/sheet3.xml' is missing"
        );

        let core = XlsxError::from(rota_core::Error::DuplicateSheetName("UNITAS".into()));
        assert_eq!(core.to_string(), "Sheet name already exists: UNITAS");
    }
}
