use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Settings file error: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("import rejected:\n{0}")]
    ImportRejected(ImportReport),

    #[error("product not found: {key}")]
    ProductNotFound { key: String },
}

impl PricingError {
    /// Process exit code for the CLI: 2 for configuration and boundary
    /// validation failures, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            PricingError::Config { .. }
            | PricingError::InvalidValue { .. }
            | PricingError::ImportRejected(_)
            | PricingError::Settings(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, PricingError>;

/// One defect found in an uploaded catalog row. Row numbers are 1-based data
/// rows; the header row is not counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDefect {
    pub row: usize,
    pub column: String,
    pub reason: String,
}

/// Everything wrong with an uploaded catalog file. A non-empty report means
/// the whole batch is rejected; nothing is partially imported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub missing_columns: Vec<String>,
    pub row_defects: Vec<RowDefect>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.missing_columns.is_empty() && self.row_defects.is_empty()
    }

    pub fn defect_count(&self) -> usize {
        self.missing_columns.len() + self.row_defects.len()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for column in &self.missing_columns {
            if !first {
                writeln!(f)?;
            }
            write!(f, "  missing column `{}`", column)?;
            first = false;
        }
        for defect in &self.row_defects {
            if !first {
                writeln!(f)?;
            }
            write!(
                f,
                "  row {}, column `{}`: {}",
                defect.row, defect.column, defect.reason
            )?;
            first = false;
        }
        Ok(())
    }
}
