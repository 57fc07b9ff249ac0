//! Configuration for the CSV importer.

use crate::csv_importer::CsvImporter;
use crate::error::ImportError;
use crate::ImportResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default column layout.
pub const DEFAULT_LAYOUT: &str = "Date,Desc,Amount";
/// Default date template.
pub const DEFAULT_DATE_FORMAT: &str = "D/M/Y";

/// Configuration for an import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImporterConfig {
    /// The account every imported transaction belongs to.
    pub account: String,
    /// How to read the file.
    pub csv: CsvConfig,
}

/// How to read a bank CSV export.
///
/// Deserializable from a JSON profile; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Column layout template, e.g. `Date,Desc,Amount`.
    pub layout: String,
    /// Date template, e.g. `D/M/Y`.
    pub date_format: String,
    /// The field delimiter (also splits the layout template).
    pub delimiter: char,
    /// Skip the first row (a header).
    pub skip_first_row: bool,
    /// Abort on the first malformed row instead of skipping it.
    pub strict: bool,
    /// Strip surrounding whitespace from descriptions.
    pub trim_description: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            layout: DEFAULT_LAYOUT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            delimiter: ',',
            skip_first_row: false,
            strict: false,
            trim_description: false,
        }
    }
}

impl CsvConfig {
    /// Read a JSON profile.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ImporterConfig {
    /// Start building a CSV importer configuration.
    pub fn csv() -> CsvConfigBuilder {
        CsvConfigBuilder::new()
    }

    /// Extract transactions from a file.
    pub fn extract(&self, path: &Path) -> Result<ImportResult, ImportError> {
        CsvImporter::new(self.clone())?.extract_file(path)
    }

    /// Extract transactions from string content.
    pub fn extract_from_string(&self, content: &str) -> Result<ImportResult, ImportError> {
        CsvImporter::new(self.clone())?.extract_string(content)
    }
}

/// Builder for CSV importer configuration.
#[derive(Debug, Clone, Default)]
pub struct CsvConfigBuilder {
    account: Option<String>,
    config: CsvConfig,
}

impl CsvConfigBuilder {
    /// Create a new CSV config builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing CSV configuration, e.g. a loaded profile.
    pub fn from_config(config: CsvConfig) -> Self {
        Self {
            account: None,
            config,
        }
    }

    /// Set the target account.
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Set the column layout template.
    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.config.layout = layout.into();
        self
    }

    /// Set the date template.
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.config.date_format = format.into();
        self
    }

    /// Set the field delimiter.
    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// Set whether the first row is skipped.
    pub const fn skip_first_row(mut self, skip: bool) -> Self {
        self.config.skip_first_row = skip;
        self
    }

    /// Set whether malformed rows abort the import.
    pub const fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Set whether descriptions are trimmed.
    pub const fn trim_description(mut self, trim: bool) -> Self {
        self.config.trim_description = trim;
        self
    }

    /// Build the importer configuration.
    pub fn build(self) -> ImporterConfig {
        ImporterConfig {
            account: self
                .account
                .unwrap_or_else(|| "Assets:Unknown".to_string()),
            csv: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ImporterConfig::csv().build();
        assert_eq!(config.account, "Assets:Unknown");
        assert_eq!(config.csv, CsvConfig::default());
        assert_eq!(config.csv.layout, "Date,Desc,Amount");
        assert_eq!(config.csv.date_format, "D/M/Y");
        assert_eq!(config.csv.delimiter, ',');
    }

    #[test]
    fn test_builder_setters() {
        let config = ImporterConfig::csv()
            .account("Assets:Current")
            .layout("Date;Desc;PaidIn;PaidOut")
            .date_format("Y-M-D")
            .delimiter(';')
            .skip_first_row(true)
            .strict(true)
            .trim_description(true)
            .build();
        assert_eq!(config.account, "Assets:Current");
        assert_eq!(config.csv.delimiter, ';');
        assert!(config.csv.skip_first_row);
        assert!(config.csv.strict);
        assert!(config.csv.trim_description);
    }

    #[test]
    fn test_from_json_partial() {
        let csv = CsvConfig::from_json(r#"{"layout": "Date,Junk,Desc,Amount", "skip_first_row": true}"#)
            .unwrap();
        assert_eq!(csv.layout, "Date,Junk,Desc,Amount");
        assert!(csv.skip_first_row);
        assert_eq!(csv.date_format, "D/M/Y");
        assert!(!csv.strict);
        assert!(!csv.trim_description);
    }

    #[test]
    fn test_from_json_rejects_bad_types() {
        assert!(CsvConfig::from_json(r#"{"delimiter": ",,"}"#).is_err());
        assert!(CsvConfig::from_json(r#"{"strict": "yes"}"#).is_err());
    }

    #[test]
    fn test_builder_from_config() {
        let csv = CsvConfig {
            delimiter: '\t',
            ..CsvConfig::default()
        };
        let config = CsvConfigBuilder::from_config(csv).account("A").build();
        assert_eq!(config.csv.delimiter, '\t');
    }
}
