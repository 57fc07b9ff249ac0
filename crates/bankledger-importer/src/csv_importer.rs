//! CSV file importer.

use crate::config::ImporterConfig;
use crate::date::DateFormat;
use crate::error::{ImportError, InputFormatError};
use crate::layout::ColumnLayout;
use crate::ImportResult;
use bankledger_core::Transaction;
use std::fs;
use std::path::Path;

/// CSV file importer with its templates already resolved.
#[derive(Debug, Clone)]
pub struct CsvImporter {
    config: ImporterConfig,
    layout: ColumnLayout,
    date_format: DateFormat,
    delimiter: u8,
}

impl CsvImporter {
    /// Create an importer, validating the layout, date template and delimiter.
    pub fn new(config: ImporterConfig) -> Result<Self, InputFormatError> {
        let csv = &config.csv;
        let delimiter = u8::try_from(csv.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(InputFormatError::InvalidDelimiter(csv.delimiter))?;
        let layout = ColumnLayout::parse(&csv.layout, csv.delimiter)?;
        let date_format = DateFormat::parse(&csv.date_format)?;
        Ok(Self {
            config,
            layout,
            date_format,
            delimiter,
        })
    }

    /// Extract transactions from a file.
    pub fn extract_file(&self, path: &Path) -> Result<ImportResult, ImportError> {
        let content = fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let result = self.extract_string(&content)?;
        tracing::info!(
            path = %path.display(),
            transactions = result.transactions.len(),
            skipped = result.warnings.len(),
            "read bank export"
        );
        Ok(result)
    }

    /// Extract transactions from string content.
    ///
    /// Rows that do not fit the layout or templates are skipped and reported
    /// in [`ImportResult::warnings`], or abort the import in strict mode.
    pub fn extract_string(&self, content: &str) -> Result<ImportResult, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(content.as_bytes());

        let mut result = ImportResult::empty();
        for (index, record) in reader.records().enumerate() {
            let row = index + 1;
            let record = record?;
            if row == 1 && self.config.csv.skip_first_row {
                continue;
            }

            match self.parse_row(&record, row) {
                Ok(txn) => result.transactions.push(txn),
                Err(err) if self.config.csv.strict => return Err(err.into()),
                Err(err) => {
                    tracing::warn!(row, "skipping row: {err}");
                    result.warnings.push(err);
                }
            }
        }
        Ok(result)
    }

    fn parse_row(
        &self,
        record: &csv::StringRecord,
        row: usize,
    ) -> Result<Transaction, InputFormatError> {
        let fields: Vec<&str> = record.iter().collect();
        if fields.len() != self.layout.len() {
            return Err(InputFormatError::WrongColumnCount {
                row,
                expected: self.layout.len(),
                found: fields.len(),
            });
        }

        let raw_date = fields[self.layout.date()];
        let date = self
            .date_format
            .parse_date(raw_date)
            .ok_or_else(|| InputFormatError::InvalidDate {
                row,
                value: raw_date.to_string(),
                format: self.date_format.to_string(),
            })?;

        let amount =
            self.layout
                .read_amount(&fields)
                .map_err(|value| InputFormatError::InvalidAmount {
                    row,
                    value: value.to_string(),
                })?;

        let mut description = fields[self.layout.desc()];
        if self.config.csv.trim_description {
            description = description.trim();
        }
        Ok(Transaction::new(
            &self.config.account,
            date,
            description,
            amount,
        ))
    }
}
