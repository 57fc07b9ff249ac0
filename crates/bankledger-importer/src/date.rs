//! Date templates such as `D/M/Y`, `Y-M-D` or `D M Y`.
//!
//! The template's delimiter is a space if it has one, else `-` if it has
//! one, else `/`. Months may be numeric or a three-letter English name.
//! Two-digit years above 70 are read as 19xx, the rest as 20xx.

use chrono::NaiveDate;
use std::fmt;

use crate::error::InputFormatError;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Day,
    Month,
    Year,
}

/// A parsed date template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    template: String,
    delimiter: char,
    day: usize,
    month: usize,
    year: usize,
}

impl DateFormat {
    /// Parse a template.
    pub fn parse(template: &str) -> Result<Self, InputFormatError> {
        let invalid = || InputFormatError::InvalidDateFormat(template.to_string());
        let trimmed = template.trim();
        let delimiter = if trimmed.contains(' ') {
            ' '
        } else if trimmed.contains('-') {
            '-'
        } else {
            '/'
        };

        let parts = split(trimmed, delimiter)
            .iter()
            .map(|part| match part.chars().next().map(|c| c.to_ascii_uppercase()) {
                Some('D') => Ok(Part::Day),
                Some('M') => Ok(Part::Month),
                Some('Y') => Ok(Part::Year),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if parts.len() != 3 {
            return Err(invalid());
        }

        let position = |wanted: Part| parts.iter().position(|&p| p == wanted).ok_or_else(invalid);
        Ok(Self {
            template: template.to_string(),
            delimiter,
            day: position(Part::Day)?,
            month: position(Part::Month)?,
            year: position(Part::Year)?,
        })
    }

    /// The template as written.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parse a date field, or `None` if it does not fit the template or is
    /// not a real calendar date.
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let fields = split(text.trim(), self.delimiter);
        if fields.len() != 3 {
            return None;
        }
        let day: u32 = fields[self.day].parse().ok()?;
        let month = parse_month(fields[self.month])?;
        let year = parse_year(fields[self.year])?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

fn split(text: &str, delimiter: char) -> Vec<&str> {
    if delimiter == ' ' {
        text.split_whitespace().collect()
    } else {
        text.split(delimiter).map(str::trim).collect()
    }
}

fn parse_month(field: &str) -> Option<u32> {
    if field.len() == 3 && field.chars().all(|c| c.is_ascii_alphabetic()) {
        let lower = field.to_ascii_lowercase();
        let index = MONTHS.iter().position(|m| *m == lower)?;
        u32::try_from(index + 1).ok()
    } else {
        field.parse().ok()
    }
}

fn parse_year(field: &str) -> Option<i32> {
    let year: i32 = field.parse().ok()?;
    if field.len() == 2 {
        Some(expand_two_digit_year(year))
    } else {
        Some(year)
    }
}

/// Expand a two-digit year: above 70 is the 1900s, otherwise the 2000s.
pub const fn expand_two_digit_year(year: i32) -> i32 {
    if year > 70 {
        1900 + year
    } else {
        2000 + year
    }
}
