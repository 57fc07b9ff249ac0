//! Column layouts such as `Date,Desc,Amount` or
//! `Date,Junk,Desc,PaidIn,PaidOut,Balance`.

use rust_decimal::Decimal;

use crate::error::InputFormatError;

/// What a CSV column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Transaction date.
    Date,
    /// Description.
    Desc,
    /// Signed amount, negative for money going out.
    Amount,
    /// Money coming in.
    PaidIn,
    /// Money going out.
    PaidOut,
    /// Running balance (read past).
    Balance,
    /// Anything else.
    Junk,
}

impl Column {
    /// Case-insensitive lookup; unknown names are [`Column::Junk`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "date" => Self::Date,
            "desc" => Self::Desc,
            "amount" => Self::Amount,
            "paidin" => Self::PaidIn,
            "paidout" => Self::PaidOut,
            "balance" => Self::Balance,
            _ => Self::Junk,
        }
    }
}

/// Where the amount comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumns {
    /// One signed column.
    Signed(usize),
    /// Separate in and out columns.
    Split {
        /// The paid-in column.
        paid_in: usize,
        /// The paid-out column.
        paid_out: usize,
    },
}

/// The columns of a bank export, resolved to field offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<Column>,
    date: usize,
    desc: usize,
    amount: AmountColumns,
}

impl ColumnLayout {
    /// Parse a layout template split on `delimiter`.
    ///
    /// `Date` and `Desc` are required, plus `Amount` or both `PaidIn` and
    /// `PaidOut`. When both are given, `Amount` wins.
    pub fn parse(template: &str, delimiter: char) -> Result<Self, InputFormatError> {
        let columns: Vec<Column> = template.split(delimiter).map(Column::from_name).collect();
        let find = |wanted: Column| columns.iter().position(|&c| c == wanted);

        let missing = |what: &str| {
            InputFormatError::InvalidLayout(format!("'{template}' has no {what} column"))
        };
        let date = find(Column::Date).ok_or_else(|| missing("Date"))?;
        let desc = find(Column::Desc).ok_or_else(|| missing("Desc"))?;
        let amount = match (find(Column::Amount), find(Column::PaidIn), find(Column::PaidOut)) {
            (Some(index), ..) => AmountColumns::Signed(index),
            (None, Some(paid_in), Some(paid_out)) => AmountColumns::Split { paid_in, paid_out },
            _ => return Err(missing("Amount (or PaidIn and PaidOut)")),
        };

        Ok(Self {
            columns,
            date,
            desc,
            amount,
        })
    }

    /// Number of columns a row must have.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false: a valid layout has at least a date and a description.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The column kinds in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Offset of the date column.
    pub const fn date(&self) -> usize {
        self.date
    }

    /// Offset of the description column.
    pub const fn desc(&self) -> usize {
        self.desc
    }

    /// Where the amount comes from.
    pub const fn amount(&self) -> AmountColumns {
        self.amount
    }

    /// Read the signed amount from a row's fields.
    ///
    /// With split columns an empty field counts as nothing; a non-empty
    /// paid-out field overrides paid-in as its negation. Returns the
    /// offending raw field on failure.
    pub fn read_amount<'a>(&self, fields: &[&'a str]) -> Result<Decimal, &'a str> {
        match self.amount {
            AmountColumns::Signed(index) => {
                let raw = fields[index];
                parse_money_string(raw).ok_or(raw)
            }
            AmountColumns::Split { paid_in, paid_out } => {
                let mut amount = Decimal::ZERO;
                let raw_in = fields[paid_in];
                if !raw_in.trim().is_empty() {
                    amount = parse_money_string(raw_in).ok_or(raw_in)?;
                }
                let raw_out = fields[paid_out];
                if !raw_out.trim().is_empty() {
                    amount = -parse_money_string(raw_out).ok_or(raw_out)?;
                }
                Ok(amount)
            }
        }
    }
}

const CURRENCY_SYMBOLS: [char; 4] = ['£', '$', '€', '¥'];

/// Parse a money string, handling currency symbols, thousands separators
/// and parentheses for negatives.
///
/// Anything else around the digits makes the string invalid. Commas are
/// only accepted between groups of three integer digits.
pub fn parse_money_string(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (parenthesized, s) = match s.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };

    let s = strip_currency(s);
    let (signed, negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, true, &s[1..]),
        Some(b'+') => (true, false, &s[1..]),
        _ => (false, false, s),
    };
    if parenthesized && signed {
        return None;
    }
    let s = strip_currency(s);

    let (integer, fraction) = s.split_once('.').unwrap_or((s, ""));
    let integer = strip_thousands(integer)?;
    if !fraction.bytes().all(|b| b.is_ascii_digit()) || (integer.is_empty() && fraction.is_empty())
    {
        return None;
    }

    let sign = if negative || parenthesized { "-" } else { "" };
    let integer = if integer.is_empty() { "0" } else { integer.as_str() };
    let number = if fraction.is_empty() {
        format!("{sign}{integer}")
    } else {
        format!("{sign}{integer}.{fraction}")
    };
    number.parse().ok()
}

fn strip_currency(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || CURRENCY_SYMBOLS.contains(&c))
}

/// The integer digits with `,` group separators removed.
fn strip_thousands(integer: &str) -> Option<String> {
    let mut groups = integer.split(',');
    let first = groups.next().unwrap_or_default();
    if integer.contains(',') && !(1..=3).contains(&first.len()) {
        return None;
    }

    let mut digits = first.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        digits.push_str(group);
    }
    digits.bytes().all(|b| b.is_ascii_digit()).then_some(digits)
}
