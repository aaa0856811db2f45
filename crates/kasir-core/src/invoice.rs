//! # Invoice Numbers
//!
//! `INV-<YYYYMMDD>-<seq>`: the business date followed by that day's sequence
//! value, zero-padded to at least four digits.
//!
//! ```text
//!   INV-20260117-0001    first sale of 17 Jan 2026
//!   INV-20260117-0042    forty-second
//!   INV-20260117-12345   past 9999 the field simply widens
//! ```
//!
//! The sequence itself is issued by the database (one counter row per
//! business date, bumped inside the sale transaction); this module only
//! formats and parses.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::ValidationError;

const PREFIX: &str = "INV";
const DATE_FORMAT: &str = "%Y%m%d";

/// Key under which a business date's counter is stored.
pub const BUSINESS_DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A parsed invoice number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvoiceNumber {
    pub business_date: NaiveDate,
    pub sequence: u32,
}

impl InvoiceNumber {
    pub fn new(business_date: NaiveDate, sequence: u32) -> Self {
        InvoiceNumber {
            business_date,
            sequence,
        }
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:04}",
            PREFIX,
            self.business_date.format(DATE_FORMAT),
            self.sequence
        )
    }
}

impl FromStr for InvoiceNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "invoice_number".to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.trim().splitn(3, '-');
        let (Some(prefix), Some(date), Some(seq)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid("expected INV-YYYYMMDD-NNNN"));
        };

        if prefix != PREFIX {
            return Err(invalid("must start with INV"));
        }

        let business_date =
            NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid("bad date"))?;

        if seq.len() < 4 || !seq.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("sequence must be at least four digits"));
        }
        let sequence = seq.parse::<u32>().map_err(|_| invalid("sequence out of range"))?;

        Ok(InvoiceNumber::new(business_date, sequence))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
