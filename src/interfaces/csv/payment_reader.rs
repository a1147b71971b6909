use crate::domain::payment::PaymentInput;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One CSV row. Amount columns are parsed from their text so that no digits
/// pass through a float on the way in.
#[derive(Debug, Deserialize)]
struct PaymentRecord {
    payee_first_name: String,
    payee_last_name: String,
    payee_payment_status: String,
    payee_added_date_utc: DateTime<Utc>,
    payee_due_date: NaiveDate,
    payee_address_line_1: String,
    #[serde(default)]
    payee_address_line_2: Option<String>,
    payee_city: String,
    payee_country: String,
    #[serde(default)]
    payee_province_or_state: Option<String>,
    payee_postal_code: String,
    payee_phone_number: String,
    payee_email: String,
    currency: String,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    discount_percent: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    tax_percent: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    due_amount: Decimal,
}

impl From<PaymentRecord> for PaymentInput {
    fn from(record: PaymentRecord) -> Self {
        Self {
            payee_first_name: record.payee_first_name,
            payee_last_name: record.payee_last_name,
            payee_payment_status: record.payee_payment_status,
            payee_added_date_utc: record.payee_added_date_utc,
            payee_due_date: record.payee_due_date,
            payee_address_line_1: record.payee_address_line_1,
            payee_address_line_2: record.payee_address_line_2,
            payee_city: record.payee_city,
            payee_country: record.payee_country,
            payee_province_or_state: record.payee_province_or_state,
            payee_postal_code: record.payee_postal_code,
            payee_phone_number: record.payee_phone_number,
            payee_email: record.payee_email,
            currency: record.currency,
            discount_percent: record.discount_percent,
            tax_percent: record.tax_percent,
            due_amount: record.due_amount,
        }
    }
}

/// Reads payment inputs from a CSV source for bulk import.
///
/// The header row names the `PaymentInput` fields. Optional columns may be left
/// empty or omitted entirely.
pub struct PaymentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentReader<R> {
    /// Creates a new `PaymentReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes rows.
    pub fn payments(self) -> impl Iterator<Item = Result<PaymentInput>> {
        self.reader
            .into_deserialize::<PaymentRecord>()
            .map(|result| result.map(PaymentInput::from).map_err(LedgerError::from))
    }
}
