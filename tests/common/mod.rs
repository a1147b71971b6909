#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use payledger::domain::payment::PaymentInput;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const CSV_HEADER: [&str; 17] = [
    "payee_first_name",
    "payee_last_name",
    "payee_payment_status",
    "payee_added_date_utc",
    "payee_due_date",
    "payee_address_line_1",
    "payee_address_line_2",
    "payee_city",
    "payee_country",
    "payee_province_or_state",
    "payee_postal_code",
    "payee_phone_number",
    "payee_email",
    "currency",
    "discount_percent",
    "tax_percent",
    "due_amount",
];

pub fn payment_input(first: &str, last: &str) -> PaymentInput {
    PaymentInput {
        payee_first_name: first.to_string(),
        payee_last_name: last.to_string(),
        payee_payment_status: "due".to_string(),
        payee_added_date_utc: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        payee_due_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        payee_address_line_1: "1 Main St".to_string(),
        payee_address_line_2: None,
        payee_city: "Toronto".to_string(),
        payee_country: "Canada".to_string(),
        payee_province_or_state: Some("ON".to_string()),
        payee_postal_code: "M5V 2T6".to_string(),
        payee_phone_number: "+1 416 555 0100".to_string(),
        payee_email: "payee@example.com".to_string(),
        currency: "CAD".to_string(),
        discount_percent: Some(dec!(10)),
        tax_percent: Some(dec!(5)),
        due_amount: dec!(100),
    }
}

pub fn with_amount(mut input: PaymentInput, due: Decimal) -> PaymentInput {
    input.due_amount = due;
    input
}

/// One CSV row for `(first, last, status, due_amount)` with the remaining columns filled in.
pub fn csv_row(first: &str, last: &str, status: &str, due_amount: &str) -> Vec<String> {
    [
        first,
        last,
        status,
        "2024-05-01T12:00:00Z",
        "2024-06-01",
        "1 Main St",
        "",
        "Toronto",
        "Canada",
        "ON",
        "M5V 2T6",
        "555-0100",
        "payee@example.com",
        "CAD",
        "10",
        "5",
        due_amount,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn write_payments_csv(path: &Path, rows: &[Vec<String>]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(CSV_HEADER)?;
    for row in rows {
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}
