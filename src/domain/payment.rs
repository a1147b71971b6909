use super::money::{DueAmount, Percent, total_due};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier assigned to a payment when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for PaymentId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| LedgerError::ValidationError(format!("Invalid payment id '{s}': {e}")))
    }
}

/// Payment status as text. The set of valid values belongs to the caller;
/// only [`PaymentStatus::COMPLETED`] carries a rule of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentStatus(String);

impl PaymentStatus {
    pub const COMPLETED: &'static str = "completed";

    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(LedgerError::ValidationError(
                "payee_payment_status must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_completed(&self) -> bool {
        self.0 == Self::COMPLETED
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PaymentStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Caller-supplied fields for a new payment, before validation.
///
/// Amounts accept JSON numbers as well as strings and keep every digit.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PaymentInput {
    pub payee_first_name: String,
    pub payee_last_name: String,
    pub payee_payment_status: String,
    pub payee_added_date_utc: DateTime<Utc>,
    pub payee_due_date: NaiveDate,
    pub payee_address_line_1: String,
    #[serde(default)]
    pub payee_address_line_2: Option<String>,
    pub payee_city: String,
    pub payee_country: String,
    #[serde(default)]
    pub payee_province_or_state: Option<String>,
    pub payee_postal_code: String,
    pub payee_phone_number: String,
    pub payee_email: String,
    pub currency: String,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub discount_percent: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub tax_percent: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub due_amount: Decimal,
}

/// A stored payment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub payee_first_name: String,
    pub payee_last_name: String,
    pub payee_payment_status: PaymentStatus,
    pub payee_added_date_utc: DateTime<Utc>,
    pub payee_due_date: NaiveDate,
    pub payee_address_line_1: String,
    pub payee_address_line_2: Option<String>,
    pub payee_city: String,
    pub payee_country: String,
    pub payee_province_or_state: Option<String>,
    pub payee_postal_code: String,
    pub payee_phone_number: String,
    pub payee_email: String,
    pub currency: String,
    pub discount_percent: Percent,
    pub tax_percent: Percent,
    pub due_amount: DueAmount,
    /// Always `total_due(due_amount, discount_percent, tax_percent)`.
    pub total_due: Decimal,
    pub evidence_file: Option<String>,
}

impl Payment {
    /// Validates the input and builds a new record with a fresh id and computed total.
    pub fn from_input(input: PaymentInput) -> Result<Self> {
        let required = [
            ("payee_first_name", &input.payee_first_name),
            ("payee_last_name", &input.payee_last_name),
            ("payee_address_line_1", &input.payee_address_line_1),
            ("payee_city", &input.payee_city),
            ("payee_country", &input.payee_country),
            ("payee_postal_code", &input.payee_postal_code),
            ("payee_phone_number", &input.payee_phone_number),
            ("payee_email", &input.payee_email),
            ("currency", &input.currency),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(LedgerError::ValidationError(format!(
                    "{field} must not be empty"
                )));
            }
        }
        validate_email(&input.payee_email)?;

        let status = PaymentStatus::new(input.payee_payment_status)?;
        let discount = input
            .discount_percent
            .map(Percent::new)
            .transpose()?
            .unwrap_or_default();
        let tax = input
            .tax_percent
            .map(Percent::new)
            .transpose()?
            .unwrap_or_default();
        let due = DueAmount::new(input.due_amount)?;
        let total = total_due(due, discount, tax)?;

        Ok(Self {
            id: PaymentId::generate(),
            payee_first_name: input.payee_first_name,
            payee_last_name: input.payee_last_name,
            payee_payment_status: status,
            payee_added_date_utc: input.payee_added_date_utc,
            payee_due_date: input.payee_due_date,
            payee_address_line_1: input.payee_address_line_1,
            payee_address_line_2: non_blank(input.payee_address_line_2),
            payee_city: input.payee_city,
            payee_country: input.payee_country,
            payee_province_or_state: non_blank(input.payee_province_or_state),
            payee_postal_code: input.payee_postal_code,
            payee_phone_number: input.payee_phone_number,
            payee_email: input.payee_email,
            currency: input.currency,
            discount_percent: discount,
            tax_percent: tax,
            due_amount: due,
            total_due: total,
            evidence_file: None,
        })
    }

    pub fn has_evidence(&self) -> bool {
        self.evidence_file
            .as_deref()
            .is_some_and(|path| !path.is_empty())
    }

    /// Applies a set of field changes in place. Absent fields are left untouched.
    pub fn apply(&mut self, changes: PaymentChanges) {
        if let Some(date) = changes.payee_due_date {
            self.payee_due_date = date;
        }
        if let Some(amount) = changes.due_amount {
            self.due_amount = amount;
        }
        if let Some(total) = changes.total_due {
            self.total_due = total;
        }
        if let Some(status) = changes.payee_payment_status {
            self.payee_payment_status = status;
        }
        if let Some(path) = changes.evidence_file {
            self.evidence_file = Some(path);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Minimal syntactic check: `local@domain.tld`, no whitespace.
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || LedgerError::ValidationError(format!("Invalid email address '{email}'"));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Caller-facing partial update. Discount and tax are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PaymentPatch {
    #[serde(default)]
    pub payee_due_date: Option<NaiveDate>,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub due_amount: Option<Decimal>,
    #[serde(default)]
    pub payee_payment_status: Option<String>,
}

impl PaymentPatch {
    pub fn is_empty(&self) -> bool {
        self.payee_due_date.is_none()
            && self.due_amount.is_none()
            && self.payee_payment_status.is_none()
    }
}

/// Validated field changes handed to a [`PaymentStore`](super::ports::PaymentStore).
///
/// Carries the derived `total_due` alongside `due_amount`, and the evidence path
/// set by an upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentChanges {
    pub payee_due_date: Option<NaiveDate>,
    pub due_amount: Option<DueAmount>,
    pub total_due: Option<Decimal>,
    pub payee_payment_status: Option<PaymentStatus>,
    pub evidence_file: Option<String>,
}

impl PaymentChanges {
    pub fn evidence(path: impl Into<String>) -> Self {
        Self {
            evidence_file: Some(path.into()),
            ..Self::default()
        }
    }
}

/// Listing filter. Both criteria, when present, must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilter {
    /// Exact match on `payee_payment_status`.
    pub status: Option<String>,
    /// Case-insensitive substring of first or last name.
    pub search: Option<String>,
}

impl PaymentFilter {
    pub fn new(status: Option<String>, search: Option<String>) -> Self {
        Self {
            status: status.filter(|s| !s.is_empty()),
            search: search.filter(|s| !s.is_empty()),
        }
    }

    pub fn matches(&self, payment: &Payment) -> bool {
        if let Some(status) = &self.status
            && payment.payee_payment_status.as_str() != status.as_str()
        {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            return payment.payee_first_name.to_lowercase().contains(&needle)
                || payment.payee_last_name.to_lowercase().contains(&needle);
        }
        true
    }
}

/// One page of a listing plus the number of records matching the filter overall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentPage {
    pub data: Vec<Payment>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}
