use crate::domain::evidence::{Evidence, EvidenceMediaType, evidence_key};
use crate::domain::money::{DueAmount, total_due};
use crate::domain::payment::{
    Payment, PaymentChanges, PaymentFilter, PaymentId, PaymentInput, PaymentPage, PaymentPatch,
    PaymentStatus,
};
use crate::domain::ports::{EvidenceStoreBox, PaymentStoreBox};
use crate::error::{LedgerError, Result};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Owns the business rules for payment records.
///
/// Validation and the total-due computation happen here; persistence is delegated
/// to the injected [`PaymentStore`](crate::domain::ports::PaymentStore) and
/// [`EvidenceStore`](crate::domain::ports::EvidenceStore).
pub struct PaymentLedger {
    payments: PaymentStoreBox,
    evidence: EvidenceStoreBox,
    allowed_statuses: Option<HashSet<String>>,
}

impl PaymentLedger {
    pub fn new(payments: PaymentStoreBox, evidence: EvidenceStoreBox) -> Self {
        Self {
            payments,
            evidence,
            allowed_statuses: None,
        }
    }

    /// Restricts statuses accepted by `create` and `update` to the given set.
    /// An empty set leaves statuses unrestricted.
    pub fn with_allowed_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = statuses.into_iter().map(Into::into).collect();
        self.allowed_statuses = (!set.is_empty()).then_some(set);
        self
    }

    fn check_status(&self, status: &PaymentStatus) -> Result<()> {
        match &self.allowed_statuses {
            Some(allowed) if !allowed.contains(status.as_str()) => {
                let mut known: Vec<&str> = allowed.iter().map(String::as_str).collect();
                known.sort_unstable();
                Err(LedgerError::ValidationError(format!(
                    "Unknown payment status '{status}', expected one of: {}",
                    known.join(", ")
                )))
            }
            _ => Ok(()),
        }
    }

    /// Validates the input, computes `total_due` and stores a new record.
    pub async fn create(&self, input: PaymentInput) -> Result<Payment> {
        let payment = Payment::from_input(input)?;
        self.check_status(&payment.payee_payment_status)?;

        self.payments.insert(payment.clone()).await?;
        info!(id = %payment.id, total_due = %payment.total_due, "Payment created");
        Ok(payment)
    }

    /// Creates each input independently; one failure does not stop the rest.
    pub async fn create_many<I>(&self, inputs: I) -> Vec<Result<Payment>>
    where
        I: IntoIterator<Item = PaymentInput>,
    {
        let mut results = Vec::new();
        for input in inputs {
            results.push(self.create(input).await);
        }
        results
    }

    pub async fn get(&self, id: &PaymentId) -> Result<Payment> {
        self.payments
            .get(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Returns page `page` (1-based) of the records matching `filter`.
    pub async fn list(
        &self,
        filter: &PaymentFilter,
        page: usize,
        page_size: usize,
    ) -> Result<PaymentPage> {
        if page == 0 || page_size == 0 {
            return Err(LedgerError::ValidationError(
                "page and page_size must both be at least 1".to_string(),
            ));
        }
        let skip = (page - 1).saturating_mul(page_size);
        let data = self.payments.find(filter, skip, page_size).await?;
        let total = self.payments.count(filter).await?;
        debug!(?filter, page, page_size, total, "Listed payments");

        Ok(PaymentPage {
            data,
            total,
            page,
            page_size,
        })
    }

    /// Applies the supplied fields of `patch`.
    ///
    /// Moving to `completed` requires the stored record to already carry evidence.
    /// A new `due_amount` recomputes `total_due` with the stored discount and tax.
    pub async fn update(&self, id: &PaymentId, patch: PaymentPatch) -> Result<()> {
        let current = self.get(id).await?;

        let status = patch
            .payee_payment_status
            .map(PaymentStatus::new)
            .transpose()?;
        if let Some(status) = &status {
            self.check_status(status)?;
            if status.is_completed() && !current.has_evidence() {
                warn!(%id, "Rejected completion without evidence");
                return Err(LedgerError::InvalidTransition(format!(
                    "Payment {id} cannot be marked {} without evidence upload",
                    PaymentStatus::COMPLETED
                )));
            }
        }

        let mut changes = PaymentChanges {
            payee_due_date: patch.payee_due_date,
            payee_payment_status: status,
            ..PaymentChanges::default()
        };
        if let Some(amount) = patch.due_amount {
            let due = DueAmount::new(amount)?;
            changes.due_amount = Some(due);
            changes.total_due = Some(total_due(
                due,
                current.discount_percent,
                current.tax_percent,
            )?);
        }

        if !self.payments.update(id, changes).await? {
            return Err(not_found(id));
        }
        info!(%id, "Payment updated");
        Ok(())
    }

    pub async fn delete(&self, id: &PaymentId) -> Result<()> {
        if !self.payments.delete(id).await? {
            return Err(not_found(id));
        }
        info!(%id, "Payment deleted");
        Ok(())
    }

    /// Stores an evidence file for the payment and records its location.
    ///
    /// The content type is checked before anything is written. The record must
    /// exist before the blob is stored.
    pub async fn attach_evidence(
        &self,
        id: &PaymentId,
        file_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String> {
        let media_type: EvidenceMediaType = content_type.parse()?;
        let key = evidence_key(id, file_name)?;

        if self.payments.get(id).await?.is_none() {
            return Err(not_found(id));
        }

        let location = self.evidence.put(&key, bytes).await?;
        if !self
            .payments
            .update(id, PaymentChanges::evidence(location.clone()))
            .await?
        {
            return Err(not_found(id));
        }

        info!(%id, %media_type, path = %location, size = bytes.len(), "Evidence stored");
        Ok(location)
    }

    /// Returns the evidence recorded on the payment.
    pub async fn fetch_evidence(&self, id: &PaymentId) -> Result<Evidence> {
        let payment = self.get(id).await?;
        let path = payment
            .evidence_file
            .filter(|p| !p.is_empty())
            .ok_or_else(|| LedgerError::NotFound(format!("Evidence for payment {id}")))?;

        let bytes = self
            .evidence
            .get(&path)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("Evidence file {path}")))?;
        Ok(Evidence { path, bytes })
    }
}

fn not_found(id: &PaymentId) -> LedgerError {
    LedgerError::NotFound(format!("Payment {id}"))
}
