use crate::domain::payment::{Payment, PaymentChanges, PaymentFilter, PaymentId};
use crate::domain::ports::{EvidenceStore, PaymentStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for payment records.
///
/// Records are kept in insertion order, which is the natural order used by
/// listings. Ideal for testing or single-run imports.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<Vec<Payment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.push(payment);
        Ok(())
    }

    async fn get(&self, id: &PaymentId) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.iter().find(|p| &p.id == id).cloned())
    }

    async fn find(
        &self,
        filter: &PaymentFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .iter()
            .filter(|p| filter.matches(p))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &PaymentFilter) -> Result<usize> {
        let payments = self.payments.read().await;
        Ok(payments.iter().filter(|p| filter.matches(p)).count())
    }

    async fn update(&self, id: &PaymentId, changes: PaymentChanges) -> Result<bool> {
        let mut payments = self.payments.write().await;
        match payments.iter_mut().find(|p| &p.id == id) {
            Some(payment) => {
                payment.apply(changes);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &PaymentId) -> Result<bool> {
        let mut payments = self.payments.write().await;
        match payments.iter().position(|p| &p.id == id) {
            Some(index) => {
                payments.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// A thread-safe in-memory blob store for evidence files.
///
/// The location returned by `put` is the key itself.
#[derive(Default, Clone)]
pub struct InMemoryEvidenceStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryEvidenceStore {
    /// Creates a new, empty in-memory evidence store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently held.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl EvidenceStore for InMemoryEvidenceStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String> {
        let mut blobs = self.blobs.write().await;
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(key.to_string())
    }

    async fn get(&self, location: &str) -> Result<Option<Vec<u8>>> {
        let blobs = self.blobs.read().await;
        Ok(blobs.get(location).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::tests::sample_input;
    use rust_decimal_macros::dec;

    fn payment(first: &str, last: &str) -> Payment {
        Payment::from_input(sample_input(first, last)).unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_payment_store() {
        let store = InMemoryPaymentStore::new();
        let p = payment("Jane", "Smith");

        store.insert(p.clone()).await.unwrap();
        let retrieved = store.get(&p.id).await.unwrap().unwrap();
        assert_eq!(retrieved, p);

        assert!(store.get(&PaymentId::generate()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_keeps_insertion_order_and_paginates() {
        let store = InMemoryPaymentStore::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            let p = payment(&format!("Payee{i}"), "Doe");
            ids.push(p.id);
            store.insert(p).await.unwrap();
        }

        let filter = PaymentFilter::default();
        let page: Vec<PaymentId> = store
            .find(&filter, 2, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(page, ids[2..4].to_vec());
        assert_eq!(store.count(&filter).await.unwrap(), 5);
        assert!(store.find(&filter, 10, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing() {
        let store = InMemoryPaymentStore::new();
        let p = payment("Jane", "Smith");
        store.insert(p.clone()).await.unwrap();

        let changes = PaymentChanges {
            total_due: Some(dec!(1.00)),
            ..Default::default()
        };
        assert!(store.update(&p.id, changes.clone()).await.unwrap());
        assert_eq!(
            store.get(&p.id).await.unwrap().unwrap().total_due,
            dec!(1.00)
        );

        assert!(store.delete(&p.id).await.unwrap());
        assert!(!store.delete(&p.id).await.unwrap());
        assert!(!store.update(&p.id, changes).await.unwrap());
    }

    #[tokio::test]
    async fn test_in_memory_evidence_store() {
        let store = InMemoryEvidenceStore::new();
        assert!(store.is_empty().await);

        let location = store.put("abc_r.pdf", b"one").await.unwrap();
        store.put("abc_r.pdf", b"two").await.unwrap();
        store.put("abc_s.pdf", b"three").await.unwrap();

        assert_eq!(store.get(&location).await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.len().await, 2);
        assert!(store.get("missing").await.unwrap().is_none());
    }
}
