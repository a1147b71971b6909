use super::payment::{Payment, PaymentChanges, PaymentFilter, PaymentId};
use crate::error::Result;
use async_trait::async_trait;

/// Keyed collection of payment records.
///
/// Each single-record write is atomic from the caller's point of view; nothing
/// spans more than one call.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: &PaymentId) -> Result<Option<Payment>>;
    /// Matching records in the store's natural order, after skipping `skip` and
    /// returning at most `limit`.
    async fn find(&self, filter: &PaymentFilter, skip: usize, limit: usize)
    -> Result<Vec<Payment>>;
    async fn count(&self, filter: &PaymentFilter) -> Result<usize>;
    /// Returns `false` when no record has this id.
    async fn update(&self, id: &PaymentId, changes: PaymentChanges) -> Result<bool>;
    /// Returns `false` when no record has this id.
    async fn delete(&self, id: &PaymentId) -> Result<bool>;
}

/// Blob storage for evidence files, keyed by a derived name.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Writes the whole blob under `key`, replacing any previous content, and
    /// returns the location to record on the payment.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String>;
    /// Reads a blob by the location returned from [`EvidenceStore::put`].
    async fn get(&self, location: &str) -> Result<Option<Vec<u8>>>;
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type EvidenceStoreBox = Box<dyn EvidenceStore>;

pub type PaymentStoreFactory = Box<dyn Fn() -> PaymentStoreBox + Send + Sync>;
