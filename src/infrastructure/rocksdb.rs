use crate::domain::payment::{Payment, PaymentChanges, PaymentFilter, PaymentId};
use crate::domain::ports::PaymentStore;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing payment records.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent payment store implementation using RocksDB.
///
/// Records live in their own Column Family, keyed by the 16 id bytes, with JSON
/// values. Listings follow key order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "payments" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn payments_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_PAYMENTS).ok_or_else(|| {
            LedgerError::InternalError(Box::new(std::io::Error::other(
                "Payments column family not found",
            )))
        })
    }

    fn read(&self, id: &PaymentId) -> Result<Option<Payment>> {
        let cf = self.payments_cf()?;
        match self.db.get_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, payment: &Payment) -> Result<()> {
        let cf = self.payments_cf()?;
        let value = serde_json::to_vec(payment)?;
        self.db.put_cf(cf, payment.id.as_bytes(), value)?;
        Ok(())
    }

    /// Every record matching `filter`, in key order.
    fn scan<'a>(
        &'a self,
        filter: &'a PaymentFilter,
    ) -> Result<impl Iterator<Item = Result<Payment>> + 'a> {
        let cf = self.payments_cf()?;
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::Start)
            .map(|item| -> Result<Payment> {
                let (_key, value) = item?;
                Ok(serde_json::from_slice::<Payment>(&value)?)
            })
            .filter(move |result: &Result<Payment>| match result {
                Ok(payment) => filter.matches(payment),
                Err(_) => true,
            });
        Ok(iter)
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn insert(&self, payment: Payment) -> Result<()> {
        self.write(&payment)
    }

    async fn get(&self, id: &PaymentId) -> Result<Option<Payment>> {
        self.read(id)
    }

    async fn find(
        &self,
        filter: &PaymentFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Payment>> {
        self.scan(filter)?.skip(skip).take(limit).collect()
    }

    async fn count(&self, filter: &PaymentFilter) -> Result<usize> {
        let mut total = 0;
        for payment in self.scan(filter)? {
            payment?;
            total += 1;
        }
        Ok(total)
    }

    async fn update(&self, id: &PaymentId, changes: PaymentChanges) -> Result<bool> {
        let Some(mut payment) = self.read(id)? else {
            return Ok(false);
        };
        payment.apply(changes);
        self.write(&payment)?;
        Ok(true)
    }

    async fn delete(&self, id: &PaymentId) -> Result<bool> {
        let cf = self.payments_cf()?;
        // delete_cf succeeds on absent keys, so a miss has to be detected up front.
        if self.db.get_pinned_cf(cf, id.as_bytes())?.is_none() {
            return Ok(false);
        }
        self.db.delete_cf(cf, id.as_bytes())?;
        Ok(true)
    }
}
