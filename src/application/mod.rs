//! Application layer containing the payment ledger.
//!
//! `PaymentLedger` is the single entry point for payment operations. It enforces
//! validation, the total-due formula and the completion guard, and talks to
//! storage only through the ports in [`crate::domain::ports`].

pub mod ledger;
