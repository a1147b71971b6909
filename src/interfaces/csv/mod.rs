//! CSV codecs for bulk import and listing output.

pub mod payment_reader;
pub mod payment_writer;
