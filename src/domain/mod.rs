//! Domain layer: the payment record, its value objects and the storage ports.

pub mod evidence;
pub mod money;
pub mod payment;
pub mod ports;
