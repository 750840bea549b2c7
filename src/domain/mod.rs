//! Domain layer: pure types and rules, no I/O.

pub mod enrollment;
pub mod foundation;
pub mod payment;
