//! Ports: trait boundaries between the application core and its collaborators.

mod enrollment_store;
mod payment_gateway;

pub use enrollment_store::{EnrollmentStore, InsertOutcome, StoreError};
pub use payment_gateway::{GatewayError, GatewayOrder, PaymentGateway};
