//! HTTP surface for payment settlement.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CreateOrderRequest, OrderErrorResponse, VerifyErrorResponse, VerifyPaymentRequest,
    VerifySuccessResponse,
};
pub use handlers::{health, PaymentsAppState};
pub use routes::payments_routes;
