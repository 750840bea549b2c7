//! Application layer: command handlers orchestrating domain logic over ports.

mod issue_order;
mod verify_and_enroll;

pub use issue_order::{IssueOrderCommand, IssueOrderError, IssueOrderHandler};
pub use verify_and_enroll::{
    EnrollError, EnrollOutcome, VerifyAndEnrollCommand, VerifyAndEnrollHandler,
};
