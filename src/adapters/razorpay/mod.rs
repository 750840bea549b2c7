//! Razorpay gateway adapter.

mod client;
mod types;

pub use client::{RazorpayClient, RazorpayConfig};
