//! Coursegate - Payment Settlement Gate
//!
//! Accepts a claim that a payment succeeded at the gateway, proves the claim
//! against the shared signing secret, and grants the purchased course
//! enrollment exactly once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
