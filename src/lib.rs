//! Paper-trading core: virtual cash ledger, live quote resolution, trade
//! execution with cost-basis tracking, and portfolio valuation, exposed over a
//! small HTTP API.

pub mod api;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod portfolio;
pub mod pricing;
pub mod quotes;
pub mod types;
