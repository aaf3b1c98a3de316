//! Bookkeeping Service - multi-tenant double-entry ledger with reports.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
