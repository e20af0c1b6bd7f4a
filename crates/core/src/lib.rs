//! Core business logic for Khata.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `calendar` - Bikram Sambat conversion, dual dates, fiscal years
//! - `finance` - VAT, TDS, discounts and invoice totals
//! - `sequence` - Document number allocation with conflict retry
//! - `ledger` - Double-entry bookkeeping logic
//! - `store` - Persistence traits and an in-memory store
//! - `posting` - The posting engine tying it all together

pub mod calendar;
pub mod finance;
pub mod ledger;
pub mod posting;
pub mod sequence;
pub mod store;
