//! Dayone
//!
//! Dayone is a pricing calculator: it spreads an overall discount across a
//! list of line items in proportion to their value and reconciles the result
//! into a final price.

pub mod allocation;
pub mod config;
pub mod fixtures;
pub mod form;
pub mod items;
pub mod logging;
pub mod pricing;
pub mod receipt;
