//! # Repository Implementations
//!
//! One repository per aggregate. Reads run on the pool; writes that belong to
//! a sale or shift transaction are `*_tx` functions on the caller's
//! connection.

pub mod customer;
pub mod location;
pub mod product;
pub mod sale;
pub mod shift;
pub mod stock;
