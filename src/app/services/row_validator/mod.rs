//! Row validation against canonical schemas
//!
//! Splits raw rows into [`Record`](crate::app::models::Record)s that map
//! exactly onto the table's canonical schema and `ProblematicRow`
//! diagnostics for everything else.

pub mod validator;

#[cfg(test)]
mod tests;

pub use validator::{RowValidator, ValidationOutcome};
