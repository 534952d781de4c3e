//! Schema checking tests, one module per operation.

pub mod modify;
pub mod search;
