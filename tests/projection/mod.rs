//! Response shaping tests.

pub mod properties;
