//! Configuration and result types.

pub mod activity;
pub mod http;
pub mod result;
