//! API request/response types

pub mod alert;
pub mod predict;
pub mod weather;
