//! HTTP request handlers

pub mod alerts;
pub mod health;
pub mod model;
pub mod predict;
pub mod weather;
