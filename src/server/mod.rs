//! HTTP surface

pub mod api;
pub mod openapi;
