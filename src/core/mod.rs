//! Dispatch core: registry, model pool, engines and the translation dispatcher

pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod pool;
pub mod registry;
pub mod translator;
