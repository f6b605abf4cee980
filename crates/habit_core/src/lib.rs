pub mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod model;
pub mod plan_api;
pub mod progress;
pub mod storage;
