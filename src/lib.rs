//! Object-detection relay bot
//!
//! Receives Telegram webhook updates, uploads photos to S3-compatible storage,
//! queues detection jobs on Redis, and reports detection summaries back to the
//! originating chat once the detection worker has stored them.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
