pub mod api;
pub mod app_state;
pub mod config;
pub mod entities;
pub mod extractor;
pub mod fetcher;
pub mod health;
pub mod ingest;
pub mod middleware;
pub mod repositories;
pub mod scoring;
pub mod telemetry;
