pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod provider;
pub mod resolver;
pub mod scheduler;
pub mod tasks;
