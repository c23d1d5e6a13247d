//! # Taskboard API Server Library
//!
//! Multi-user project and task tracking over a JSON REST API.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request extractors with JSON rejections
//! - `middleware`: Authentication and security headers
//! - `routes`: API route handlers
//! - `services`: Access rules and business logic

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
