// Shared components
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Platform clients
pub mod firestore;
pub mod platform;
pub mod push;

// Relay logic
pub mod relay;

// Application layer
pub mod api;
pub mod server;
pub mod triggers;
