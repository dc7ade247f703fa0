// Configuration loading
pub mod config;

// Shared pet state, decay scheduler and fan-out
pub mod state;

// Plain-text rendering of the pet
pub mod view;

// HTTP and WebSocket APIs
pub mod api;

// Player sessions
pub mod subscription;
