//! Social media identity verification service

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

/// Proof request lifecycle
pub mod coordinator;

/// Supported platforms and their provider templates
pub mod platform;

/// Proof payloads reported by the collaborator
pub mod proof;

/// Proof collaborator boundary and gateway adapter
pub mod provider;

/// Profile link and proof matching
pub mod reconciler;

/// HTTP routes
pub mod routes;

/// HTTP server
pub mod server;

/// Messenger share links
pub mod share;

/// Shared API types
pub mod types;
