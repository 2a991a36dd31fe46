//! HTTP surface of the admin API
//!
//! This module is responsible for:
//! - Defining one route group per admin resource
//! - Gating every resource route behind the admin check
//! - Providing API documentation through the index endpoint

/// Admin gate middleware
pub mod auth;

/// Route handlers for the admin resources
pub mod handlers;

/// API documentation and index endpoint
pub mod index;

/// Router initialization and configuration
pub mod init;

pub use init::initialize_router;
