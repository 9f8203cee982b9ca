//! # Web Middleware
//!
//! Token authentication and request correlation for the API router.

pub mod auth;
pub mod request_id;
