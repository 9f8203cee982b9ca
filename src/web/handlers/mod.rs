//! # Web API Request Handlers
//!
//! HTTP request handlers organized by functional area.

pub mod admin;
pub mod auth;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod short_links;
pub mod subscriptions;
pub mod tags;
pub mod users;
