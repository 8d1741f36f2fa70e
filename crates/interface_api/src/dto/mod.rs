//! Request/response bodies that are not domain views

pub mod auth;
pub mod monitoring;
