//! Infrastructure: providers, template storage and the HTTP API

pub mod config;
pub mod email;
pub mod http;
pub mod templates;
