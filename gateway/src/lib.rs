//! # Evently Gateway
//!
//! Reqwest implementation of the Evently remote gateway.
//!
//! All network traffic for the client goes through [`HttpGateway`]: it
//! attaches the bearer token from the shared session handle to every
//! request, maps HTTP failures to the shared error taxonomy, and clears the
//! session on any unauthorized response so the UI can redirect to login.
//!
//! ## Example
//!
//! ```no_run
//! use evently_core::{Gateway, JsonFileStore, SessionHandle};
//! use evently_gateway::HttpGateway;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Arc::new(JsonFileStore::new("session.json"));
//!     let session = Arc::new(SessionHandle::new(storage));
//!     let gateway = HttpGateway::new("https://api.example.com/api", session);
//!
//!     let outcome = gateway.login("dana@example.com", "secret").await?;
//!     println!("Logged in as {}", outcome.user.name);
//!     Ok(())
//! }
//! ```

pub mod client;
mod payloads;

pub use client::{HttpGateway, API_URL_VAR};
