//! HTTP surface of Redbridge
//!
//! Translates HTTP requests into store commands and store replies into
//! JSON responses:
//!
//! * `command`: builds one command from body, path, and query string.
//! * `batch`: parses `/pipeline` and `/multi-exec` bodies.
//! * `encoding`: plain, Base64, and RESP2 reply encodings.
//! * `server`: router assembly, auth gate, graceful shutdown.

pub mod batch;
pub mod command;
pub mod encoding;
pub mod server;

mod handlers;

pub use server::{Gateway, GatewayConfig};
