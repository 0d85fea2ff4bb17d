//! Store client provider for Redbridge
//!
//! Owns the one shared connection to the backing store. The handle is
//! constructed once at startup from [`config::StoreConfig`], cloned into
//! every request handler, and torn down on shutdown. Supports a direct
//! single endpoint or a sentinel-discovered master, and executes batches
//! as either a pipeline or a MULTI/EXEC transaction.

pub mod config;
pub mod provider;
pub mod value;

pub use config::StoreConfig;
pub use provider::StoreClient;
