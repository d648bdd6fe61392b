//! Bundled [`Server`](crate::lifecycle::Server) implementations.

pub mod http;

pub use http::HttpServer;
