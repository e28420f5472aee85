//! HTTP middleware: CORS, security headers and the error envelope path.

pub mod cors;
pub mod error_path;
pub mod security;

pub use cors::create_cors_layer;
pub use error_path::error_path;
pub use security::security_headers;
