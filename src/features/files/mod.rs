//! File upload feature.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/upload-file` | Store a multipart `file` part in object storage |

pub mod dtos;
pub mod handlers;
pub mod routes;

pub use routes::routes;
