//! JSON document forwarding feature.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/save-json` | Create a document in the document store from the raw body |

pub mod handlers;
pub mod routes;

pub use routes::routes;
