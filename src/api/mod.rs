//! Ward JSON API.
//!
//! Stateless: callers post already-loaded patients and readings, and
//! the handlers return alerts, chart series and summaries. Routes are
//! nested under `/api/`.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server_on, ApiServer, ApiSession, ServerError};
pub use types::ApiContext;
