//! The request/response surface the client collaborators call: typed DTOs,
//! field validation, error-code mapping, a thread-safe handle around the
//! engine, and the background ticker that keeps sweeps and match retries
//! running on wall-clock time.

pub mod error;
pub mod service;
pub mod ticker;
pub mod types;

pub use error::{ApiError, ErrorCode};
pub use service::{SharedDispatch, TimeSource};
pub use ticker::Ticker;
