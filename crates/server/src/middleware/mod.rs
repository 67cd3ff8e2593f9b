//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Trailing-slash normalization (wraps the router)
//! 2. Sentry layers (capture errors, transactions)
//! 3. CORS (permissive)
//! 4. `TraceLayer` (request span with `request_id` field)
//! 5. Request ID (record, tag, echo)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
