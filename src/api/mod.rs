//! Request layer for the AuthorHub backend
//!
//! The HTTP round trip sits behind the [`ApiTransport`] trait so the session
//! and flow layers can be exercised against a scripted mock. The real
//! implementation is a thin `reqwest` wrapper: one attempt per call, no
//! retries, no caching.

mod http;
mod mock;
mod transport;

pub use http::HttpTransport;
pub use mock::{MockTransport, RecordedRequest};
pub use transport::ApiTransport;
