//! Core infrastructure: HTTP plumbing and the injectable clock.

pub mod clock;
pub mod http;

pub use clock::{Clock, ManualClock, SystemClock};
pub use http::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport, ReqwestHttpTransport,
};
