//! Token lifecycle: sources, refresh, storage and callbacks.

pub mod callback;
pub mod refresh;
pub mod source;
pub mod storage;

pub use callback::{CompositeTokenCallback, RecordingTokenCallback, TokenCallback};
pub use refresh::RefreshTokenSource;
pub use source::{ReuseTokenSource, StaticTokenSource, TokenSource, REFRESH_BUFFER_SECS};
pub use storage::{InMemoryTokenStore, MockTokenStore, TokenStore};
