//! Client-side layer for the Quill API: a typed HTTP client plus the screen
//! state every view re-derives by hand (query gating, pagination, the
//! session with its onboarding redirect guard).

pub mod error;
pub mod http_client;
pub mod model;
pub mod pager;
pub mod query;
pub mod session;

pub use error::ClientError;
pub use http_client::QuillClient;
pub use pager::Pager;
pub use query::QueryState;
pub use session::{OnboardingGuard, Session};
