//! Query request handling: validation, corpus loading, capability invocation, answer selection.

mod service;
pub mod types;

pub use service::{QaApi, QaService, QuerySettings};
pub use types::{NO_ANSWER, QaError, Query, QueryOutcome, QueryStage};
