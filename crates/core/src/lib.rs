#![forbid(unsafe_code)]

pub mod loader;
pub mod model;
pub mod scoring;
pub mod time;

pub use loader::{LoadError, LoadErrorKind, SchemaError, parse_bank};
pub use scoring::{ScoreError, score};
pub use time::{Clock, SessionClock, format_elapsed};
