#![forbid(unsafe_code)]

pub mod bank_service;
pub mod error;
pub mod sessions;
pub mod ticker;

pub use quiz_core::Clock;
pub use sessions as session;

pub use bank_service::{BankSource, FileSource, InMemorySource, LoadNotice, NoticeSeverity, load_bank};
pub use error::{SessionError, SourceError, StateError};
pub use ticker::ElapsedTicker;

pub use sessions::{
    CompletedSession, Dispatch, QuizEvent, QuizMachine, ResultsSummary, Screen, TestSession,
    ViewState,
};
