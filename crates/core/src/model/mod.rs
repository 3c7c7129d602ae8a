mod answer;
mod bank;
mod config;
mod ids;
mod question;
mod results;
mod settings;

pub use ids::{ParseIdError, QuestionId, SessionId};

pub use answer::{Answer, AnswerSet};
pub use bank::{BankError, QuestionBank, QuestionList};
pub use config::{ConfigError, ConfigPatch, SessionConfig};
pub use question::{MIN_OPTIONS, Question, QuestionDraft, QuestionError};
pub use results::{Grade, PASS_PERCENTAGE, Results};
pub use settings::{MIN_TICK_INTERVAL, QuizSettings, QuizSettingsDraft, SettingsError};
