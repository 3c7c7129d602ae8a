use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::{Question, QuestionBank, QuestionList, SessionConfig};

/// Builds the ordered question list for one session.
///
/// Steps, in order:
/// - skip the first `start_from - 1` questions
/// - shuffle the remainder when `randomize` is set
/// - keep at most `number_of_questions`
///
/// The bank itself is never reordered.
pub struct QuestionListBuilder<'a> {
    bank: &'a QuestionBank,
    config: SessionConfig,
}

impl<'a> QuestionListBuilder<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank, config: SessionConfig) -> Self {
        Self { bank, config }
    }

    /// Build using the thread-local RNG.
    #[must_use]
    pub fn build(self) -> QuestionList {
        self.build_with_rng(&mut rand::rng())
    }

    /// Build with a caller-supplied RNG (seeded in tests).
    ///
    /// An offset past the end of the bank yields an empty list.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> QuestionList {
        let skip = self.config.start_from.saturating_sub(1);
        let mut selected: Vec<Question> =
            self.bank.questions().iter().skip(skip).cloned().collect();

        if self.config.randomize {
            selected.shuffle(rng);
        }

        selected.truncate(self.config.number_of_questions);
        QuestionList::new(selected)
    }
}

/// Derive the question list for `config` from `bank`.
#[must_use]
pub fn derive_question_list(bank: &QuestionBank, config: SessionConfig) -> QuestionList {
    QuestionListBuilder::new(bank, config).build()
}
