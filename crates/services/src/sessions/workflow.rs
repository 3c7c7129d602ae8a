use tokio::sync::watch;

use quiz_core::model::{ConfigError, ConfigPatch, QuestionBank, QuizSettings, SessionConfig};
use quiz_core::{Clock, parse_bank};

use super::plan::QuestionListBuilder;
use super::review::{ReviewNavigator, review_statuses};
use super::service::{CompletedSession, ConfirmOutcome, TestSession};
use super::view::{
    BankSummary, NavigatorCell, ResultsSummary, ResultsView, Screen, SetupView, TestView,
    ViewState, WelcomeView,
};
use crate::bank_service::{BankSource, LoadNotice, load_bank};
use crate::error::{SessionError, StateError};
use crate::ticker::ElapsedTicker;

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// User-initiated events, as delivered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// Raw document content from a completed file read.
    Upload(String),
    OpenSetup,
    CancelSetup,
    SetConfig(ConfigPatch),
    StartTest,
    SelectOption(usize),
    ConfirmAnswer,
    Navigate(usize),
    Next,
    Previous,
    FinishTest,
    ToggleReview,
    Reset,
}

impl QuizEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            QuizEvent::Upload(_) => "upload",
            QuizEvent::OpenSetup => "openSetup",
            QuizEvent::CancelSetup => "cancelSetup",
            QuizEvent::SetConfig(_) => "setConfig",
            QuizEvent::StartTest => "startTest",
            QuizEvent::SelectOption(_) => "selectOption",
            QuizEvent::ConfirmAnswer => "confirmAnswer",
            QuizEvent::Navigate(_) => "navigate",
            QuizEvent::Next => "next",
            QuizEvent::Previous => "previous",
            QuizEvent::FinishTest => "finishTest",
            QuizEvent::ToggleReview => "toggleReview",
            QuizEvent::Reset => "reset",
        }
    }
}

/// Outcome of handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Applied,
    /// A bank was loaded; carries the success notice.
    Loaded(LoadNotice),
    /// The event does not apply right now and was ignored.
    Ignored(StateError),
}

impl Dispatch {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        !matches!(self, Dispatch::Ignored(_))
    }
}

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct SetupState {
    bank: Option<QuestionBank>,
    config: SessionConfig,
}

impl SetupState {
    fn new(config: SessionConfig) -> Self {
        Self { bank: None, config }
    }
}

struct ActiveTest {
    bank: QuestionBank,
    config: SessionConfig,
    session: TestSession,
    // Dropped with the state; aborts the tick task.
    ticker: Option<ElapsedTicker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultsMode {
    Summary,
    Review,
}

struct FinishedTest {
    bank: QuestionBank,
    completed: CompletedSession,
    mode: ResultsMode,
    review: ReviewNavigator,
}

enum QuizState {
    Welcome(SetupState),
    Setup(SetupState),
    Test(ActiveTest),
    Results(FinishedTest),
}

impl QuizState {
    fn screen(&self) -> Screen {
        match self {
            QuizState::Welcome(_) => Screen::Welcome,
            QuizState::Setup(_) => Screen::Setup,
            QuizState::Test(_) => Screen::Test,
            QuizState::Results(_) => Screen::Results,
        }
    }
}

//
// ─── MACHINE ───────────────────────────────────────────────────────────────────
//

/// The quiz state machine: welcome → setup → test → results.
///
/// Every transition runs synchronously on `&mut self`. Events that do not
/// apply to the current state come back as [`Dispatch::Ignored`] and leave
/// the machine untouched.
pub struct QuizMachine {
    clock: Clock,
    settings: QuizSettings,
    state: QuizState,
}

impl Default for QuizMachine {
    fn default() -> Self {
        Self::new(Clock::default(), QuizSettings::default())
    }
}

impl QuizMachine {
    #[must_use]
    pub fn new(clock: Clock, settings: QuizSettings) -> Self {
        let state = QuizState::Welcome(SetupState::new(settings.default_config()));
        Self {
            clock,
            settings,
            state,
        }
    }

    /// Mutable access to the time source, e.g. to advance a fixed clock.
    ///
    /// Changes apply to stamps and [`Self::elapsed_secs`]. A ticker already
    /// running keeps the clock it was started with.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.state.screen()
    }

    #[must_use]
    pub fn bank(&self) -> Option<&QuestionBank> {
        match &self.state {
            QuizState::Welcome(setup) | QuizState::Setup(setup) => setup.bank.as_ref(),
            QuizState::Test(active) => Some(&active.bank),
            QuizState::Results(finished) => Some(&finished.bank),
        }
    }

    /// Current config while it can still change.
    #[must_use]
    pub fn config(&self) -> Option<SessionConfig> {
        match &self.state {
            QuizState::Welcome(setup) | QuizState::Setup(setup) => Some(setup.config),
            QuizState::Test(active) => Some(active.config),
            QuizState::Results(_) => None,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&TestSession> {
        match &self.state {
            QuizState::Test(active) => Some(&active.session),
            _ => None,
        }
    }

    #[must_use]
    pub fn completed(&self) -> Option<&CompletedSession> {
        match &self.state {
            QuizState::Results(finished) => Some(&finished.completed),
            _ => None,
        }
    }

    #[must_use]
    pub fn results(&self) -> Option<ResultsSummary> {
        self.completed().map(|completed| ResultsSummary {
            results: completed.results(),
            duration_secs: completed.duration_secs(),
        })
    }

    /// Elapsed seconds: live during a test, frozen on the results screen.
    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        match &self.state {
            QuizState::Test(active) => active.session.elapsed_secs(self.clock.now()),
            QuizState::Results(finished) => finished.completed.duration_secs(),
            _ => 0,
        }
    }

    /// Periodic elapsed-time updates for the running test, if a ticker is active.
    #[must_use]
    pub fn elapsed_updates(&self) -> Option<watch::Receiver<u64>> {
        match &self.state {
            QuizState::Test(active) => active.ticker.as_ref().map(ElapsedTicker::subscribe),
            _ => None,
        }
    }

    /// Handle one event.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` when an upload is rejected and
    /// `SessionError::Config` when the config selects no questions. In both
    /// cases the machine keeps its previous state.
    pub fn dispatch(&mut self, event: QuizEvent) -> Result<Dispatch, SessionError> {
        let outcome = match event {
            QuizEvent::Upload(content) => return self.upload(&content),
            QuizEvent::OpenSetup => self.open_setup(),
            QuizEvent::CancelSetup => self.cancel_setup(),
            QuizEvent::SetConfig(patch) => self.set_config(patch),
            QuizEvent::StartTest => return self.start_test(),
            QuizEvent::SelectOption(index) => self.select_option(index),
            QuizEvent::ConfirmAnswer => return self.confirm_answer(),
            QuizEvent::Navigate(index) => self.navigate(index),
            QuizEvent::Next => self.next(),
            QuizEvent::Previous => self.previous(),
            QuizEvent::FinishTest => return self.finish_test(),
            QuizEvent::ToggleReview => self.toggle_review(),
            QuizEvent::Reset => self.reset(),
        };
        Ok(outcome)
    }

    pub fn open_setup(&mut self) -> Dispatch {
        match self.take_state() {
            QuizState::Welcome(setup) => {
                self.state = QuizState::Setup(setup);
                Dispatch::Applied
            }
            other => self.reject(other, "openSetup"),
        }
    }

    /// Leave setup without starting; the loaded bank and config are kept.
    pub fn cancel_setup(&mut self) -> Dispatch {
        match self.take_state() {
            QuizState::Setup(setup) => {
                self.state = QuizState::Welcome(setup);
                Dispatch::Applied
            }
            other => self.reject(other, "cancelSetup"),
        }
    }

    /// Validate `content` and, only if it is a usable bank, make it current.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` for a rejected document; any previously
    /// loaded bank stays in place.
    pub fn upload(&mut self, content: &str) -> Result<Dispatch, SessionError> {
        if self.screen() != Screen::Setup {
            return Ok(self.ignore_here("upload"));
        }
        let bank = parse_bank(content).inspect_err(|e| {
            tracing::warn!(error = %e, "question bank rejected");
        })?;
        Ok(self.commit_upload(bank))
    }

    /// Read and validate a document from `source`, then make it current.
    ///
    /// The machine stays borrowed for the whole read, so nothing else can
    /// happen until the load completes.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Source` when the read fails, otherwise as [`Self::upload`].
    pub async fn upload_from(&mut self, source: &dyn BankSource) -> Result<Dispatch, SessionError> {
        if self.screen() != Screen::Setup {
            return Ok(self.ignore_here("upload"));
        }
        let bank = load_bank(source).await?;
        Ok(self.commit_upload(bank))
    }

    pub fn set_config(&mut self, patch: ConfigPatch) -> Dispatch {
        let QuizState::Setup(setup) = &mut self.state else {
            return self.ignore_here("setConfig");
        };
        let bank_len = setup.bank.as_ref().map(QuestionBank::len);
        setup.config = setup.config.patched(patch, bank_len);
        tracing::debug!(config = ?setup.config, "session config updated");
        Dispatch::Applied
    }

    /// Derive the question list and begin the run.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` if the config leaves no questions; the
    /// machine stays in setup.
    pub fn start_test(&mut self) -> Result<Dispatch, SessionError> {
        let (bank, config) = match self.take_state() {
            QuizState::Setup(SetupState {
                bank: Some(bank),
                config,
            }) => (bank, config),
            QuizState::Setup(setup) => {
                self.state = QuizState::Setup(setup);
                return Ok(Self::ignored(StateError::NoBank));
            }
            other => return Ok(self.reject(other, "startTest")),
        };

        let questions = QuestionListBuilder::new(&bank, config).build();
        if questions.is_empty() {
            let err = ConfigError::EmptyQuestionList {
                start_from: config.start_from,
                bank_len: bank.len(),
            };
            self.state = QuizState::Setup(SetupState {
                bank: Some(bank),
                config,
            });
            return Err(err.into());
        }

        let session = match TestSession::start(questions, self.clock.now()) {
            Ok(session) => session,
            Err(err) => {
                self.state = QuizState::Setup(SetupState {
                    bank: Some(bank),
                    config,
                });
                return Err(err);
            }
        };
        let ticker = ElapsedTicker::spawn(
            self.clock,
            session.clock().started_at(),
            self.settings.tick_interval(),
        );
        tracing::info!(
            session = %session.id(),
            title = bank.title(),
            questions = session.total_questions(),
            randomize = config.randomize,
            "test started"
        );

        self.state = QuizState::Test(ActiveTest {
            bank,
            config,
            session,
            ticker,
        });
        Ok(Dispatch::Applied)
    }

    pub fn select_option(&mut self, index: usize) -> Dispatch {
        let QuizState::Test(active) = &mut self.state else {
            return self.ignore_here("selectOption");
        };
        match active.session.select_option(index) {
            Ok(()) => Dispatch::Applied,
            Err(err) => Self::ignored(err),
        }
    }

    /// Record the selection; answering the last question finishes the run.
    ///
    /// # Errors
    ///
    /// Propagates scoring failures when the run finishes.
    pub fn confirm_answer(&mut self) -> Result<Dispatch, SessionError> {
        let QuizState::Test(active) = &mut self.state else {
            return Ok(self.ignore_here("confirmAnswer"));
        };
        match active.session.confirm_answer() {
            Ok(ConfirmOutcome::Advanced { .. }) => Ok(Dispatch::Applied),
            Ok(ConfirmOutcome::LastAnswered) => self.finish_test(),
            Err(err) => Ok(Self::ignored(err)),
        }
    }

    /// In a test, move between questions; in review mode, move the review cursor.
    pub fn navigate(&mut self, index: usize) -> Dispatch {
        match &mut self.state {
            QuizState::Test(active) => {
                active.session.navigate(index);
                Dispatch::Applied
            }
            QuizState::Results(finished) => {
                if finished.mode != ResultsMode::Review {
                    return Self::ignored(StateError::NotReviewing);
                }
                finished.review.navigate(index);
                Dispatch::Applied
            }
            _ => self.ignore_here("navigate"),
        }
    }

    pub fn next(&mut self) -> Dispatch {
        match self.position("next") {
            Ok(current) => self.navigate(current.saturating_add(1)),
            Err(ignored) => ignored,
        }
    }

    pub fn previous(&mut self) -> Dispatch {
        match self.position("previous") {
            Ok(current) => self.navigate(current.saturating_sub(1)),
            Err(ignored) => ignored,
        }
    }

    /// Index that `next`/`previous` move from.
    fn position(&self, event: &'static str) -> Result<usize, Dispatch> {
        match &self.state {
            QuizState::Test(active) => Ok(active.session.current_index()),
            QuizState::Results(finished) if finished.mode == ResultsMode::Review => {
                Ok(finished.review.index())
            }
            QuizState::Results(_) => Err(Self::ignored(StateError::NotReviewing)),
            _ => Err(self.ignore_here(event)),
        }
    }

    /// Stop the run now; unanswered questions stay unanswered.
    ///
    /// # Errors
    ///
    /// Propagates scoring failures, returning the machine to setup.
    pub fn finish_test(&mut self) -> Result<Dispatch, SessionError> {
        let active = match self.take_state() {
            QuizState::Test(active) => active,
            other => return Ok(self.reject(other, "finishTest")),
        };
        let ActiveTest {
            bank,
            config,
            session,
            ticker,
        } = active;
        drop(ticker);

        let completed = match session.finish(self.clock.now()) {
            Ok(completed) => completed,
            Err(err) => {
                tracing::error!(error = %err, "failed to score finished test");
                self.state = QuizState::Setup(SetupState {
                    bank: Some(bank),
                    config,
                });
                return Err(err);
            }
        };

        let results = completed.results();
        tracing::info!(
            session = %completed.id(),
            correct = results.correct_count(),
            total = results.total_questions(),
            percentage = results.percentage(),
            grade = %results.grade(),
            duration_secs = completed.duration_secs(),
            "test finished"
        );

        let review = ReviewNavigator::new(completed.questions().len());
        self.state = QuizState::Results(FinishedTest {
            bank,
            completed,
            mode: ResultsMode::Summary,
            review,
        });
        Ok(Dispatch::Applied)
    }

    /// Switch between the results summary and review mode.
    pub fn toggle_review(&mut self) -> Dispatch {
        let QuizState::Results(finished) = &mut self.state else {
            return self.ignore_here("toggleReview");
        };
        finished.mode = match finished.mode {
            ResultsMode::Summary => ResultsMode::Review,
            ResultsMode::Review => ResultsMode::Summary,
        };
        Dispatch::Applied
    }

    /// Discard everything and go back to the welcome screen. Valid in any state.
    pub fn reset(&mut self) -> Dispatch {
        let previous = self.take_state();
        tracing::info!(from = %previous.screen(), "quiz reset");
        drop(previous);
        Dispatch::Applied
    }

    /// Snapshot of the current state for rendering.
    #[must_use]
    pub fn view(&self) -> ViewState {
        match &self.state {
            QuizState::Welcome(setup) => ViewState::Welcome(WelcomeView {
                bank: setup.bank.as_ref().map(BankSummary::from_bank),
            }),
            QuizState::Setup(setup) => {
                let expected_questions = setup
                    .bank
                    .as_ref()
                    .map_or(0, |bank| setup.config.expected_len(bank.len()));
                ViewState::Setup(SetupView {
                    bank: setup.bank.as_ref().map(BankSummary::from_bank),
                    config: setup.config,
                    expected_questions,
                    can_start: expected_questions > 0,
                })
            }
            QuizState::Test(active) => ViewState::Test(self.test_view(active)),
            QuizState::Results(finished) => ViewState::Results(Self::results_view(finished)),
        }
    }

    fn test_view(&self, active: &ActiveTest) -> TestView {
        let session = &active.session;
        let current = session.current_index();
        let navigator = session
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| NavigatorCell {
                index,
                answered: session.answers().contains(question.id()),
                current: index == current,
            })
            .collect();

        TestView {
            session_id: session.id(),
            title: active.bank.title().to_owned(),
            index: current,
            total: session.total_questions(),
            question: session.current_question().clone(),
            selection: session.selection(),
            has_answered_current: session.has_answered_current(),
            elapsed_secs: session.elapsed_secs(self.clock.now()),
            progress: session.progress(),
            navigator,
        }
    }

    fn results_view(finished: &FinishedTest) -> ResultsView {
        let completed = &finished.completed;
        let review = match finished.mode {
            ResultsMode::Summary => None,
            ResultsMode::Review => finished
                .review
                .item(completed.questions(), completed.answers()),
        };
        ResultsView {
            session_id: completed.id(),
            title: finished.bank.title().to_owned(),
            summary: ResultsSummary {
                results: completed.results(),
                duration_secs: completed.duration_secs(),
            },
            statuses: review_statuses(completed.questions(), completed.answers()),
            review,
        }
    }

    fn commit_upload(&mut self, bank: QuestionBank) -> Dispatch {
        let QuizState::Setup(setup) = &mut self.state else {
            return self.ignore_here("upload");
        };
        let notice = LoadNotice::loaded(&bank);
        setup.config = setup.config.clamped(bank.len());
        setup.bank = Some(bank);
        Dispatch::Loaded(notice)
    }

    fn take_state(&mut self) -> QuizState {
        let fresh = QuizState::Welcome(SetupState::new(self.settings.default_config()));
        std::mem::replace(&mut self.state, fresh)
    }

    /// Put `state` back and report `event` as not applicable to it.
    fn reject(&mut self, state: QuizState, event: &'static str) -> Dispatch {
        self.state = state;
        self.ignore_here(event)
    }

    fn ignore_here(&self, event: &'static str) -> Dispatch {
        Self::ignored(StateError::WrongScreen {
            event,
            screen: self.screen(),
        })
    }

    fn ignored(err: StateError) -> Dispatch {
        tracing::debug!(reason = %err, "event ignored");
        Dispatch::Ignored(err)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{Grade, QuestionId};
    use quiz_core::time::{fixed_clock, fixed_now};

    fn bank_json(title: &str, correct: &[usize]) -> String {
        let questions: Vec<serde_json::Value> = correct
            .iter()
            .zip(1_i64..)
            .map(|(&c, id)| {
                serde_json::json!({
                    "id": id,
                    "question": format!("Q{id}"),
                    "options": ["a", "b", "c"],
                    "correct": c,
                    "explanation": format!("because {id}"),
                })
            })
            .collect();
        serde_json::json!({
            "title": title,
            "description": "test bank",
            "questions": questions,
        })
        .to_string()
    }

    fn machine_with_bank(correct: &[usize]) -> QuizMachine {
        let mut machine = QuizMachine::new(fixed_clock(), QuizSettings::default());
        machine.open_setup();
        machine.upload(&bank_json("Sample", correct)).unwrap();
        machine
    }

    fn answer(machine: &mut QuizMachine, pick: usize) {
        assert!(machine.select_option(pick).is_applied());
        machine.confirm_answer().unwrap();
    }

    fn wrong_screen(event: &'static str, screen: Screen) -> Dispatch {
        Dispatch::Ignored(StateError::WrongScreen { event, screen })
    }

    #[test]
    fn starts_on_welcome_without_bank() {
        let machine = QuizMachine::default();
        assert_eq!(machine.screen(), Screen::Welcome);
        assert!(machine.bank().is_none());
        assert_eq!(machine.view(), ViewState::Welcome(WelcomeView { bank: None }));
    }

    #[test]
    fn upload_only_applies_in_setup() {
        let mut machine = QuizMachine::new(fixed_clock(), QuizSettings::default());
        let outcome = machine.upload(&bank_json("Early", &[0, 1])).unwrap();
        assert_eq!(outcome, wrong_screen("upload", Screen::Welcome));
        assert!(machine.bank().is_none());

        machine.open_setup();
        let Dispatch::Loaded(notice) = machine.upload(&bank_json("Late", &[0, 1])).unwrap() else {
            panic!("expected a load notice");
        };
        assert_eq!(notice.title, "Test loaded successfully!");
        assert_eq!(notice.message, "Late with 2 questions");
    }

    #[test]
    fn upload_clamps_config_to_bank() {
        let machine = machine_with_bank(&[0, 1, 2]);
        let config = machine.config().unwrap();
        assert_eq!(config.number_of_questions, 3);
        assert_eq!(config.start_from, 1);

        let ViewState::Setup(setup) = machine.view() else {
            panic!("expected setup view");
        };
        assert_eq!(setup.expected_questions, 3);
        assert!(setup.can_start);
    }

    #[test]
    fn config_set_before_upload_survives_load() {
        let mut machine = QuizMachine::new(fixed_clock(), QuizSettings::default());
        machine.open_setup();
        machine.set_config(ConfigPatch::number_of_questions(5));
        machine.set_config(ConfigPatch::start_from(4));
        assert_eq!(machine.config(), Some(SessionConfig::new(5, 4, false)));

        machine.upload(&bank_json("Twenty", &[0; 20])).unwrap();
        assert_eq!(machine.config(), Some(SessionConfig::new(5, 4, false)));

        machine.start_test().unwrap();
        let session = machine.session().unwrap();
        assert_eq!(session.total_questions(), 5);
        assert_eq!(session.current_question().id(), &QuestionId::number(4));
    }

    #[test]
    fn failed_upload_keeps_previous_bank() {
        let mut machine = machine_with_bank(&[0, 1]);

        let err = machine.upload("{ not json").unwrap_err();
        assert!(matches!(err, SessionError::Load(_)));
        assert_eq!(machine.screen(), Screen::Setup);
        assert_eq!(machine.bank().map(QuestionBank::title), Some("Sample"));

        let err = machine
            .upload(r#"{"title": "Broken", "description": "", "questions": []}"#)
            .unwrap_err();
        assert!(matches!(err, SessionError::Load(_)));
        assert_eq!(machine.bank().map(QuestionBank::len), Some(2));
    }

    #[test]
    fn cancel_setup_keeps_bank_and_config() {
        let mut machine = machine_with_bank(&[0, 1, 2, 0]);
        machine.set_config(ConfigPatch::number_of_questions(2));

        assert!(machine.cancel_setup().is_applied());
        let ViewState::Welcome(welcome) = machine.view() else {
            panic!("expected welcome view");
        };
        assert_eq!(welcome.bank.map(|b| b.question_count), Some(4));

        machine.open_setup();
        assert_eq!(machine.config().unwrap().number_of_questions, 2);
    }

    #[test]
    fn set_config_is_clamped_and_setup_only() {
        let mut machine = machine_with_bank(&[0, 1, 2]);
        machine.set_config(ConfigPatch::start_from(9));
        assert_eq!(machine.config().unwrap().start_from, 3);

        machine.start_test().unwrap();
        assert_eq!(
            machine.set_config(ConfigPatch::randomize(true)),
            wrong_screen("setConfig", Screen::Test)
        );
    }

    #[test]
    fn start_requires_bank() {
        let mut machine = QuizMachine::new(fixed_clock(), QuizSettings::default());
        machine.open_setup();
        assert_eq!(
            machine.start_test().unwrap(),
            Dispatch::Ignored(StateError::NoBank)
        );
        assert_eq!(machine.screen(), Screen::Setup);
    }

    #[test]
    fn scenario_full_run_is_graded() {
        let mut machine = machine_with_bank(&[0, 1, 2]);
        machine.set_config(ConfigPatch::number_of_questions(3));
        machine.start_test().unwrap();
        assert_eq!(machine.screen(), Screen::Test);

        answer(&mut machine, 0);
        answer(&mut machine, 1);
        machine.clock_mut().advance(Duration::seconds(42));
        answer(&mut machine, 0);

        assert_eq!(machine.screen(), Screen::Results);
        let summary = machine.results().unwrap();
        assert_eq!(summary.results.correct_count(), 2);
        assert_eq!(summary.results.percentage(), 67);
        assert_eq!(summary.results.grade(), Grade::D);
        assert_eq!(summary.duration_secs, 42);
    }

    #[test]
    fn scenario_finish_early_counts_unanswered() {
        let mut machine = machine_with_bank(&[0, 0, 0, 0, 0]);
        machine.set_config(ConfigPatch::number_of_questions(5));
        machine.start_test().unwrap();
        answer(&mut machine, 0);
        answer(&mut machine, 0);

        machine.finish_test().unwrap();
        let results = machine.results().unwrap().results;
        assert_eq!(results.total_questions(), 5);
        assert_eq!(results.answered_count(), 2);
        assert_eq!(results.correct_count(), 2);
        assert_eq!(results.percentage(), 40);
        assert_eq!(results.grade(), Grade::F);
    }

    #[test]
    fn scenario_reset_mid_test_starts_clean() {
        let mut machine = machine_with_bank(&[0, 1, 2]);
        machine.start_test().unwrap();
        answer(&mut machine, 0);

        assert!(machine.reset().is_applied());
        assert_eq!(machine.screen(), Screen::Welcome);
        assert!(machine.bank().is_none());

        machine.open_setup();
        machine.upload(&bank_json("Second", &[1, 1])).unwrap();
        machine.start_test().unwrap();

        let session = machine.session().unwrap();
        assert!(session.answers().is_empty());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.total_questions(), 2);
    }

    #[test]
    fn confirm_without_selection_is_ignored() {
        let mut machine = machine_with_bank(&[0, 1]);
        machine.start_test().unwrap();
        assert_eq!(
            machine.confirm_answer().unwrap(),
            Dispatch::Ignored(StateError::NoSelection)
        );
        assert_eq!(machine.session().unwrap().answered_count(), 0);
    }

    #[test]
    fn invalid_option_is_ignored() {
        let mut machine = machine_with_bank(&[0, 1]);
        machine.start_test().unwrap();
        assert_eq!(
            machine.select_option(7),
            Dispatch::Ignored(StateError::OptionOutOfRange { index: 7, len: 3 })
        );
        assert_eq!(machine.session().unwrap().selection(), None);
    }

    #[test]
    fn navigate_twice_yields_same_view() {
        let mut machine = machine_with_bank(&[0, 1, 2]);
        machine.start_test().unwrap();
        answer(&mut machine, 2);

        machine.navigate(0);
        let first = machine.view();
        machine.navigate(0);
        assert_eq!(machine.view(), first);

        let ViewState::Test(view) = first else {
            panic!("expected test view");
        };
        assert_eq!(view.selection, Some(2));
        assert!(view.has_answered_current);
        assert!(view.navigator[0].answered && view.navigator[0].current);
        assert!(!view.navigator[1].answered);
    }

    #[test]
    fn next_and_previous_clamp() {
        let mut machine = machine_with_bank(&[0, 1, 2]);
        machine.start_test().unwrap();

        machine.previous();
        assert_eq!(machine.session().unwrap().current_index(), 0);
        machine.dispatch(QuizEvent::Next).unwrap();
        machine.dispatch(QuizEvent::Next).unwrap();
        machine.dispatch(QuizEvent::Next).unwrap();
        assert_eq!(machine.session().unwrap().current_index(), 2);
    }

    #[test]
    fn reconfirming_replaces_answer() {
        let mut machine = machine_with_bank(&[1, 0, 0]);
        machine.start_test().unwrap();
        answer(&mut machine, 0);
        machine.navigate(0);
        answer(&mut machine, 1);

        let session = machine.session().unwrap();
        assert_eq!(session.answered_count(), 1);
        let recorded = session.answers().get(&QuestionId::number(1)).unwrap();
        assert_eq!(recorded.selected(), 1);
        assert!(recorded.is_correct());
    }

    #[test]
    fn review_toggles_and_keeps_position() {
        let mut machine = machine_with_bank(&[0, 1, 2]);
        machine.start_test().unwrap();
        answer(&mut machine, 0);
        machine.finish_test().unwrap();

        assert_eq!(
            machine.navigate(1),
            Dispatch::Ignored(StateError::NotReviewing)
        );
        assert!(!machine.view().is_reviewing());

        machine.toggle_review();
        machine.navigate(2);
        let ViewState::Results(view) = machine.view() else {
            panic!("expected results view");
        };
        let item = view.review.unwrap();
        assert_eq!(item.index, 2);
        assert!(item.answer.is_none());
        assert_eq!(item.question.explanation(), Some("because 3"));

        machine.toggle_review();
        machine.toggle_review();
        let ViewState::Results(view) = machine.view() else {
            panic!("expected results view");
        };
        assert_eq!(view.review.map(|item| item.index), Some(2));
    }

    #[test]
    fn test_events_ignored_outside_test() {
        let mut machine = machine_with_bank(&[0]);
        assert_eq!(
            machine.select_option(0),
            wrong_screen("selectOption", Screen::Setup)
        );
        assert_eq!(
            machine.finish_test().unwrap(),
            wrong_screen("finishTest", Screen::Setup)
        );
        assert_eq!(
            machine.toggle_review(),
            wrong_screen("toggleReview", Screen::Setup)
        );
        assert_eq!(machine.screen(), Screen::Setup);
    }

    #[test]
    fn elapsed_is_live_then_frozen() {
        let mut machine = machine_with_bank(&[0, 1]);
        machine.start_test().unwrap();
        machine.clock_mut().advance(Duration::seconds(5));
        assert_eq!(machine.elapsed_secs(), 5);

        machine.finish_test().unwrap();
        machine.clock_mut().advance(Duration::seconds(30));
        assert_eq!(machine.elapsed_secs(), 5);
        assert_eq!(machine.completed().unwrap().clock().started_at(), fixed_now());
    }

    #[test]
    fn no_ticker_without_runtime() {
        let mut machine = machine_with_bank(&[0]);
        machine.start_test().unwrap();
        assert!(machine.elapsed_updates().is_none());
    }

    async fn assert_closes(mut rx: watch::Receiver<u64>) {
        let closed = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok(), "ticker still running");
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_stops_on_finish() {
        let mut machine = machine_with_bank(&[0, 1]);
        machine.start_test().unwrap();
        let mut rx = machine.elapsed_updates().unwrap();
        rx.changed().await.unwrap();

        machine.finish_test().unwrap();
        assert!(machine.elapsed_updates().is_none());
        assert_closes(rx).await;
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_keeps_clock_from_test_start() {
        let mut machine = machine_with_bank(&[0, 1]);
        machine.start_test().unwrap();
        let mut rx = machine.elapsed_updates().unwrap();

        machine.clock_mut().advance(Duration::seconds(10));
        rx.changed().await.unwrap();

        assert_eq!(*rx.borrow_and_update(), 0);
        assert_eq!(machine.elapsed_secs(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_stops_on_reset() {
        let mut machine = machine_with_bank(&[0, 1]);
        machine.start_test().unwrap();
        let rx = machine.elapsed_updates().unwrap();

        machine.reset();
        assert_closes(rx).await;
    }

    #[tokio::test]
    async fn unreadable_source_keeps_previous_bank() {
        use crate::bank_service::FileSource;
        use crate::error::SourceError;

        let mut machine = machine_with_bank(&[0, 1]);
        let dir = tempfile::tempdir().unwrap();
        let err = machine
            .upload_from(&FileSource::new(dir.path().join("missing.json")))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Source(SourceError::Read { .. })));
        assert_eq!(machine.screen(), Screen::Setup);
        assert_eq!(machine.bank().map(QuestionBank::title), Some("Sample"));
    }

    #[tokio::test]
    async fn rejected_source_document_keeps_previous_bank() {
        use crate::bank_service::InMemorySource;

        let mut machine = machine_with_bank(&[0, 1]);
        let err = machine
            .upload_from(&InMemorySource::new("memory", r#"{"title": 3}"#))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Load(_)));
        assert_eq!(machine.bank().map(QuestionBank::len), Some(2));
    }

    #[tokio::test]
    async fn upload_from_source_requires_setup() {
        use crate::bank_service::InMemorySource;

        let source = InMemorySource::new("memory", bank_json("Async", &[0, 1]));
        let mut machine = QuizMachine::new(fixed_clock(), QuizSettings::default());
        assert_eq!(
            machine.upload_from(&source).await.unwrap(),
            wrong_screen("upload", Screen::Welcome)
        );

        machine.open_setup();
        let outcome = machine.upload_from(&source).await.unwrap();
        assert!(matches!(outcome, Dispatch::Loaded(_)));
        assert_eq!(machine.bank().map(QuestionBank::title), Some("Async"));
    }
}
