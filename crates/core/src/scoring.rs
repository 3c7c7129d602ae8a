use thiserror::Error;

use crate::model::{AnswerSet, QuestionList, Results};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("cannot score a session without questions")]
    NoQuestions,
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Score a run.
///
/// Only answers for questions in `questions` count; an unanswered question is
/// scored as incorrect. The percentage is rounded half-up.
///
/// # Errors
///
/// Returns `ScoreError::NoQuestions` for an empty question list.
pub fn score(questions: &QuestionList, answers: &AnswerSet) -> Result<Results, ScoreError> {
    let total = questions.len();
    if total == 0 {
        return Err(ScoreError::NoQuestions);
    }

    let mut correct = 0_usize;
    let mut answered = 0_usize;
    for question in questions {
        let Some(answer) = answers.get(question.id()) else {
            continue;
        };
        answered += 1;
        if question.is_correct(answer.selected()) {
            correct += 1;
        }
    }

    Ok(Results::new(
        correct,
        answered,
        total,
        round_half_up_percentage(correct, total),
    ))
}

fn round_half_up_percentage(part: usize, total: usize) -> u32 {
    let scaled = (part as u128 * 100 + total as u128 / 2) / total as u128;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, Grade, Question};

    fn list(correct: &[usize]) -> QuestionList {
        correct
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let id = i64::try_from(i).unwrap() + 1;
                Question::new(
                    id,
                    format!("Q{id}"),
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    c,
                    None,
                )
                .unwrap()
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn answer_all(questions: &QuestionList, picks: &[usize]) -> AnswerSet {
        let mut answers = AnswerSet::new();
        for (question, &pick) in questions.iter().zip(picks) {
            answers.record(Answer::for_question(question, pick));
        }
        answers
    }

    #[test]
    fn scores_two_of_three_as_d() {
        let questions = list(&[0, 1, 2]);
        let answers = answer_all(&questions, &[0, 1, 0]);

        let results = score(&questions, &answers).unwrap();

        assert_eq!(results.correct_count(), 2);
        assert_eq!(results.total_questions(), 3);
        assert_eq!(results.percentage(), 67);
        assert_eq!(results.grade(), Grade::D);
    }

    #[test]
    fn unanswered_questions_count_as_incorrect() {
        let questions = list(&[0, 0, 0, 0, 0]);
        let answers = answer_all(&questions, &[0, 0]);

        let results = score(&questions, &answers).unwrap();

        assert_eq!(results.correct_count(), 2);
        assert_eq!(results.answered_count(), 2);
        assert_eq!(results.total_questions(), 5);
        assert_eq!(results.percentage(), 40);
        assert_eq!(results.grade(), Grade::F);
    }

    #[test]
    fn rounds_half_up() {
        let questions = list(&[0; 8]);
        let answers = answer_all(&questions, &[0]);
        assert_eq!(score(&questions, &answers).unwrap().percentage(), 13);

        let questions = list(&[0; 3]);
        let answers = answer_all(&questions, &[0]);
        assert_eq!(score(&questions, &answers).unwrap().percentage(), 33);
    }

    #[test]
    fn answers_outside_the_list_are_ignored() {
        let questions = list(&[0, 0]);
        let stray = Question::new(99_i64, "stray", vec!["a".into(), "b".into()], 0, None).unwrap();
        let mut answers = answer_all(&questions, &[0]);
        answers.record(Answer::for_question(&stray, 0));

        let results = score(&questions, &answers).unwrap();
        assert_eq!(results.correct_count(), 1);
        assert_eq!(results.percentage(), 50);
    }

    #[test]
    fn scoring_is_deterministic() {
        let questions = list(&[1, 2, 3, 0]);
        let answers = answer_all(&questions, &[1, 0, 3, 0]);
        assert_eq!(
            score(&questions, &answers).unwrap(),
            score(&questions, &answers).unwrap()
        );
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = score(&QuestionList::default(), &AnswerSet::new()).unwrap_err();
        assert_eq!(err, ScoreError::NoQuestions);
    }
}
