//! Location-conditioned equipment questionnaire.
//!
//! The flow starts at the "where do you train" question and asks exactly one
//! equipment question for that location. Choosing "no equipment" there leads
//! to a bodyweight/household-items question instead of ending the flow.
//! Answers are aggregated into equipment ids through option metadata.

use crate::{
    AnswerRecord, EquipmentId, Error, OptionMetadata, Question, QuestionOption,
    RawEquipmentSources, Result, SelectedOption, SelectionKind, TrainingLocation, WorkoutLocation,
    BODYWEIGHT_SENTINEL,
};
use std::collections::{BTreeSet, HashSet};

pub const TRAINING_LOCATION: &str = "training_location";
pub const HOME_EQUIPMENT_QUESTION: &str = "home_equipment_question";
pub const GYM_EQUIPMENT_QUESTION: &str = "gym_equipment_question";
pub const OUTDOOR_EQUIPMENT_QUESTION: &str = "outdoor_equipment_question";
pub const BODYWEIGHT_ITEMS_QUESTION: &str = "bodyweight_items_question";

/// Option id meaning "I have no equipment here"
pub const NO_EQUIPMENT: &str = "no_equipment";

/// Transition function of the flow.
///
/// Returns the next question id, or None once a leaf question is answered.
/// Unrecognized or missing location answers go to the home question.
pub fn next(current: &str, selected_option: &str) -> Option<&'static str> {
    match current {
        TRAINING_LOCATION => Some(match TrainingLocation::parse(selected_option) {
            Some(TrainingLocation::Gym) => GYM_EQUIPMENT_QUESTION,
            Some(TrainingLocation::Outdoor) => OUTDOOR_EQUIPMENT_QUESTION,
            Some(TrainingLocation::Home) | None => HOME_EQUIPMENT_QUESTION,
        }),
        HOME_EQUIPMENT_QUESTION | GYM_EQUIPMENT_QUESTION | OUTDOOR_EQUIPMENT_QUESTION
            if selected_option == NO_EQUIPMENT =>
        {
            Some(BODYWEIGHT_ITEMS_QUESTION)
        }
        _ => None,
    }
}

/// Transition for a whole selection; the first option that moves the flow wins
fn next_for_selection(current: &str, selected: &[SelectedOption]) -> Option<&'static str> {
    if selected.is_empty() {
        return next(current, "");
    }
    selected.iter().find_map(|s| next(current, &s.option_id))
}

/// Union of the equipment implied by every selected option of every answer
pub fn aggregate_equipment(answers: &[AnswerRecord]) -> BTreeSet<EquipmentId> {
    answers
        .iter()
        .flat_map(|answer| answer.selected.iter())
        .flat_map(|selected| selected.implied_equipment().iter().cloned())
        .collect()
}

// ============================================================================
// Question set
// ============================================================================

/// An ordered set of questions
#[derive(Clone, Debug, Default)]
pub struct Questionnaire {
    pub questions: Vec<Question>,
}

impl Questionnaire {
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// The built-in onboarding equipment questions
    pub fn builtin() -> Self {
        Self {
            questions: vec![
                Question {
                    id: TRAINING_LOCATION.into(),
                    prompt: "Where do you usually train?".into(),
                    selection: SelectionKind::Single,
                    options: vec![
                        plain_option("home", "At home"),
                        plain_option("gym", "At the gym"),
                        plain_option("outdoor", "Outdoors"),
                    ],
                },
                Question {
                    id: HOME_EQUIPMENT_QUESTION.into(),
                    prompt: "Which equipment do you have at home?".into(),
                    selection: SelectionKind::Multiple,
                    options: vec![
                        equipment_option("dumbbells", "Dumbbells", &["dumbbells"]),
                        equipment_option("kettlebell", "Kettlebell", &["kettlebell"]),
                        equipment_option(
                            "resistance_bands",
                            "Resistance bands",
                            &["resistance_bands"],
                        ),
                        equipment_option("pullup_bar", "Pull-up bar", &["pullup_bar"]),
                        equipment_option("bench", "Bench", &["bench"]),
                        no_equipment_option(),
                    ],
                },
                Question {
                    id: GYM_EQUIPMENT_QUESTION.into(),
                    prompt: "Which equipment can you use at your gym?".into(),
                    selection: SelectionKind::Multiple,
                    options: vec![
                        equipment_option("barbell", "Barbell", &["barbell"]),
                        equipment_option("dumbbells", "Dumbbells", &["dumbbells"]),
                        equipment_option("cable_machine", "Cable machine", &["cable_machine"]),
                        equipment_option("bench", "Bench", &["bench"]),
                        equipment_option("squat_rack", "Squat rack", &["squat_rack"]),
                        equipment_option("leg_press", "Leg press", &["leg_press"]),
                        equipment_option("kettlebell", "Kettlebells", &["kettlebell"]),
                        no_equipment_option(),
                    ],
                },
                Question {
                    id: OUTDOOR_EQUIPMENT_QUESTION.into(),
                    prompt: "What is available where you train outdoors?".into(),
                    selection: SelectionKind::Multiple,
                    options: vec![
                        equipment_option("pullup_bar", "Pull-up bars", &["pullup_bar"]),
                        equipment_option("parallel_bars", "Parallel bars", &["parallel_bars"]),
                        equipment_option("park_bench", "Park bench", &["bench"]),
                        no_equipment_option(),
                    ],
                },
                Question {
                    id: BODYWEIGHT_ITEMS_QUESTION.into(),
                    prompt: "Any of these household items around?".into(),
                    selection: SelectionKind::Multiple,
                    options: vec![
                        equipment_option("chair_available", "A sturdy chair", &["chair"]),
                        equipment_option("mat_available", "A mat", &["mat"]),
                        equipment_option("stairs_available", "Stairs", &["stairs"]),
                        equipment_option("towel_available", "A towel", &["towel"]),
                        plain_option("nothing_available", "None of these"),
                    ],
                },
            ],
        }
    }
}

fn plain_option(id: &str, label: &str) -> QuestionOption {
    QuestionOption {
        id: id.into(),
        label: label.into(),
        metadata: None,
    }
}

fn equipment_option(id: &str, label: &str, equipment: &[&str]) -> QuestionOption {
    QuestionOption {
        id: id.into(),
        label: label.into(),
        metadata: Some(OptionMetadata::with_equipment(equipment.iter().copied())),
    }
}

fn no_equipment_option() -> QuestionOption {
    equipment_option(NO_EQUIPMENT, "No equipment", &[BODYWEIGHT_SENTINEL])
}

// ============================================================================
// Flow
// ============================================================================

/// Walks a questionnaire one answer at a time
#[derive(Debug)]
pub struct QuestionFlow<'q> {
    questionnaire: &'q Questionnaire,
    current: Option<&'q Question>,
    visited: HashSet<&'q str>,
    answers: Vec<AnswerRecord>,
}

impl<'q> QuestionFlow<'q> {
    /// Start at the location question (or the first question if there is none)
    pub fn new(questionnaire: &'q Questionnaire) -> Self {
        let current = questionnaire
            .get(TRAINING_LOCATION)
            .or_else(|| questionnaire.questions.first());
        Self {
            questionnaire,
            current,
            visited: HashSet::new(),
            answers: Vec::new(),
        }
    }

    /// The question waiting for an answer, None once complete
    pub fn current(&self) -> Option<&'q Question> {
        self.current
    }

    pub fn is_complete(&self) -> bool {
        self.current.is_none()
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Answer the current question and move to the next one.
    ///
    /// Unknown option ids are kept but imply no equipment.
    pub fn answer<S: AsRef<str>>(&mut self, selected: &[S]) -> Result<Option<&'q Question>> {
        let question = self
            .current
            .ok_or_else(|| Error::Questionnaire("questionnaire is already complete".into()))?;

        let mut seen = HashSet::new();
        let ids: Vec<&str> = selected
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty() && seen.insert(*s))
            .collect();

        if question.selection == SelectionKind::Single && ids.len() > 1 {
            return Err(Error::Questionnaire(format!(
                "question '{}' accepts a single option, got {}",
                question.id,
                ids.len()
            )));
        }

        let selected: Vec<SelectedOption> = ids
            .iter()
            .map(|id| match question.option(id) {
                Some(option) => SelectedOption::from(option),
                None => {
                    tracing::debug!("Unknown option '{}' for question '{}'", id, question.id);
                    SelectedOption {
                        option_id: id.to_string(),
                        metadata: None,
                    }
                }
            })
            .collect();

        self.visited.insert(question.id.as_str());
        let next_id = next_for_selection(&question.id, &selected);
        self.answers.push(AnswerRecord {
            question_id: question.id.clone(),
            selected,
        });

        self.current = match next_id {
            Some(id) if self.visited.contains(id) => {
                tracing::debug!("Question '{}' already answered, ending flow", id);
                None
            }
            Some(id) => {
                let next_question = self.questionnaire.get(id);
                if next_question.is_none() {
                    tracing::warn!("Questionnaire has no question '{}', ending flow", id);
                }
                next_question
            }
            None => None,
        };

        Ok(self.current)
    }

    /// Finish the flow (complete or not) and hand over the answers
    pub fn finish(self) -> QuestionnaireOutcome {
        QuestionnaireOutcome {
            answers: self.answers,
        }
    }
}

/// Answers collected by a question flow
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionnaireOutcome {
    pub answers: Vec<AnswerRecord>,
}

impl QuestionnaireOutcome {
    fn answered(&self, question_id: &str) -> bool {
        self.answers.iter().any(|a| a.question_id == question_id)
    }

    /// The training location picked, if it was recognized
    pub fn training_location(&self) -> Option<TrainingLocation> {
        self.answers
            .iter()
            .find(|a| a.question_id == TRAINING_LOCATION)
            .and_then(|a| a.selected.first())
            .and_then(|s| TrainingLocation::parse(&s.option_id))
    }

    /// The `workout_location` value implied by the branch taken
    pub fn workout_location(&self) -> Option<&'static str> {
        if self.answered(GYM_EQUIPMENT_QUESTION) {
            Some(WorkoutLocation::Gym.as_str())
        } else if self.answered(HOME_EQUIPMENT_QUESTION) {
            if self.answered(BODYWEIGHT_ITEMS_QUESTION) {
                Some(WorkoutLocation::HomeBodyweight.as_str())
            } else {
                Some(WorkoutLocation::HomeEquipment.as_str())
            }
        } else if self.answered(OUTDOOR_EQUIPMENT_QUESTION) {
            Some(TrainingLocation::Outdoor.as_str())
        } else {
            None
        }
    }

    pub fn equipment(&self) -> BTreeSet<EquipmentId> {
        aggregate_equipment(&self.answers)
    }

    /// Fresh sources holding only the questionnaire result
    pub fn into_sources(self) -> RawEquipmentSources {
        let mut sources = RawEquipmentSources::default();
        sources.apply_questionnaire(self);
        sources
    }
}

impl RawEquipmentSources {
    /// Record a (re)taken questionnaire.
    ///
    /// Replaces the location and answers; legacy and scoped lists are kept.
    pub fn apply_questionnaire(&mut self, outcome: QuestionnaireOutcome) {
        self.workout_location = outcome.workout_location().map(str::to_string);
        self.answer_metadata = outcome.answers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve;

    #[test]
    fn test_location_transitions() {
        assert_eq!(next(TRAINING_LOCATION, "gym"), Some(GYM_EQUIPMENT_QUESTION));
        assert_eq!(next(TRAINING_LOCATION, "home"), Some(HOME_EQUIPMENT_QUESTION));
        assert_eq!(next(TRAINING_LOCATION, "outdoor"), Some(OUTDOOR_EQUIPMENT_QUESTION));
        assert_eq!(next(TRAINING_LOCATION, "unknown"), Some(HOME_EQUIPMENT_QUESTION));
        assert_eq!(next(TRAINING_LOCATION, ""), Some(HOME_EQUIPMENT_QUESTION));
    }

    #[test]
    fn test_no_equipment_leads_to_household_items() {
        for question in [
            HOME_EQUIPMENT_QUESTION,
            GYM_EQUIPMENT_QUESTION,
            OUTDOOR_EQUIPMENT_QUESTION,
        ] {
            assert_eq!(next(question, NO_EQUIPMENT), Some(BODYWEIGHT_ITEMS_QUESTION));
            assert_eq!(next(question, "dumbbells"), None);
        }
        assert_eq!(next(BODYWEIGHT_ITEMS_QUESTION, NO_EQUIPMENT), None);
    }

    #[test]
    fn test_gym_flow_asks_one_equipment_question() {
        let questionnaire = Questionnaire::builtin();
        let mut flow = QuestionFlow::new(&questionnaire);
        assert_eq!(flow.current().unwrap().id, TRAINING_LOCATION);

        let next_q = flow.answer(&["gym"]).unwrap().unwrap();
        assert_eq!(next_q.id, GYM_EQUIPMENT_QUESTION);

        let done = flow.answer(&["barbell", "bench"]).unwrap();
        assert!(done.is_none());
        assert!(flow.is_complete());

        let outcome = flow.finish();
        assert_eq!(outcome.training_location(), Some(TrainingLocation::Gym));
        assert_eq!(outcome.workout_location(), Some("gym"));
        assert_eq!(
            outcome.equipment().into_iter().collect::<Vec<_>>(),
            vec!["barbell".to_string(), "bench".to_string()]
        );
    }

    #[test]
    fn test_unrecognized_location_defaults_to_home() {
        let questionnaire = Questionnaire::builtin();
        let mut flow = QuestionFlow::new(&questionnaire);

        let next_q = flow.answer(&["basement"]).unwrap().unwrap();
        assert_eq!(next_q.id, HOME_EQUIPMENT_QUESTION);
        assert_eq!(flow.answers()[0].selected[0].option_id, "basement");
        assert!(flow.answers()[0].selected[0].metadata.is_none());
    }

    #[test]
    fn test_empty_location_answer_defaults_to_home() {
        let questionnaire = Questionnaire::builtin();
        let mut flow = QuestionFlow::new(&questionnaire);
        let empty: [&str; 0] = [];

        let next_q = flow.answer(&empty).unwrap().unwrap();
        assert_eq!(next_q.id, HOME_EQUIPMENT_QUESTION);
    }

    #[test]
    fn test_single_select_rejects_multiple_options() {
        let questionnaire = Questionnaire::builtin();
        let mut flow = QuestionFlow::new(&questionnaire);

        let result = flow.answer(&["home", "gym"]);
        assert!(matches!(result, Err(Error::Questionnaire(_))));
        assert_eq!(flow.current().unwrap().id, TRAINING_LOCATION);
    }

    #[test]
    fn test_answer_after_completion_fails() {
        let questionnaire = Questionnaire::builtin();
        let mut flow = QuestionFlow::new(&questionnaire);
        flow.answer(&["outdoor"]).unwrap();
        flow.answer(&["pullup_bar"]).unwrap();

        assert!(flow.is_complete());
        assert!(flow.answer(&["pullup_bar"]).is_err());
    }

    #[test]
    fn test_duplicate_selections_are_collapsed() {
        let questionnaire = Questionnaire::builtin();
        let mut flow = QuestionFlow::new(&questionnaire);
        flow.answer(&["home"]).unwrap();
        flow.answer(&["bench", "bench"]).unwrap();

        assert_eq!(flow.answers()[1].selected.len(), 1);
    }

    #[test]
    fn test_missing_target_question_ends_flow() {
        let mut questionnaire = Questionnaire::builtin();
        questionnaire
            .questions
            .retain(|q| q.id != BODYWEIGHT_ITEMS_QUESTION);
        let mut flow = QuestionFlow::new(&questionnaire);

        flow.answer(&["home"]).unwrap();
        assert!(flow.answer(&[NO_EQUIPMENT]).unwrap().is_none());

        let outcome = flow.finish();
        assert!(outcome.equipment().contains(BODYWEIGHT_SENTINEL));
    }

    #[test]
    fn test_no_equipment_user_never_starves() {
        let questionnaire = Questionnaire::builtin();
        let mut flow = QuestionFlow::new(&questionnaire);
        flow.answer(&["home"]).unwrap();
        flow.answer(&[NO_EQUIPMENT]).unwrap();
        flow.answer(&["nothing_available"]).unwrap();

        let sources = flow.finish().into_sources();
        assert_eq!(sources.workout_location.as_deref(), Some("home_bodyweight"));
        assert!(!resolve(&sources).is_empty());
    }

    #[test]
    fn test_retake_keeps_legacy_lists() {
        let mut sources = RawEquipmentSources {
            equipment: Some(vec!["barbell".into()]),
            workout_location: Some("gym".into()),
            ..Default::default()
        };

        let questionnaire = Questionnaire::builtin();
        let mut flow = QuestionFlow::new(&questionnaire);
        flow.answer(&["outdoor"]).unwrap();
        flow.answer(&["parallel_bars"]).unwrap();
        sources.apply_questionnaire(flow.finish());

        assert_eq!(sources.workout_location.as_deref(), Some("outdoor"));
        assert_eq!(sources.equipment, Some(vec!["barbell".to_string()]));
        let resolved = resolve(&sources);
        assert!(resolved.contains("barbell"));
        assert!(resolved.contains("parallel_bars"));
    }

    #[test]
    fn test_aggregate_skips_options_without_metadata() {
        let answers = vec![AnswerRecord {
            question_id: BODYWEIGHT_ITEMS_QUESTION.into(),
            selected: vec![
                SelectedOption {
                    option_id: "mat_available".into(),
                    metadata: Some(OptionMetadata::with_equipment(["mat"])),
                },
                SelectedOption {
                    option_id: "nothing_available".into(),
                    metadata: None,
                },
                SelectedOption {
                    option_id: "odd".into(),
                    metadata: Some(OptionMetadata::default()),
                },
            ],
        }];
        assert_eq!(
            aggregate_equipment(&answers),
            BTreeSet::from(["mat".to_string()])
        );
    }
}
