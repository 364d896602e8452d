//! The `cmi` tracking tree.
//!
//! A typed record of the SCORM 1.2 data model. Objectives and interactions
//! are sparse records created on first write; elements outside the schema
//! live in [`Cmi::extensions`].

use crate::element::{
    CoreField, Element, InteractionField, ObjectiveField, PreferenceField, ScoreField,
    StudentDataField,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum length of `cmi.suspend_data`, in UTF-16 code units.
pub const SUSPEND_DATA_LIMIT: usize = 4096;

/// Why a value was refused by a validated element.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("'{0}' is not a lesson status")]
    InvalidStatus(String),

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("score {0} is outside 0..=100")]
    OutOfRange(f64),

    #[error("suspend data has {length} UTF-16 units, limit is {limit}")]
    TooLong { length: usize, limit: usize },
}

/// `cmi.core.lesson_status` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LessonStatus {
    #[serde(rename = "passed")]
    Passed,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "incomplete")]
    Incomplete,
    #[serde(rename = "browsed")]
    Browsed,
    #[default]
    #[serde(rename = "not attempted")]
    NotAttempted,
}

impl LessonStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Incomplete => "incomplete",
            Self::Browsed => "browsed",
            Self::NotAttempted => "not attempted",
        }
    }
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonStatus {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(Self::Passed),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "incomplete" => Ok(Self::Incomplete),
            "browsed" => Ok(Self::Browsed),
            "not attempted" => Ok(Self::NotAttempted),
            _ => Err(Rejection::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Score {
    pub raw: String,
    pub min: String,
    pub max: String,
    pub scaled: String,
}

impl Score {
    fn field(&self, field: ScoreField) -> &String {
        match field {
            ScoreField::Raw => &self.raw,
            ScoreField::Min => &self.min,
            ScoreField::Max => &self.max,
            ScoreField::Scaled => &self.scaled,
        }
    }

    fn field_mut(&mut self, field: ScoreField) -> &mut String {
        match field {
            ScoreField::Raw => &mut self.raw,
            ScoreField::Min => &mut self.min,
            ScoreField::Max => &mut self.max,
            ScoreField::Scaled => &mut self.scaled,
        }
    }
}

/// `cmi.core`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Core {
    pub student_id: String,
    pub student_name: String,
    pub lesson_location: String,
    pub credit: String,
    pub lesson_status: LessonStatus,
    pub entry: String,
    pub score: Score,
    pub total_time: String,
    pub lesson_mode: String,
    pub exit: String,
    pub session_time: String,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            student_id: String::new(),
            student_name: String::new(),
            lesson_location: String::new(),
            credit: String::new(),
            lesson_status: LessonStatus::NotAttempted,
            entry: String::new(),
            score: Score::default(),
            total_time: String::from("0000:00:00"),
            lesson_mode: String::from("normal"),
            exit: String::new(),
            session_time: String::from("0000:00:00"),
        }
    }
}

/// `cmi.student_data`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentData {
    pub mastery_score: String,
    pub max_time_allowed: String,
    pub time_limit_action: String,
}

/// `cmi.student_preference`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentPreference {
    pub audio: String,
    pub language: String,
    pub speed: String,
    pub text: String,
}

impl Default for StudentPreference {
    fn default() -> Self {
        Self {
            audio: String::from("0"),
            language: String::new(),
            speed: String::from("0"),
            text: String::from("0"),
        }
    }
}

/// `cmi.objectives.n`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Objective {
    pub id: String,
    pub score: Score,
    pub status: String,
}

/// `cmi.interactions.n`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interaction {
    pub id: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub weighting: String,
    pub student_response: String,
    pub result: String,
    pub latency: String,
}

/// The whole tracking tree of one learner in one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cmi {
    pub core: Core,
    pub suspend_data: String,
    pub launch_data: String,
    pub comments: String,
    pub objectives: BTreeMap<usize, Objective>,
    pub student_data: StudentData,
    pub student_preference: StudentPreference,
    pub interactions: BTreeMap<usize, Interaction>,
    /// Elements outside the schema, keyed by full path.
    pub extensions: BTreeMap<String, String>,
}

impl Cmi {
    /// Current value of an element; `None` if it was never set and is not
    /// part of the seeded schema.
    #[must_use]
    pub fn get(&self, element: &Element) -> Option<&str> {
        if let Element::Core(CoreField::LessonStatus) = element {
            return Some(self.core.lesson_status.as_str());
        }
        self.text(element).map(String::as_str)
    }

    /// Validate and store a value.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] of a validated element; nothing is changed.
    pub fn set(&mut self, element: &Element, value: &str) -> Result<(), Rejection> {
        match element {
            Element::Core(CoreField::LessonStatus) => {
                self.core.lesson_status = value.parse()?;
                return Ok(());
            }
            Element::Core(CoreField::Score(ScoreField::Raw)) => validate_raw_score(value)?,
            Element::SuspendData => validate_suspend_data(value)?,
            _ => {}
        }

        if let Some(slot) = self.text_mut(element) {
            *slot = value.to_string();
        }
        Ok(())
    }

    fn text(&self, element: &Element) -> Option<&String> {
        let slot = match element {
            Element::Core(field) => match field {
                CoreField::StudentId => &self.core.student_id,
                CoreField::StudentName => &self.core.student_name,
                CoreField::LessonLocation => &self.core.lesson_location,
                CoreField::Credit => &self.core.credit,
                CoreField::LessonStatus => return None,
                CoreField::Entry => &self.core.entry,
                CoreField::Score(score) => self.core.score.field(*score),
                CoreField::TotalTime => &self.core.total_time,
                CoreField::LessonMode => &self.core.lesson_mode,
                CoreField::Exit => &self.core.exit,
                CoreField::SessionTime => &self.core.session_time,
            },
            Element::SuspendData => &self.suspend_data,
            Element::LaunchData => &self.launch_data,
            Element::Comments => &self.comments,
            Element::StudentData(field) => match field {
                StudentDataField::MasteryScore => &self.student_data.mastery_score,
                StudentDataField::MaxTimeAllowed => &self.student_data.max_time_allowed,
                StudentDataField::TimeLimitAction => &self.student_data.time_limit_action,
            },
            Element::Preference(field) => match field {
                PreferenceField::Audio => &self.student_preference.audio,
                PreferenceField::Language => &self.student_preference.language,
                PreferenceField::Speed => &self.student_preference.speed,
                PreferenceField::Text => &self.student_preference.text,
            },
            Element::Objective(index, field) => {
                let objective = self.objectives.get(index)?;
                match field {
                    ObjectiveField::Id => &objective.id,
                    ObjectiveField::Score(score) => objective.score.field(*score),
                    ObjectiveField::Status => &objective.status,
                }
            }
            Element::Interaction(index, field) => {
                let interaction = self.interactions.get(index)?;
                interaction_slot(interaction, *field)
            }
            Element::Extension(path) => return self.extensions.get(path),
        };
        Some(slot)
    }

    fn text_mut(&mut self, element: &Element) -> Option<&mut String> {
        let slot = match element {
            Element::Core(field) => match field {
                CoreField::StudentId => &mut self.core.student_id,
                CoreField::StudentName => &mut self.core.student_name,
                CoreField::LessonLocation => &mut self.core.lesson_location,
                CoreField::Credit => &mut self.core.credit,
                CoreField::LessonStatus => return None,
                CoreField::Entry => &mut self.core.entry,
                CoreField::Score(score) => self.core.score.field_mut(*score),
                CoreField::TotalTime => &mut self.core.total_time,
                CoreField::LessonMode => &mut self.core.lesson_mode,
                CoreField::Exit => &mut self.core.exit,
                CoreField::SessionTime => &mut self.core.session_time,
            },
            Element::SuspendData => &mut self.suspend_data,
            Element::LaunchData => &mut self.launch_data,
            Element::Comments => &mut self.comments,
            Element::StudentData(field) => match field {
                StudentDataField::MasteryScore => &mut self.student_data.mastery_score,
                StudentDataField::MaxTimeAllowed => &mut self.student_data.max_time_allowed,
                StudentDataField::TimeLimitAction => &mut self.student_data.time_limit_action,
            },
            Element::Preference(field) => match field {
                PreferenceField::Audio => &mut self.student_preference.audio,
                PreferenceField::Language => &mut self.student_preference.language,
                PreferenceField::Speed => &mut self.student_preference.speed,
                PreferenceField::Text => &mut self.student_preference.text,
            },
            Element::Objective(index, field) => {
                let objective = self.objectives.entry(*index).or_default();
                match field {
                    ObjectiveField::Id => &mut objective.id,
                    ObjectiveField::Score(score) => objective.score.field_mut(*score),
                    ObjectiveField::Status => &mut objective.status,
                }
            }
            Element::Interaction(index, field) => {
                let interaction = self.interactions.entry(*index).or_default();
                interaction_slot_mut(interaction, *field)
            }
            Element::Extension(path) => self.extensions.entry(path.clone()).or_default(),
        };
        Some(slot)
    }
}

fn interaction_slot(interaction: &Interaction, field: InteractionField) -> &String {
    match field {
        InteractionField::Id => &interaction.id,
        InteractionField::Time => &interaction.time,
        InteractionField::Type => &interaction.kind,
        InteractionField::Weighting => &interaction.weighting,
        InteractionField::StudentResponse => &interaction.student_response,
        InteractionField::Result => &interaction.result,
        InteractionField::Latency => &interaction.latency,
    }
}

fn interaction_slot_mut(interaction: &mut Interaction, field: InteractionField) -> &mut String {
    match field {
        InteractionField::Id => &mut interaction.id,
        InteractionField::Time => &mut interaction.time,
        InteractionField::Type => &mut interaction.kind,
        InteractionField::Weighting => &mut interaction.weighting,
        InteractionField::StudentResponse => &mut interaction.student_response,
        InteractionField::Result => &mut interaction.result,
        InteractionField::Latency => &mut interaction.latency,
    }
}

/// An empty string clears the score; anything else must be a number in
/// `0..=100`, surrounding whitespace ignored.
fn validate_raw_score(value: &str) -> Result<(), Rejection> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    let score: f64 = trimmed
        .parse()
        .map_err(|_| Rejection::NotANumber(value.to_string()))?;
    if score.is_nan() {
        return Err(Rejection::NotANumber(value.to_string()));
    }
    if !(0.0..=100.0).contains(&score) {
        return Err(Rejection::OutOfRange(score));
    }
    Ok(())
}

fn validate_suspend_data(value: &str) -> Result<(), Rejection> {
    let length = value.encode_utf16().count();
    if length > SUSPEND_DATA_LIMIT {
        return Err(Rejection::TooLong {
            length,
            limit: SUSPEND_DATA_LIMIT,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(cmi: &mut Cmi, path: &str, value: &str) -> Result<(), Rejection> {
        cmi.set(&Element::parse(path), value)
    }

    fn get<'a>(cmi: &'a Cmi, path: &str) -> Option<&'a str> {
        cmi.get(&Element::parse(path))
    }

    #[test]
    fn seeded_defaults() {
        let cmi = Cmi::default();
        assert_eq!(get(&cmi, "cmi.core.lesson_status"), Some("not attempted"));
        assert_eq!(get(&cmi, "cmi.core.total_time"), Some("0000:00:00"));
        assert_eq!(get(&cmi, "cmi.core.lesson_mode"), Some("normal"));
        assert_eq!(get(&cmi, "cmi.student_preference.speed"), Some("0"));
        assert_eq!(get(&cmi, "cmi.core.score.raw"), Some(""));
        assert_eq!(get(&cmi, "cmi.objectives.0.id"), None);
        assert_eq!(get(&cmi, "cmi.unknown"), None);
    }

    #[test]
    fn lesson_status_vocabulary() {
        let mut cmi = Cmi::default();
        assert!(matches!(
            set(&mut cmi, "cmi.core.lesson_status", "bogus"),
            Err(Rejection::InvalidStatus(_))
        ));
        assert_eq!(cmi.core.lesson_status, LessonStatus::NotAttempted);

        for status in ["passed", "completed", "failed", "incomplete", "browsed", "not attempted"] {
            set(&mut cmi, "cmi.core.lesson_status", status).unwrap();
            assert_eq!(get(&cmi, "cmi.core.lesson_status"), Some(status));
        }
    }

    #[test]
    fn raw_score_range() {
        let mut cmi = Cmi::default();
        set(&mut cmi, "cmi.core.score.raw", "85").unwrap();
        assert_eq!(
            set(&mut cmi, "cmi.core.score.raw", "150"),
            Err(Rejection::OutOfRange(150.0))
        );
        assert!(matches!(
            set(&mut cmi, "cmi.core.score.raw", "abc"),
            Err(Rejection::NotANumber(_))
        ));
        assert!(matches!(
            set(&mut cmi, "cmi.core.score.raw", "NaN"),
            Err(Rejection::NotANumber(_))
        ));
        assert!(set(&mut cmi, "cmi.core.score.raw", "-0.5").is_err());
        assert_eq!(get(&cmi, "cmi.core.score.raw"), Some("85"));

        set(&mut cmi, "cmi.core.score.raw", " 100 ").unwrap();
        set(&mut cmi, "cmi.core.score.raw", "0").unwrap();
        set(&mut cmi, "cmi.core.score.raw", "").unwrap();
        assert_eq!(get(&cmi, "cmi.core.score.raw"), Some(""));
    }

    #[test]
    fn suspend_data_limit() {
        let mut cmi = Cmi::default();
        let at_limit = "x".repeat(SUSPEND_DATA_LIMIT);
        set(&mut cmi, "cmi.suspend_data", &at_limit).unwrap();

        let over = "y".repeat(SUSPEND_DATA_LIMIT + 1);
        assert_eq!(
            set(&mut cmi, "cmi.suspend_data", &over),
            Err(Rejection::TooLong {
                length: SUSPEND_DATA_LIMIT + 1,
                limit: SUSPEND_DATA_LIMIT
            })
        );
        assert_eq!(cmi.suspend_data, at_limit);
    }

    #[test]
    fn suspend_data_counts_utf16_units() {
        let mut cmi = Cmi::default();
        let at_limit = "\u{1F600}".repeat(SUSPEND_DATA_LIMIT / 2);
        set(&mut cmi, "cmi.suspend_data", &at_limit).unwrap();

        let over = format!("{at_limit}x");
        assert_eq!(
            set(&mut cmi, "cmi.suspend_data", &over),
            Err(Rejection::TooLong {
                length: SUSPEND_DATA_LIMIT + 1,
                limit: SUSPEND_DATA_LIMIT
            })
        );

        let astral = "\u{1F600}".repeat(SUSPEND_DATA_LIMIT);
        assert!(set(&mut cmi, "cmi.suspend_data", &astral).is_err());
        assert_eq!(cmi.suspend_data, at_limit);
    }

    #[test]
    fn objective_records_created_on_write() {
        let mut cmi = Cmi::default();
        set(&mut cmi, "cmi.objectives.1.score.raw", "250").unwrap();
        set(&mut cmi, "cmi.objectives.1.status", "whatever").unwrap();
        assert_eq!(cmi.objectives.len(), 1);
        assert_eq!(get(&cmi, "cmi.objectives.1.score.raw"), Some("250"));
        assert_eq!(get(&cmi, "cmi.objectives.1.id"), Some(""));
        assert_eq!(get(&cmi, "cmi.objectives.0.id"), None);
    }

    #[test]
    fn padded_index_is_a_separate_slot() {
        let mut cmi = Cmi::default();
        set(&mut cmi, "cmi.objectives.1.id", "canonical").unwrap();
        set(&mut cmi, "cmi.objectives.01.id", "padded").unwrap();
        assert_eq!(get(&cmi, "cmi.objectives.1.id"), Some("canonical"));
        assert_eq!(get(&cmi, "cmi.objectives.01.id"), Some("padded"));
        assert_eq!(cmi.objectives.len(), 1);
    }

    #[test]
    fn interactions_and_extensions() {
        let mut cmi = Cmi::default();
        set(&mut cmi, "cmi.interactions.0.type", "choice").unwrap();
        assert_eq!(cmi.interactions[&0].kind, "choice");

        set(&mut cmi, "cmi.interactions.0.correct_responses.0.pattern", "a").unwrap();
        set(&mut cmi, "adl.nav.request", "continue").unwrap();
        assert_eq!(
            get(&cmi, "cmi.interactions.0.correct_responses.0.pattern"),
            Some("a")
        );
        assert_eq!(get(&cmi, "adl.nav.request"), Some("continue"));
    }

    #[test]
    fn json_shape_uses_scorm_names() {
        let mut cmi = Cmi::default();
        set(&mut cmi, "cmi.core.lesson_status", "not attempted").unwrap();
        set(&mut cmi, "cmi.interactions.3.type", "numeric").unwrap();

        let json = serde_json::to_value(&cmi).unwrap();
        assert_eq!(json["core"]["lesson_status"], "not attempted");
        assert_eq!(json["interactions"]["3"]["type"], "numeric");

        let back: Cmi = serde_json::from_value(json).unwrap();
        assert_eq!(back, cmi);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cmi: Cmi =
            serde_json::from_str(r#"{"core":{"lesson_status":"passed"}}"#).unwrap();
        assert_eq!(cmi.core.lesson_status, LessonStatus::Passed);
        assert_eq!(cmi.core.lesson_mode, "normal");
        assert_eq!(cmi.student_preference.audio, "0");
    }
}
