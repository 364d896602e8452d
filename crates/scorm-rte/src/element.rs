//! Dotted element paths of the `cmi` data model.
//!
//! Every path a SCO can address is resolved once into an [`Element`]. Paths
//! outside the SCORM 1.2 schema become [`Element::Extension`] and are stored
//! verbatim.

/// `score.*` children shared by the core score and objective scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreField {
    Raw,
    Min,
    Max,
    Scaled,
}

/// `cmi.core.*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreField {
    StudentId,
    StudentName,
    LessonLocation,
    Credit,
    LessonStatus,
    Entry,
    Score(ScoreField),
    TotalTime,
    LessonMode,
    Exit,
    SessionTime,
}

/// `cmi.student_data.*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentDataField {
    MasteryScore,
    MaxTimeAllowed,
    TimeLimitAction,
}

/// `cmi.student_preference.*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceField {
    Audio,
    Language,
    Speed,
    Text,
}

/// `cmi.objectives.n.*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveField {
    Id,
    Score(ScoreField),
    Status,
}

/// `cmi.interactions.n.*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionField {
    Id,
    Time,
    Type,
    Weighting,
    StudentResponse,
    Result,
    Latency,
}

/// A resolved data model element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Core(CoreField),
    SuspendData,
    LaunchData,
    Comments,
    StudentData(StudentDataField),
    Preference(PreferenceField),
    Objective(usize, ObjectiveField),
    Interaction(usize, InteractionField),
    /// Any other path, kept as written.
    Extension(String),
}

impl Element {
    /// Resolve a dotted path such as `cmi.core.score.raw`.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        path.strip_prefix("cmi.")
            .and_then(resolve)
            .unwrap_or_else(|| Self::Extension(path.to_string()))
    }
}

fn resolve(rest: &str) -> Option<Element> {
    use CoreField as C;

    let element = match rest {
        "core.student_id" => Element::Core(C::StudentId),
        "core.student_name" => Element::Core(C::StudentName),
        "core.lesson_location" => Element::Core(C::LessonLocation),
        "core.credit" => Element::Core(C::Credit),
        "core.lesson_status" => Element::Core(C::LessonStatus),
        "core.entry" => Element::Core(C::Entry),
        "core.total_time" => Element::Core(C::TotalTime),
        "core.lesson_mode" => Element::Core(C::LessonMode),
        "core.exit" => Element::Core(C::Exit),
        "core.session_time" => Element::Core(C::SessionTime),
        "suspend_data" => Element::SuspendData,
        "launch_data" => Element::LaunchData,
        "comments" => Element::Comments,
        "student_data.mastery_score" => Element::StudentData(StudentDataField::MasteryScore),
        "student_data.max_time_allowed" => Element::StudentData(StudentDataField::MaxTimeAllowed),
        "student_data.time_limit_action" => {
            Element::StudentData(StudentDataField::TimeLimitAction)
        }
        "student_preference.audio" => Element::Preference(PreferenceField::Audio),
        "student_preference.language" => Element::Preference(PreferenceField::Language),
        "student_preference.speed" => Element::Preference(PreferenceField::Speed),
        "student_preference.text" => Element::Preference(PreferenceField::Text),
        _ => {
            if let Some(score) = rest.strip_prefix("core.score.") {
                return score_field(score).map(|field| Element::Core(C::Score(field)));
            }
            if let Some(tail) = rest.strip_prefix("objectives.") {
                let (index, field) = indexed(tail)?;
                return objective_field(field).map(|field| Element::Objective(index, field));
            }
            if let Some(tail) = rest.strip_prefix("interactions.") {
                let (index, field) = indexed(tail)?;
                return interaction_field(field).map(|field| Element::Interaction(index, field));
            }
            return None;
        }
    };
    Some(element)
}

/// Split `3.score.raw` into `(3, "score.raw")`.
///
/// Only canonical indices resolve; `01` stays a distinct extension path.
fn indexed(tail: &str) -> Option<(usize, &str)> {
    let (index, field) = tail.split_once('.')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if index.len() > 1 && index.starts_with('0') {
        return None;
    }
    Some((index.parse().ok()?, field))
}

fn score_field(name: &str) -> Option<ScoreField> {
    match name {
        "raw" => Some(ScoreField::Raw),
        "min" => Some(ScoreField::Min),
        "max" => Some(ScoreField::Max),
        "scaled" => Some(ScoreField::Scaled),
        _ => None,
    }
}

fn objective_field(name: &str) -> Option<ObjectiveField> {
    match name {
        "id" => Some(ObjectiveField::Id),
        "status" => Some(ObjectiveField::Status),
        _ => name
            .strip_prefix("score.")
            .and_then(score_field)
            .map(ObjectiveField::Score),
    }
}

fn interaction_field(name: &str) -> Option<InteractionField> {
    match name {
        "id" => Some(InteractionField::Id),
        "time" => Some(InteractionField::Time),
        "type" => Some(InteractionField::Type),
        "weighting" => Some(InteractionField::Weighting),
        "student_response" => Some(InteractionField::StudentResponse),
        "result" => Some(InteractionField::Result),
        "latency" => Some(InteractionField::Latency),
        _ => None,
    }
}
