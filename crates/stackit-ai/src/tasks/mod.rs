//! One module per family of capabilities. Each capability is a unit type
//! implementing [`Task`]: how to ask, how to read the answer, and what to
//! serve when there is no usable answer. The request/fallback policy itself
//! lives in [`crate::service::AiService::run`].

mod content;
mod platform;
mod question;

use std::fmt;

use rand::Rng;

use crate::parse::{extract_object, Fields, Parsed};

pub use content::{ContentSubmission, DetectSpam, ImproveContent, ModerateContent};
pub use platform::{Chat, ChatMessage, PlatformInsightsTask};
pub(crate) use platform::top_tags;
pub use question::{AnalyzeQuestion, GenerateAnswer, GenerateTags, QuestionDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    AnalyzeQuestion,
    GenerateAnswer,
    ImproveContent,
    DetectSpam,
    GenerateTags,
    PlatformInsights,
    ModerateContent,
    Chat,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::AnalyzeQuestion,
        Capability::GenerateAnswer,
        Capability::ImproveContent,
        Capability::DetectSpam,
        Capability::GenerateTags,
        Capability::PlatformInsights,
        Capability::ModerateContent,
        Capability::Chat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::AnalyzeQuestion => "analyze_question",
            Self::GenerateAnswer => "generate_answer",
            Self::ImproveContent => "improve_content",
            Self::DetectSpam => "detect_spam",
            Self::GenerateTags => "generate_tags",
            Self::PlatformInsights => "generate_platform_insights",
            Self::ModerateContent => "moderate_content",
            Self::Chat => "chat",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a model reply turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation<T> {
    Model(T),
    Heuristic(T),
    /// Nothing usable; serve the synthetic result.
    Unusable,
}

pub trait Task {
    const CAPABILITY: Capability;
    type Input: Send + Sync;
    type Output: Send;

    /// Reject inputs whose required text is blank.
    fn validate(input: &Self::Input) -> Result<(), String>;

    fn prompt(input: &Self::Input) -> String;

    fn interpret(input: &Self::Input, reply: &str) -> Interpretation<Self::Output>;

    /// Result served when the model gave nothing usable. Scores are drawn
    /// from fixed ranges inside `[0, 100]`.
    fn synthesize(input: &Self::Input, rng: &mut impl Rng) -> Self::Output;
}

/// Parse stage for JSON-shaped tasks: a found object goes through
/// `normalize`, anything else through `unparsable`.
pub(crate) fn structured<T>(
    reply: &str,
    normalize: impl FnOnce(Fields<'_>) -> T,
    unparsable: impl FnOnce(&str) -> Interpretation<T>,
) -> Interpretation<T> {
    match extract_object(reply) {
        Parsed::Object(map) => Interpretation::Model(normalize(Fields(&map))),
        Parsed::Unparsable => unparsable(reply),
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

/// Random score in `[low, high]`, one decimal place.
pub(crate) fn score_between(rng: &mut impl Rng, low: f64, high: f64) -> f64 {
    (rng.gen_range(low..=high) * 10.0).round() / 10.0
}

pub(crate) fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_names_are_unique() {
        let mut names: Vec<&str> = Capability::ALL.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Capability::ALL.len());
    }

    #[test]
    fn score_between_stays_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let s = score_between(&mut rng, 60.0, 100.0);
            assert!((60.0..=100.0).contains(&s), "{s}");
        }
    }

    #[test]
    fn require_rejects_whitespace() {
        assert_eq!(require("title", "  "), Err("title must not be empty".to_string()));
        assert_eq!(require("title", "ok"), Ok(()));
    }
}
