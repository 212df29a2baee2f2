use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Upper bound for every score the layer hands out.
pub const MAX_SCORE: f64 = 100.0;
/// Upper bound for suggestion/tag/reason style lists.
pub const MAX_LIST_LEN: usize = 5;
/// Related topics attached to a generated answer.
pub const MAX_RELATED_TOPICS: usize = 3;

/// Where a result's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    /// Parsed from a model reply.
    Model,
    /// Derived from an unstructured model reply by keyword rules or reformatting.
    Heuristic,
    /// Generated locally because the model was unavailable or unusable.
    /// Also the value carried by rejected requests, which have no data.
    Synthetic,
}

/// Uniform envelope returned by every capability.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub source: ResultSource,
}

impl<T> AiResponse<T> {
    pub fn ok(data: T, source: ResultSource) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            source,
        }
    }

    /// Rejected input. Carries no data; `source` is
    /// [`ResultSource::Synthetic`] because nothing came from the model.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            source: ResultSource::Synthetic,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == ResultSource::Synthetic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// What kind of post a piece of content is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Question,
    Answer,
    Comment,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Comment => "comment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysis {
    pub clarity: f64,
    pub completeness: f64,
    pub quality_score: f64,
    pub readability_score: f64,
    pub technical_depth: f64,
    pub suggestions: Vec<String>,
    pub improved_title: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSuggestion {
    /// HTML.
    pub content: String,
    pub confidence: f64,
    pub sources: Vec<String>,
    pub code_examples: Vec<String>,
    pub related_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentImprovement {
    pub original: String,
    /// HTML.
    pub improved: String,
    pub changes: Vec<String>,
    pub improvement_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpamDetection {
    pub is_spam: bool,
    pub confidence: f64,
    pub severity: Severity,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResult {
    pub approved: bool,
    pub confidence: f64,
    pub severity: Severity,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInsights {
    pub trending_topics: Vec<String>,
    pub quality_trends: String,
    pub user_engagement: String,
    pub recommendations: Vec<String>,
    pub platform_health: f64,
}

/// The parts of a question that platform-level operations look at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSummary {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Who is talking to the assistant, if anyone is signed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChatUser {
    pub username: String,
    pub reputation: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChatReply {
    pub content: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformReport {
    pub insights: PlatformInsights,
    pub average_quality: f64,
    pub analyzed_questions: usize,
    pub flagged_spam: usize,
    pub top_tags: Vec<String>,
}

/// Clamp into `[0, 100]`. Non-finite input yields `None` so callers fall
/// back to their default.
pub fn clamp_score(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, MAX_SCORE))
}
