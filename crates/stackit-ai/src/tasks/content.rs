use rand::Rng;

use super::{owned, require, score_between, structured, Capability, Interpretation, Task};
use crate::html::format_as_html;
use crate::model::{ContentImprovement, ContentKind, ModerationResult, Severity, SpamDetection, MAX_LIST_LEN};
use crate::parse::Fields;
use crate::prompt;

const DEFAULT_CHANGES: [&str; 3] = [
    "Improved clarity and structure",
    "Enhanced technical details",
    "Better formatting and organization",
];

const SYNTHETIC_CHANGES: [&str; 4] = [
    "Improved clarity and structure",
    "Added technical details and examples",
    "Enhanced readability with proper formatting",
    "Included best practices and considerations",
];

const SPAM_KEYWORDS: [&str; 3] = ["spam", "promotional", "marketing"];

/// A post body plus what kind of post it is.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSubmission {
    pub content: String,
    pub kind: ContentKind,
}

impl ContentSubmission {
    pub fn new(content: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            content: content.into(),
            kind,
        }
    }
}

pub struct ImproveContent;

impl Task for ImproveContent {
    const CAPABILITY: Capability = Capability::ImproveContent;
    type Input = ContentSubmission;
    type Output = ContentImprovement;

    fn validate(input: &ContentSubmission) -> Result<(), String> {
        require("content", &input.content)
    }

    fn prompt(input: &ContentSubmission) -> String {
        prompt::improve_content(&input.content, input.kind)
    }

    fn interpret(input: &ContentSubmission, reply: &str) -> Interpretation<ContentImprovement> {
        if reply.trim().is_empty() {
            return Interpretation::Unusable;
        }
        structured(
            reply,
            |f| ContentImprovement {
                original: input.content.clone(),
                improved: f.text("improved").unwrap_or_else(|| format_as_html(reply)),
                changes: f
                    .strings("changes", MAX_LIST_LEN)
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| owned(&DEFAULT_CHANGES)),
                improvement_score: f.score("improvementScore", 85.0),
            },
            |raw| Interpretation::Heuristic(reformatted(input, raw)),
        )
    }

    fn synthesize(input: &ContentSubmission, rng: &mut impl Rng) -> ContentImprovement {
        let body = &input.content;
        let improved = match input.kind {
            ContentKind::Question => format!(
                "<h3>Problem Description</h3><p>{body}</p>\
                 <h3>Expected Outcome</h3><p>I expect the solution to provide a clear, working implementation with proper error handling.</p>\
                 <h3>What I've Tried</h3><p>I've researched the documentation but need guidance on the best approach.</p>"
            ),
            ContentKind::Answer | ContentKind::Comment => format!(
                "<h3>Solution Overview</h3><p>{body}</p>\
                 <h3>Implementation Details</h3><p>Here's a step-by-step breakdown of the solution with code examples and best practices.</p>\
                 <h3>Additional Resources</h3><p>For further reading, check the official documentation and related tutorials.</p>"
            ),
        };
        ContentImprovement {
            original: input.content.clone(),
            improved,
            changes: owned(&SYNTHETIC_CHANGES),
            improvement_score: score_between(rng, 80.0, 100.0),
        }
    }
}

/// Unstructured reply: treat the whole reply as the improved text.
fn reformatted(input: &ContentSubmission, raw: &str) -> ContentImprovement {
    ContentImprovement {
        original: input.content.clone(),
        improved: format_as_html(raw),
        changes: owned(&DEFAULT_CHANGES),
        improvement_score: 85.0,
    }
}

pub struct DetectSpam;

impl Task for DetectSpam {
    const CAPABILITY: Capability = Capability::DetectSpam;
    type Input = String;
    type Output = SpamDetection;

    fn validate(input: &String) -> Result<(), String> {
        require("content", input)
    }

    fn prompt(input: &String) -> String {
        prompt::detect_spam(input)
    }

    fn interpret(_input: &String, reply: &str) -> Interpretation<SpamDetection> {
        structured(reply, normalize_spam, |raw| {
            Interpretation::Heuristic(spam_keywords(raw))
        })
    }

    fn synthesize(_input: &String, _rng: &mut impl Rng) -> SpamDetection {
        SpamDetection {
            is_spam: false,
            confidence: 0.0,
            severity: Severity::Low,
            reasons: Vec::new(),
        }
    }
}

fn normalize_spam(f: Fields<'_>) -> SpamDetection {
    SpamDetection {
        is_spam: f.flag("isSpam").unwrap_or(false),
        confidence: f.score("confidence", 0.0),
        severity: f
            .text("severity")
            .and_then(|s| Severity::parse(&s))
            .unwrap_or_default(),
        reasons: f.strings("reasons", MAX_LIST_LEN).unwrap_or_default(),
    }
}

/// Verdict from keyword presence in a free-text reply.
fn spam_keywords(reply: &str) -> SpamDetection {
    let lower = reply.to_lowercase();
    let is_spam = SPAM_KEYWORDS.iter().any(|k| lower.contains(k));
    if is_spam {
        SpamDetection {
            is_spam,
            confidence: 75.0,
            severity: Severity::Medium,
            reasons: vec!["Detected promotional content".to_string()],
        }
    } else {
        SpamDetection {
            is_spam,
            confidence: 25.0,
            severity: Severity::Low,
            reasons: Vec::new(),
        }
    }
}

pub struct ModerateContent;

impl Task for ModerateContent {
    const CAPABILITY: Capability = Capability::ModerateContent;
    type Input = ContentSubmission;
    type Output = ModerationResult;

    fn validate(input: &ContentSubmission) -> Result<(), String> {
        require("content", &input.content)
    }

    fn prompt(input: &ContentSubmission) -> String {
        prompt::moderate_content(&input.content, input.kind)
    }

    fn interpret(_input: &ContentSubmission, reply: &str) -> Interpretation<ModerationResult> {
        structured(
            reply,
            |f| ModerationResult {
                approved: f.flag("approved").unwrap_or(true),
                confidence: f.score("confidence", 90.0),
                severity: f
                    .text("severity")
                    .and_then(|s| Severity::parse(&s))
                    .unwrap_or_default(),
                issues: f.strings("issues", MAX_LIST_LEN).unwrap_or_default(),
                recommendations: f.strings("recommendations", MAX_LIST_LEN).unwrap_or_default(),
            },
            |_| Interpretation::Unusable,
        )
    }

    fn synthesize(_input: &ContentSubmission, _rng: &mut impl Rng) -> ModerationResult {
        ModerationResult {
            approved: true,
            confidence: 90.0,
            severity: Severity::Low,
            issues: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spam_of(reply: &str) -> Interpretation<SpamDetection> {
        DetectSpam::interpret(&"BUY CHEAP WATCHES".to_string(), reply)
    }

    #[test]
    fn spam_json_is_normalized() {
        let reply = r#"```json
{"isSpam": true, "confidence": 130, "severity": "HIGH", "reasons": ["Promotional links", "Contact info"]}
```"#;
        assert_eq!(
            spam_of(reply),
            Interpretation::Model(SpamDetection {
                is_spam: true,
                confidence: 100.0,
                severity: Severity::High,
                reasons: owned(&["Promotional links", "Contact info"]),
            })
        );
    }

    #[test]
    fn spam_unknown_severity_is_low() {
        let Interpretation::Model(d) = spam_of(r#"{"isSpam": false, "severity": "critical"}"#) else {
            panic!("expected model result");
        };
        assert_eq!(d.severity, Severity::Low);
        assert_eq!(d.confidence, 0.0);
        assert!(d.reasons.is_empty());
    }

    #[test]
    fn spam_prose_uses_keywords() {
        let Interpretation::Heuristic(d) = spam_of("This reads like marketing copy.") else {
            panic!("expected heuristic result");
        };
        assert!(d.is_spam);
        assert_eq!(d.confidence, 75.0);
        assert_eq!(d.severity, Severity::Medium);

        let Interpretation::Heuristic(d) = spam_of("Looks like a genuine question.") else {
            panic!("expected heuristic result");
        };
        assert!(!d.is_spam);
        assert_eq!(d.confidence, 25.0);
        assert_eq!(d.severity, Severity::Low);
    }

    #[test]
    fn spam_verdict_is_stable_for_same_reply() {
        let reply = r#"{"isSpam": true, "confidence": 80, "severity": "medium"}"#;
        assert_eq!(spam_of(reply), spam_of(reply));
    }

    #[test]
    fn improvement_prefers_model_fields() {
        let input = ContentSubmission::new("how fix", ContentKind::Question);
        let reply = r#"{"improved": "<p>How do I fix this?</p>", "changes": ["Rephrased"], "improvementScore": "92"}"#;
        let Interpretation::Model(i) = ImproveContent::interpret(&input, reply) else {
            panic!("expected model result");
        };
        assert_eq!(i.original, "how fix");
        assert_eq!(i.improved, "<p>How do I fix this?</p>");
        assert_eq!(i.changes, vec!["Rephrased"]);
        assert_eq!(i.improvement_score, 92.0);
    }

    #[test]
    fn improvement_prose_is_reformatted() {
        let input = ContentSubmission::new("x", ContentKind::Answer);
        let Interpretation::Heuristic(i) = ImproveContent::interpret(&input, "Use **this** instead.") else {
            panic!("expected heuristic result");
        };
        assert_eq!(i.improved, "<p>Use <strong>this</strong> instead.</p>");
        assert_eq!(i.changes, owned(&DEFAULT_CHANGES));
        assert_eq!(i.improvement_score, 85.0);
    }

    #[test]
    fn synthetic_improvement_follows_kind() {
        let mut rng = rand::thread_rng();
        let q = ImproveContent::synthesize(&ContentSubmission::new("body", ContentKind::Question), &mut rng);
        assert!(q.improved.starts_with("<h3>Problem Description</h3><p>body</p>"));
        assert!((80.0..=100.0).contains(&q.improvement_score));
        let c = ImproveContent::synthesize(&ContentSubmission::new("body", ContentKind::Comment), &mut rng);
        assert!(c.improved.starts_with("<h3>Solution Overview</h3>"));
    }

    #[test]
    fn moderation_defaults_fill_missing_fields() {
        let input = ContentSubmission::new("you are all idiots", ContentKind::Comment);
        let Interpretation::Model(m) =
            ModerateContent::interpret(&input, r#"{"approved": false, "issues": ["Harassment"], "severity": "high"}"#)
        else {
            panic!("expected model result");
        };
        assert!(!m.approved);
        assert_eq!(m.confidence, 90.0);
        assert_eq!(m.severity, Severity::High);
        assert_eq!(m.issues, vec!["Harassment"]);
        assert!(m.recommendations.is_empty());
    }

    #[test]
    fn moderation_prose_is_unusable() {
        let input = ContentSubmission::new("hello", ContentKind::Answer);
        assert_eq!(
            ModerateContent::interpret(&input, "Looks fine to me."),
            Interpretation::Unusable
        );
    }
}
