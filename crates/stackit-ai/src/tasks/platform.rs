use std::collections::HashMap;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use super::{owned, require, structured, Capability, Interpretation, Task};
use crate::model::{ChatReply, ChatUser, PlatformInsights, QuestionSummary, MAX_LIST_LEN};
use crate::prompt;

const CANNED_TOPICS: [&str; 3] = ["JavaScript", "React", "Career"];
const CANNED_QUALITY_TRENDS: &str = "Questions are showing good technical depth";
const CANNED_ENGAGEMENT: &str = "Active community participation";
const CANNED_RECOMMENDATIONS: [&str; 3] = [
    "Encourage more detailed questions",
    "Promote expert participation",
    "Improve response times",
];
const CANNED_HEALTH: f64 = 85.0;

const CHAT_CONFIDENCE: f64 = 95.0;
const CHAT_FALLBACK_CONFIDENCE: f64 = 50.0;
const CHAT_FALLBACK: &str =
    "I'm having trouble generating a response right now. Could you try asking your question again?";

/// A reply that is only a number, such as a leaked confidence score.
static BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+%?$").expect("valid regex"));

pub struct PlatformInsightsTask;

impl Task for PlatformInsightsTask {
    const CAPABILITY: Capability = Capability::PlatformInsights;
    type Input = Vec<QuestionSummary>;
    type Output = PlatformInsights;

    /// An empty platform is still a platform.
    fn validate(_input: &Vec<QuestionSummary>) -> Result<(), String> {
        Ok(())
    }

    fn prompt(input: &Vec<QuestionSummary>) -> String {
        prompt::platform_insights(input)
    }

    fn interpret(input: &Vec<QuestionSummary>, reply: &str) -> Interpretation<PlatformInsights> {
        structured(
            reply,
            |f| PlatformInsights {
                trending_topics: f
                    .strings("trendingTopics", MAX_LIST_LEN)
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| trending_or_canned(input)),
                quality_trends: f
                    .text("qualityTrends")
                    .unwrap_or_else(|| CANNED_QUALITY_TRENDS.to_string()),
                user_engagement: f
                    .text("userEngagement")
                    .unwrap_or_else(|| CANNED_ENGAGEMENT.to_string()),
                recommendations: f
                    .strings("recommendations", MAX_LIST_LEN)
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| owned(&CANNED_RECOMMENDATIONS)),
                platform_health: f.score("platformHealth", CANNED_HEALTH),
            },
            |_| Interpretation::Unusable,
        )
    }

    fn synthesize(input: &Vec<QuestionSummary>, _rng: &mut impl Rng) -> PlatformInsights {
        PlatformInsights {
            trending_topics: trending_or_canned(input),
            quality_trends: CANNED_QUALITY_TRENDS.to_string(),
            user_engagement: CANNED_ENGAGEMENT.to_string(),
            recommendations: owned(&CANNED_RECOMMENDATIONS),
            platform_health: CANNED_HEALTH,
        }
    }
}

/// Most used tags, ties broken alphabetically, at most [`MAX_LIST_LEN`].
pub(crate) fn top_tags(questions: &[QuestionSummary]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in questions.iter().flat_map(|q| q.tags.iter()) {
        let tag = tag.trim();
        if !tag.is_empty() {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(MAX_LIST_LEN)
        .map(|(tag, _)| tag.to_string())
        .collect()
}

fn trending_or_canned(questions: &[QuestionSummary]) -> Vec<String> {
    let tags = top_tags(questions);
    if tags.is_empty() {
        owned(&CANNED_TOPICS)
    } else {
        tags
    }
}

/// A message for the assistant, with whoever is signed in.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub message: String,
    pub user: Option<ChatUser>,
}

pub struct Chat;

impl Task for Chat {
    const CAPABILITY: Capability = Capability::Chat;
    type Input = ChatMessage;
    type Output = ChatReply;

    fn validate(input: &ChatMessage) -> Result<(), String> {
        require("message", &input.message)
    }

    fn prompt(input: &ChatMessage) -> String {
        prompt::chat(input.message.trim(), input.user.as_ref())
    }

    fn interpret(_input: &ChatMessage, reply: &str) -> Interpretation<ChatReply> {
        let content = reply.trim();
        if content.is_empty() || BARE_NUMBER.is_match(content) {
            return Interpretation::Unusable;
        }
        Interpretation::Model(ChatReply {
            content: content.to_string(),
            confidence: CHAT_CONFIDENCE,
        })
    }

    fn synthesize(_input: &ChatMessage, _rng: &mut impl Rng) -> ChatReply {
        ChatReply {
            content: CHAT_FALLBACK.to_string(),
            confidence: CHAT_FALLBACK_CONFIDENCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(title: &str, tags: &[&str]) -> QuestionSummary {
        QuestionSummary {
            title: title.to_string(),
            content: String::new(),
            tags: owned(tags),
        }
    }

    #[test]
    fn top_tags_rank_by_count_then_name() {
        let questions = vec![
            question("a", &["React", "CSS"]),
            question("b", &["React", "Career"]),
            question("c", &["CSS", "React", " "]),
            question("d", &["API"]),
        ];
        assert_eq!(top_tags(&questions), vec!["React", "CSS", "API", "Career"]);
    }

    #[test]
    fn insights_fill_gaps_from_defaults() {
        let questions = vec![question("a", &["Rust"])];
        let reply = r#"{"trendingTopics": [], "qualityTrends": "Improving", "platformHealth": 140}"#;
        let Interpretation::Model(i) = PlatformInsightsTask::interpret(&questions, reply) else {
            panic!("expected model result");
        };
        assert_eq!(i.trending_topics, vec!["Rust"]);
        assert_eq!(i.quality_trends, "Improving");
        assert_eq!(i.user_engagement, CANNED_ENGAGEMENT);
        assert_eq!(i.recommendations, owned(&CANNED_RECOMMENDATIONS));
        assert_eq!(i.platform_health, 100.0);
    }

    #[test]
    fn synthetic_insights_without_tags_are_canned() {
        let mut rng = rand::thread_rng();
        let i = PlatformInsightsTask::synthesize(&Vec::new(), &mut rng);
        assert_eq!(i.trending_topics, owned(&CANNED_TOPICS));
        assert_eq!(i.platform_health, CANNED_HEALTH);
    }

    #[test]
    fn chat_trims_reply() {
        let input = ChatMessage {
            message: "how do I earn reputation?".to_string(),
            user: None,
        };
        assert_eq!(
            Chat::interpret(&input, "  Answer questions you know well!  \n"),
            Interpretation::Model(ChatReply {
                content: "Answer questions you know well!".to_string(),
                confidence: CHAT_CONFIDENCE,
            })
        );
        assert_eq!(Chat::interpret(&input, "   "), Interpretation::Unusable);
    }

    #[test]
    fn chat_number_only_reply_is_unusable() {
        let input = ChatMessage {
            message: "how confident are you?".to_string(),
            user: None,
        };
        assert_eq!(Chat::interpret(&input, "95%"), Interpretation::Unusable);
        assert_eq!(Chat::interpret(&input, " 42\n"), Interpretation::Unusable);
        assert!(matches!(
            Chat::interpret(&input, "About 95% of questions get an answer."),
            Interpretation::Model(_)
        ));
    }
}
