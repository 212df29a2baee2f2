use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::gemini::TextGenerator;
use crate::model::{
    clamp_score, AiResponse, AnswerSuggestion, ChatReply, ChatUser, ContentImprovement, ContentKind,
    ModerationResult, PlatformInsights, PlatformReport, QuestionAnalysis, QuestionSummary,
    ResultSource, SpamDetection,
};
use crate::tasks::{
    self, AnalyzeQuestion, Chat, ChatMessage, ContentSubmission, DetectSpam, GenerateAnswer,
    GenerateTags, ImproveContent, Interpretation, ModerateContent, PlatformInsightsTask,
    QuestionDraft, Task,
};

/// Questions the platform report analyzes individually.
const REPORT_SAMPLE: usize = 5;
/// Average quality reported when no question could be analyzed.
const DEFAULT_AVERAGE_QUALITY: f64 = 85.0;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Simulated latency before a synthetic result is served.
    pub fallback_delay: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            fallback_delay: Duration::from_millis(1000),
        }
    }
}

/// The AI writing and moderation assistant.
///
/// Every capability makes at most one model call and always answers: when
/// the model is unavailable or its reply cannot be used, a synthetic result
/// of the same type is served and marked with [`ResultSource::Synthetic`].
/// Only blank required input is rejected (`success: false`).
#[derive(Clone)]
pub struct AiService {
    generator: Arc<dyn TextGenerator>,
    config: ServiceConfig,
}

impl AiService {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ServiceConfig) -> Self {
        Self { generator, config }
    }

    pub async fn analyze_question(&self, title: &str, content: &str) -> AiResponse<QuestionAnalysis> {
        self.run::<AnalyzeQuestion>(QuestionDraft::new(title, content)).await
    }

    pub async fn generate_answer_suggestion(
        &self,
        title: &str,
        content: &str,
    ) -> AiResponse<AnswerSuggestion> {
        self.run::<GenerateAnswer>(QuestionDraft::new(title, content)).await
    }

    pub async fn improve_content(&self, content: &str, kind: ContentKind) -> AiResponse<ContentImprovement> {
        self.run::<ImproveContent>(ContentSubmission::new(content, kind)).await
    }

    pub async fn detect_spam(&self, content: &str) -> AiResponse<SpamDetection> {
        self.run::<DetectSpam>(content.to_string()).await
    }

    pub async fn generate_tags(&self, content: &str) -> AiResponse<Vec<String>> {
        self.run::<GenerateTags>(content.to_string()).await
    }

    pub async fn generate_platform_insights(
        &self,
        questions: &[QuestionSummary],
    ) -> AiResponse<PlatformInsights> {
        self.run::<PlatformInsightsTask>(questions.to_vec()).await
    }

    pub async fn moderate_content(&self, content: &str, kind: ContentKind) -> AiResponse<ModerationResult> {
        self.run::<ModerateContent>(ContentSubmission::new(content, kind)).await
    }

    pub async fn chat(&self, message: &str, user: Option<ChatUser>) -> AiResponse<ChatReply> {
        self.run::<Chat>(ChatMessage {
            message: message.to_string(),
            user,
        })
        .await
    }

    /// Platform insights plus per-question quality and spam checks over the
    /// first [`REPORT_SAMPLE`] questions, run concurrently.
    pub async fn platform_report(&self, questions: &[QuestionSummary]) -> AiResponse<PlatformReport> {
        let insights = self.generate_platform_insights(questions).await;
        let insights_source = insights.source;
        let Some(insights) = insights.data else {
            return AiResponse::rejected(
                insights
                    .error
                    .unwrap_or_else(|| "platform insights unavailable".to_string()),
            );
        };

        let sample = &questions[..questions.len().min(REPORT_SAMPLE)];
        let checks = join_all(sample.iter().map(|q| async move {
            futures::join!(self.analyze_question(&q.title, &q.content), self.detect_spam(&q.content))
        }))
        .await;

        let mut quality_scores = Vec::new();
        let mut flagged_spam = 0;
        let mut source = insights_source;
        for (analysis, spam) in checks {
            if let Some(a) = analysis.data {
                quality_scores.push(a.quality_score);
                source = weaker(source, analysis.source);
            }
            if let Some(s) = spam.data {
                if s.is_spam {
                    flagged_spam += 1;
                }
                source = weaker(source, spam.source);
            }
        }

        let average_quality = if quality_scores.is_empty() {
            DEFAULT_AVERAGE_QUALITY
        } else {
            let mean = quality_scores.iter().sum::<f64>() / quality_scores.len() as f64;
            clamp_score(mean).unwrap_or(DEFAULT_AVERAGE_QUALITY)
        };

        info!(
            questions = questions.len(),
            analyzed = quality_scores.len(),
            flagged_spam,
            "platform report built"
        );

        AiResponse::ok(
            PlatformReport {
                insights,
                average_quality,
                analyzed_questions: quality_scores.len(),
                flagged_spam,
                top_tags: tasks::top_tags(questions),
            },
            source,
        )
    }

    /// Validate, ask once, interpret; fall back to synthetic data on any
    /// miss. The single place the always-answer policy is enforced.
    pub async fn run<T: Task>(&self, input: T::Input) -> AiResponse<T::Output> {
        if let Err(reason) = T::validate(&input) {
            warn!(capability = %T::CAPABILITY, reason = %reason, "rejecting request");
            return AiResponse::rejected(reason);
        }

        let prompt = T::prompt(&input);
        let reply = self.generator.generate(&prompt).await;
        let interpretation = match reply.as_deref() {
            Some(text) => T::interpret(&input, text),
            None => Interpretation::Unusable,
        };

        match interpretation {
            Interpretation::Model(data) => {
                debug!(capability = %T::CAPABILITY, "serving model result");
                AiResponse::ok(data, ResultSource::Model)
            }
            Interpretation::Heuristic(data) => {
                debug!(capability = %T::CAPABILITY, "model reply unstructured, serving heuristic result");
                AiResponse::ok(data, ResultSource::Heuristic)
            }
            Interpretation::Unusable => self.synthesize::<T>(&input, reply.is_some()).await,
        }
    }

    async fn synthesize<T: Task>(&self, input: &T::Input, had_reply: bool) -> AiResponse<T::Output> {
        if had_reply {
            warn!(capability = %T::CAPABILITY, "model reply unusable, serving synthetic result");
        } else {
            debug!(capability = %T::CAPABILITY, "no model reply, serving synthetic result");
        }
        if !self.config.fallback_delay.is_zero() {
            tokio::time::sleep(self.config.fallback_delay).await;
        }
        let data = T::synthesize(input, &mut rand::thread_rng());
        AiResponse::ok(data, ResultSource::Synthetic)
    }
}

/// The less trustworthy of two sources.
fn weaker(a: ResultSource, b: ResultSource) -> ResultSource {
    fn rank(s: ResultSource) -> u8 {
        match s {
            ResultSource::Model => 0,
            ResultSource::Heuristic => 1,
            ResultSource::Synthetic => 2,
        }
    }
    if rank(b) > rank(a) {
        b
    } else {
        a
    }
}
