use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;

use stackit_ai::model::{
    AiResponse, AnswerSuggestion, ChatReply, ChatUser, ContentImprovement, ContentKind,
    ModerationResult, PlatformInsights, PlatformReport, QuestionAnalysis, QuestionSummary,
    SpamDetection,
};
use stackit_ai::AiService;

#[derive(Clone)]
pub struct StackItServer {
    ai: AiService,
    tool_router: ToolRouter<StackItServer>,
}

impl StackItServer {
    pub fn new(ai: AiService) -> Self {
        Self {
            ai,
            tool_router: Self::tool_router(),
        }
    }
}

fn required(field: &str, value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(value.to_string())
}

#[derive(Debug, Deserialize, JsonSchema)]
struct QuestionParams {
    title: String,
    /// Question body; may contain HTML.
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ContentParams {
    content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct KindedContentParams {
    content: String,
    kind: ContentKind,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct QuestionsParams {
    /// Most recent first.
    questions: Vec<QuestionSummary>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ChatParams {
    message: String,
    #[serde(default)]
    user: Option<ChatUser>,
}

#[tool_router]
impl StackItServer {
    #[tool(description = "Score a question draft for clarity, completeness, quality, readability and technical depth. Returns suggestions, an improved title and tags from the platform vocabulary.")]
    async fn analyze_question(
        &self,
        Parameters(params): Parameters<QuestionParams>,
    ) -> Result<Json<AiResponse<QuestionAnalysis>>, String> {
        let title = required("title", &params.title)?;
        Ok(Json(self.ai.analyze_question(&title, &params.content).await))
    }

    #[tool(description = "Draft an HTML answer for a question, with extracted code examples, related topics and a confidence score.")]
    async fn generate_answer(
        &self,
        Parameters(params): Parameters<QuestionParams>,
    ) -> Result<Json<AiResponse<AnswerSuggestion>>, String> {
        let title = required("title", &params.title)?;
        Ok(Json(
            self.ai
                .generate_answer_suggestion(&title, &params.content)
                .await,
        ))
    }

    #[tool(description = "Rewrite a question, answer or comment for clarity and structure. Returns the improved HTML and a list of changes.")]
    async fn improve_content(
        &self,
        Parameters(params): Parameters<KindedContentParams>,
    ) -> Result<Json<AiResponse<ContentImprovement>>, String> {
        let content = required("content", &params.content)?;
        Ok(Json(self.ai.improve_content(&content, params.kind).await))
    }

    #[tool(description = "Classify content as spam or not, with confidence, severity and reasons.")]
    async fn detect_spam(
        &self,
        Parameters(params): Parameters<ContentParams>,
    ) -> Result<Json<AiResponse<SpamDetection>>, String> {
        let content = required("content", &params.content)?;
        Ok(Json(self.ai.detect_spam(&content).await))
    }

    #[tool(description = "Suggest up to five tags for a piece of content, drawn from the platform tag vocabulary.")]
    async fn generate_tags(
        &self,
        Parameters(params): Parameters<ContentParams>,
    ) -> Result<Json<AiResponse<Vec<String>>>, String> {
        let content = required("content", &params.content)?;
        Ok(Json(self.ai.generate_tags(&content).await))
    }

    #[tool(description = "Summarize platform health from a list of recent questions: trending topics, quality trends, engagement and recommendations.")]
    async fn generate_platform_insights(
        &self,
        Parameters(params): Parameters<QuestionsParams>,
    ) -> Result<Json<AiResponse<PlatformInsights>>, String> {
        Ok(Json(
            self.ai.generate_platform_insights(&params.questions).await,
        ))
    }

    #[tool(description = "Moderate a question, answer or comment. Returns approval, confidence, severity, issues and recommendations.")]
    async fn moderate_content(
        &self,
        Parameters(params): Parameters<KindedContentParams>,
    ) -> Result<Json<AiResponse<ModerationResult>>, String> {
        let content = required("content", &params.content)?;
        Ok(Json(self.ai.moderate_content(&content, params.kind).await))
    }

    #[tool(description = "Ask the platform assistant a question about programming or using the site. Optionally pass the signed-in user for a personalized reply.")]
    async fn chat(
        &self,
        Parameters(params): Parameters<ChatParams>,
    ) -> Result<Json<AiResponse<ChatReply>>, String> {
        let message = required("message", &params.message)?;
        Ok(Json(self.ai.chat(&message, params.user).await))
    }

    #[tool(description = "Platform insights plus quality and spam checks over the five most recent questions, with average quality, spam count and top tags.")]
    async fn platform_report(
        &self,
        Parameters(params): Parameters<QuestionsParams>,
    ) -> Result<Json<AiResponse<PlatformReport>>, String> {
        Ok(Json(self.ai.platform_report(&params.questions).await))
    }
}

#[tool_handler]
impl ServerHandler for StackItServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "stackit-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Q&A platform writing and moderation assistant backed by Gemini. Every tool returns \
{success, data, error, source}; source is model, heuristic or synthetic. Without GEMINI_API_KEY \
all results are synthetic placeholders. Use analyze_question/improve_content/generate_tags while \
drafting, detect_spam/moderate_content before publishing, and platform_report for dashboards."
                    .to_string(),
            ),
        }
    }
}
