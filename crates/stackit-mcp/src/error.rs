use stackit_ai::GeminiError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error("config error: {0}")]
    Config(String),
}
