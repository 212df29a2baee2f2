pub mod gemini;
pub mod html;
pub mod model;
pub mod parse;
pub mod prompt;
pub mod service;
pub mod tasks;
pub mod vocabulary;

pub use gemini::{GeminiClient, GeminiClientConfig, GeminiError, TextGenerator};
pub use service::{AiService, ServiceConfig};
