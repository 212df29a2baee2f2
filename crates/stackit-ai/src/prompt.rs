//! Prompt text for each capability. Pure string building; no I/O.

use crate::model::{ChatUser, ContentKind, QuestionSummary};
use crate::vocabulary::{ANALYSIS_TAGS, GENERATED_TAGS};

/// Titles of the most recent questions quoted in the insights prompt.
const RECENT_TITLES: usize = 10;

pub fn analyze_question(title: &str, content: &str) -> String {
    format!(
        r#"As an expert Q&A platform moderator, analyze this question and provide a comprehensive JSON response:

Question Title: "{title}"
Question Content: "{content}"

Provide analysis in this exact JSON format:
{{
  "clarity": number (0-100),
  "completeness": number (0-100),
  "qualityScore": number (0-100),
  "readabilityScore": number (0-100),
  "technicalDepth": number (0-100),
  "suggestions": [
    "specific improvement suggestion 1",
    "specific improvement suggestion 2",
    "specific improvement suggestion 3"
  ],
  "improvedTitle": "better version of the title",
  "tags": ["tag1", "tag2", "tag3", "tag4", "tag5"]
}}

Evaluation criteria:
- Clarity: How clear and understandable is the question?
- Completeness: Does it have enough detail to be answered?
- Quality Score: Overall question quality
- Readability: How easy is it to read and understand?
- Technical Depth: How technically detailed is the question?

For tags, choose from: {tags}

Provide specific, actionable suggestions for improvement."#,
        tags = ANALYSIS_TAGS.join(", "),
    )
}

pub fn generate_answer(title: &str, content: &str) -> String {
    format!(
        r#"As an expert developer and technical writer, provide a comprehensive answer to this question:

Question: "{title}"
Details: "{content}"

Please provide a detailed, well-structured answer that includes:

1. **Clear Explanation**: Start with a concise explanation of the solution
2. **Code Examples**: Provide practical, working code examples with comments
3. **Best Practices**: Include relevant best practices and considerations
4. **Step-by-Step Guide**: Break down complex solutions into steps
5. **Additional Resources**: Mention related concepts or further reading

Format your response as Markdown:
- Use ### for section headings
- Use blank lines between paragraphs
- Use fenced ``` blocks for code
- Use - or 1. for lists
- Use **bold** for emphasis and *italics* for subtle emphasis

Make the answer comprehensive but easy to understand, suitable for developers of various skill levels."#
    )
}

pub fn improve_content(content: &str, kind: ContentKind) -> String {
    let kind = kind.as_str();
    format!(
        r#"As an expert technical writer and Q&A platform moderator, improve this {kind}:

Original {kind}:
"{content}"

Please improve the content by:
1. Enhancing clarity and structure
2. Adding proper formatting and organization
3. Improving technical accuracy and completeness
4. Making it more engaging and helpful
5. Ensuring proper grammar and readability

Return a JSON response with this format:
{{
  "improved": "the improved content as HTML",
  "changes": [
    "specific change 1",
    "specific change 2",
    "specific change 3"
  ],
  "improvementScore": number (0-100)
}}

Use proper HTML formatting in the improved content:
- <h3> for headings
- <p> for paragraphs
- <strong> for emphasis
- <ul>/<li> for lists
- <pre><code> for code blocks
- <em> for subtle emphasis"#
    )
}

pub fn detect_spam(content: &str) -> String {
    format!(
        r#"Analyze this content for spam indicators and respond with JSON:

Content: "{content}"

Analyze for:
- Promotional language and marketing speak
- Excessive links or contact information
- Repetitive or low-quality content
- Off-topic or irrelevant content
- Suspicious patterns or bot-like behavior
- Inappropriate commercial content

Respond with this JSON format:
{{
  "isSpam": boolean,
  "confidence": number (0-100),
  "severity": "low" | "medium" | "high",
  "reasons": [
    "specific reason 1",
    "specific reason 2"
  ]
}}"#
    )
}

pub fn generate_tags(content: &str) -> String {
    format!(
        r#"Generate 3-5 relevant tags for this content. Choose from common programming and technology topics:

Content: "{content}"

Available tags: {tags}

Return only the tag names separated by commas, maximum 5 tags."#,
        tags = GENERATED_TAGS.join(", "),
    )
}

pub fn platform_insights(questions: &[QuestionSummary]) -> String {
    let recent = questions
        .iter()
        .take(RECENT_TITLES)
        .map(|q| format!("\"{}\"", q.title))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"Analyze this Q&A platform data and provide insights:

Platform Data:
- Total Questions: {total}
- Recent Activity: {recent}

Provide insights in JSON format:
{{
  "trendingTopics": ["topic1", "topic2", "topic3"],
  "qualityTrends": "description of quality trends",
  "userEngagement": "description of user engagement",
  "recommendations": [
    "recommendation 1",
    "recommendation 2",
    "recommendation 3"
  ],
  "platformHealth": number (0-100)
}}"#,
        total = questions.len(),
    )
}

pub fn moderate_content(content: &str, kind: ContentKind) -> String {
    let kind = kind.as_str();
    format!(
        r#"As a content moderator, analyze this {kind} for policy violations:

Content: "{content}"

Check for:
- Inappropriate language or harassment
- Spam or promotional content
- Off-topic or irrelevant content
- Code of conduct violations
- Quality issues

Respond with JSON:
{{
  "approved": boolean,
  "confidence": number (0-100),
  "issues": [
    "issue 1",
    "issue 2"
  ],
  "severity": "low" | "medium" | "high",
  "recommendations": [
    "recommendation 1",
    "recommendation 2"
  ]
}}"#
    )
}

pub fn chat(message: &str, user: Option<&ChatUser>) -> String {
    let user_context = match user {
        Some(u) => format!(
            "User is logged in as {} with {} reputation",
            u.username, u.reputation
        ),
        None => "User is not logged in".to_string(),
    };
    format!(
        r#"You are Stacky, an enthusiastic and knowledgeable AI assistant for StackIt, a Q&A platform for developers and learners.

Your personality:
- Friendly, encouraging, and genuinely helpful
- Enthusiastic about coding and learning
- Conversational and warm, like talking to a knowledgeable friend
- Provide specific, actionable advice
- Ask follow-up questions when helpful

Context about StackIt:
- Users can ask questions, provide answers, vote, and earn reputation
- Has AI-powered features for content analysis and suggestions
- Supports rich text editing, tags, anonymous posting
- Has expert users, badges, and a reputation system
- Includes an admin panel and content moderation

User context: {user_context}

User message: "{message}"

Guidelines for your response:
- Be conversational and helpful (2-4 sentences usually)
- If it's about StackIt features, explain them
- If it's about coding/technical topics, provide practical advice
- If it's about community/reputation, share engagement strategies
- If it's general conversation, be friendly and redirect to how you can help
- End with a question or suggestion when appropriate"#
    )
}
