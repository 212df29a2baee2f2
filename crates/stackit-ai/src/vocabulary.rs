//! Closed tag vocabularies and keyword matching over them.
//!
//! Matching is case-insensitive substring search, the same rule the tag
//! picker applies to free text. Results always use the canonical spelling
//! from the vocabulary.

use crate::model::{MAX_LIST_LEN, MAX_RELATED_TOPICS};

/// Tags the question analyzer may assign.
pub const ANALYSIS_TAGS: &[&str] = &[
    "JavaScript",
    "React",
    "TypeScript",
    "CSS",
    "HTML",
    "Node.js",
    "Python",
    "Java",
    "C++",
    "Career",
    "Mental Health",
    "Debugging",
    "Performance",
    "Best Practices",
    "API",
    "Database",
    "Frontend",
    "Backend",
    "DevOps",
    "Security",
    "Testing",
    "Mobile",
    "AI",
    "Machine Learning",
    "Data Science",
    "Web Development",
    "Software Engineering",
    "Algorithms",
    "Data Structures",
];

/// Wider vocabulary offered by the standalone tag generator.
pub const GENERATED_TAGS: &[&str] = &[
    "JavaScript",
    "React",
    "TypeScript",
    "CSS",
    "HTML",
    "Node.js",
    "Python",
    "Java",
    "C++",
    "Career",
    "Mental Health",
    "Debugging",
    "Performance",
    "Best Practices",
    "API",
    "Database",
    "Frontend",
    "Backend",
    "DevOps",
    "Security",
    "Testing",
    "Mobile",
    "AI",
    "Machine Learning",
    "Data Science",
    "Web Development",
    "Software Engineering",
    "Algorithms",
    "Data Structures",
    "UI/UX",
    "Cloud Computing",
    "Docker",
    "Git",
    "Linux",
    "Windows",
    "macOS",
    "iOS",
    "Android",
    "Vue.js",
    "Angular",
    "PHP",
    "Ruby",
    "Go",
    "Rust",
    "Swift",
    "Kotlin",
    "C#",
    ".NET",
    "Spring",
    "Django",
    "Flask",
    "Express",
    "MongoDB",
    "PostgreSQL",
    "MySQL",
    "Redis",
    "AWS",
    "Azure",
    "GCP",
    "Firebase",
    "GraphQL",
    "REST",
    "Microservices",
    "Agile",
    "Scrum",
];

/// Keyword list used when no model is available. Every entry is also in
/// both vocabularies above.
pub const FALLBACK_TAGS: &[&str] = &[
    "JavaScript",
    "React",
    "TypeScript",
    "CSS",
    "HTML",
    "Node.js",
    "Python",
    "Career",
    "Mental Health",
    "Debugging",
    "Performance",
    "Best Practices",
    "API",
    "Database",
    "Frontend",
    "Backend",
];

/// Topics worth linking from a generated answer.
pub const RELATED_TOPICS: &[&str] = &[
    "React",
    "JavaScript",
    "TypeScript",
    "CSS",
    "HTML",
    "Node.js",
    "API",
    "Database",
];

/// Canonical spelling of `candidate` if it names a tag in `vocabulary`.
pub fn canonical<'a>(vocabulary: &[&'a str], candidate: &str) -> Option<&'a str> {
    let candidate = candidate.trim();
    vocabulary
        .iter()
        .copied()
        .find(|tag| tag.eq_ignore_ascii_case(candidate))
}

/// Keep vocabulary members only, canonicalized, deduplicated, at most
/// [`MAX_LIST_LEN`].
pub fn restrict<I, S>(vocabulary: &[&str], candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for candidate in candidates {
        let Some(tag) = canonical(vocabulary, candidate.as_ref()) else {
            continue;
        };
        if !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
        if out.len() == MAX_LIST_LEN {
            break;
        }
    }
    out
}

/// Tags from [`FALLBACK_TAGS`] mentioned in `text`; the first three when
/// nothing matches.
pub fn fallback_tags(text: &str) -> Vec<String> {
    let matched = mentioned(FALLBACK_TAGS, text, MAX_LIST_LEN);
    if matched.is_empty() {
        FALLBACK_TAGS.iter().take(3).map(|t| t.to_string()).collect()
    } else {
        matched
    }
}

pub fn related_topics(text: &str) -> Vec<String> {
    mentioned(RELATED_TOPICS, text, MAX_RELATED_TOPICS)
}

fn mentioned(vocabulary: &[&str], text: &str, limit: usize) -> Vec<String> {
    let lower = text.to_lowercase();
    vocabulary
        .iter()
        .filter(|tag| lower.contains(&tag.to_lowercase()))
        .take(limit)
        .map(|tag| tag.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_tags_are_in_every_vocabulary() {
        for tag in FALLBACK_TAGS {
            assert!(ANALYSIS_TAGS.contains(tag), "{tag} missing from analysis tags");
            assert!(GENERATED_TAGS.contains(tag), "{tag} missing from generated tags");
        }
    }

    #[test]
    fn canonical_ignores_case_and_whitespace() {
        assert_eq!(canonical(ANALYSIS_TAGS, " node.js "), Some("Node.js"));
        assert_eq!(canonical(ANALYSIS_TAGS, "c++"), Some("C++"));
        assert_eq!(canonical(ANALYSIS_TAGS, "Haskell"), None);
    }

    #[test]
    fn restrict_dedupes_and_caps() {
        let tags = restrict(
            GENERATED_TAGS,
            ["react", "React", "Haskell", "go", "Rust", "Docker", "Git", "Linux"],
        );
        assert_eq!(tags, vec!["React", "Go", "Rust", "Docker", "Git"]);
    }

    #[test]
    fn fallback_tags_match_keywords() {
        let tags = fallback_tags("My React app has a CSS performance problem");
        assert_eq!(tags, vec!["React", "CSS", "Performance"]);
    }

    #[test]
    fn fallback_tags_default_when_nothing_matches() {
        assert_eq!(fallback_tags("bug it breaks"), vec!["JavaScript", "React", "TypeScript"]);
    }

    #[test]
    fn related_topics_capped_at_three() {
        let topics = related_topics("Use React with TypeScript, some CSS and an API over a database");
        assert_eq!(topics, vec!["React", "TypeScript", "CSS"]);
    }
}
