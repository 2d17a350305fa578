//! Video topic ideas.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A topic idea as returned by the language model, before it gets an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TopicIdea {
    /// Short title, usable directly as a video topic
    pub title: String,
    /// One or two sentences on what the video covers
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

impl TopicIdea {
    /// JSON Schema for an array of ideas, embedded in the prompt.
    pub fn list_json_schema() -> String {
        let schema = schemars::schema_for!(Vec<TopicIdea>);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
}

impl Topic {
    pub fn from_idea(id: impl Into<String>, idea: TopicIdea) -> Self {
        Self {
            id: id.into(),
            title: idea.title.trim().to_string(),
            description: idea.description,
            category: idea.category,
        }
    }
}

/// A batch of generated topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicList {
    pub topics: Vec<Topic>,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
}

impl TopicList {
    pub fn new(topics: Vec<Topic>) -> Self {
        Self {
            topics,
            generated_at: Utc::now(),
        }
    }

    /// One title per line, the format `vreel batch` reads.
    pub fn to_lines(&self) -> String {
        let mut out = String::new();
        for topic in &self.topics {
            out.push_str(&topic.title);
            out.push('\n');
        }
        out
    }

    /// Topic titles from a topics file.
    ///
    /// Accepts either a serialized `TopicList` or plain text with one title
    /// per line, where blank lines and `#` comments are skipped.
    pub fn titles_from_file(content: &str) -> Vec<String> {
        if let Ok(list) = serde_json::from_str::<TopicList>(content) {
            return list
                .topics
                .into_iter()
                .map(|t| t.title)
                .filter(|title| !title.trim().is_empty())
                .collect();
        }
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idea(title: &str) -> TopicIdea {
        TopicIdea {
            title: title.to_string(),
            description: "desc".to_string(),
            category: "tech".to_string(),
        }
    }

    fn list() -> TopicList {
        TopicList::new(vec![
            Topic::from_idea("topic-1", idea("Why builds are slow")),
            Topic::from_idea("topic-2", idea("  Caching 101 ")),
        ])
    }

    #[test]
    fn test_idea_defaults_optional_fields() {
        let idea: TopicIdea = serde_json::from_str(r#"{"title": "Only a title"}"#).unwrap();
        assert_eq!(idea.title, "Only a title");
        assert!(idea.description.is_empty());
        assert!(idea.category.is_empty());
    }

    #[test]
    fn test_list_serializes_generated_at_in_camel_case() {
        let json = serde_json::to_value(list()).unwrap();
        assert!(json.get("generatedAt").is_some());
        assert_eq!(json["topics"][1]["title"], "Caching 101");
    }

    #[test]
    fn test_lines_round_trip_through_topics_file() {
        let lines = list().to_lines();
        assert_eq!(lines, "Why builds are slow\nCaching 101\n");
        assert_eq!(
            TopicList::titles_from_file(&lines),
            vec!["Why builds are slow", "Caching 101"]
        );
    }

    #[test]
    fn test_titles_from_json_topics_file() {
        let json = serde_json::to_string_pretty(&list()).unwrap();
        assert_eq!(
            TopicList::titles_from_file(&json),
            vec!["Why builds are slow", "Caching 101"]
        );
    }

    #[test]
    fn test_titles_from_plain_file_skip_comments_and_blanks() {
        let content = "# ideas\n\n  First topic  \n# skipped\nSecond topic\n";
        assert_eq!(
            TopicList::titles_from_file(content),
            vec!["First topic", "Second topic"]
        );
    }

    #[test]
    fn test_list_schema_is_an_array() {
        let schema = TopicIdea::list_json_schema();
        assert!(schema.contains("\"array\""));
        assert!(schema.contains("\"title\""));
    }
}
