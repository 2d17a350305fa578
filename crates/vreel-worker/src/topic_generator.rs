//! Topic idea generation via the Anthropic Messages API.
//!
//! Produces a `TopicList` whose titles feed `vreel batch`.

use std::time::Instant;

use tracing::{debug, info};
use uuid::Uuid;
use vreel_models::{Topic, TopicIdea, TopicList};

use crate::anthropic::{strip_code_fence, MessagesClient};
use crate::config::AnthropicConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::metrics;

const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.8;
const COUNT_PLACEHOLDER: &str = "{{count}}";

/// Largest batch one request may ask for.
pub const MAX_TOPIC_COUNT: usize = 50;

/// Built-in prompt; `{{count}}` is replaced with the number of topics.
pub const TOPIC_PROMPT_TEMPLATE: &str = r#"You plan a channel of 60-second vertical explainer videos.

Suggest {{count}} distinct video topics. Each one should:
- name a single concrete problem or question a viewer can recognise in a few seconds
- be answerable with two or three practical tips
- work as a spoken title of at most twelve words

Give each topic a one or two sentence description and a one-word category.
Do not repeat topics or reuse the same angle twice."#;

/// Generates batches of topic ideas.
pub struct TopicGenerator {
    client: MessagesClient,
}

impl TopicGenerator {
    pub fn new(config: &AnthropicConfig) -> WorkerResult<Self> {
        let client = MessagesClient::new(config, WorkerError::TopicGeneration)?;
        Ok(Self { client })
    }

    /// Build the full prompt for `count` topics, including the output schema.
    pub fn build_prompt(&self, count: usize) -> String {
        format!(
            "{}\n\nReturn ONLY a JSON array, with no commentary, matching this JSON Schema:\n{}",
            TOPIC_PROMPT_TEMPLATE.replace(COUNT_PLACEHOLDER, &count.to_string()),
            TopicIdea::list_json_schema()
        )
    }

    /// Ask the model for `count` topics and assign each one an id.
    pub async fn generate(&self, count: usize) -> WorkerResult<TopicList> {
        if count == 0 || count > MAX_TOPIC_COUNT {
            return Err(WorkerError::invalid_input(format!(
                "topic count must be between 1 and {}, got {}",
                MAX_TOPIC_COUNT, count
            )));
        }

        info!(model = %self.client.model(), count, "Generating topics");
        let start = Instant::now();
        let result = self.request(count).await;
        metrics::record_stage("topics", result.is_ok(), start.elapsed().as_secs_f64());

        let ideas = result?;
        if ideas.len() != count {
            debug!(requested = count, received = ideas.len(), "Topic count differs from request");
        }

        let topics: Vec<Topic> = ideas
            .into_iter()
            .map(|idea| Topic::from_idea(new_topic_id(), idea))
            .collect();
        info!(topics = topics.len(), "Topics generated");
        Ok(TopicList::new(topics))
    }

    async fn request(&self, count: usize) -> WorkerResult<Vec<TopicIdea>> {
        let prompt = self.build_prompt(count);
        let text = self
            .client
            .complete(&prompt, MAX_TOKENS, Some(TEMPERATURE))
            .await?;
        debug!(chars = text.len(), "Received topics response");
        parse_topics(&text)
    }
}

fn new_topic_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("topic-{}", &uuid[..12])
}

/// Parse a model response into topic ideas.
///
/// The response must be a JSON array, optionally inside a fenced code
/// block. Ideas with a blank title are dropped; an array with none left is
/// an error.
pub fn parse_topics(text: &str) -> WorkerResult<Vec<TopicIdea>> {
    let json = strip_code_fence(text);
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| WorkerError::topic_generation(format!("Failed to parse topics JSON: {}", e)))?;
    if !value.is_array() {
        return Err(WorkerError::topic_generation("Response is not a JSON array"));
    }

    let ideas: Vec<TopicIdea> = serde_json::from_value(value)
        .map_err(|e| WorkerError::topic_generation(format!("Invalid topic entry: {}", e)))?;
    let ideas: Vec<TopicIdea> = ideas
        .into_iter()
        .filter(|idea| !idea.title.trim().is_empty())
        .collect();
    if ideas.is_empty() {
        return Err(WorkerError::topic_generation("Response contained no topics"));
    }
    Ok(ideas)
}
