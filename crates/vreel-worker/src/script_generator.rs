//! Narration script generation via the Anthropic Messages API.

use async_trait::async_trait;
use tracing::{debug, info, warn};
use vreel_models::GeneratedScript;

use crate::anthropic::{strip_code_fence, MessagesClient};
use crate::config::AnthropicConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::services::ScriptGenerator;

const MAX_TOKENS: u32 = 2000;
const TOPIC_PLACEHOLDER: &str = "{{topic}}";

/// Built-in prompt; `{{topic}}` is replaced with the requested topic.
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"You write narration for 60-second vertical explainer videos.

Topic: {{topic}}

Write a spoken script of roughly 150 to 200 words that a single narrator reads aloud.
Structure it as consecutive segments, in this order:
- one "opening" segment: a hook question or bold claim, then a short follow-up sentence
- one or more "pain" segments: the problem the viewer recognises
- one or more "solution" segments: concrete, numbered-style tips
- one "closing" segment: a short call to action

The concatenated segment texts must equal the full script.
Pick 3 to 6 keywords from the script to highlight on screen, each with a color:
"red" for problems, "gold" for key ideas, "cyan" for actions.
Keep every segment short enough to read on a phone screen."#;

/// Script generator backed by Claude.
pub struct AnthropicScriptGenerator {
    client: MessagesClient,
    template: String,
}

impl AnthropicScriptGenerator {
    /// Create a generator, loading the prompt template override if one is
    /// configured.
    pub fn new(config: &AnthropicConfig) -> WorkerResult<Self> {
        let client = MessagesClient::new(config, WorkerError::ScriptGeneration)?;

        let template = match &config.prompt_template {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                WorkerError::config_error(format!(
                    "Failed to read prompt template {}: {}",
                    path.display(),
                    e
                ))
            })?,
            None => DEFAULT_PROMPT_TEMPLATE.to_string(),
        };
        if !template.contains(TOPIC_PLACEHOLDER) {
            warn!("Prompt template has no {} placeholder", TOPIC_PLACEHOLDER);
        }

        Ok(Self { client, template })
    }

    /// Build the full prompt for `topic`, including the output schema.
    pub fn build_prompt(&self, topic: &str) -> String {
        format!(
            "{}\n\nReturn ONLY a single JSON object, with no commentary, matching this JSON Schema:\n{}",
            self.template.replace(TOPIC_PLACEHOLDER, topic),
            GeneratedScript::json_schema()
        )
    }
}

#[async_trait]
impl ScriptGenerator for AnthropicScriptGenerator {
    async fn generate(&self, topic: &str) -> WorkerResult<GeneratedScript> {
        if topic.trim().is_empty() {
            return Err(WorkerError::invalid_input("topic is empty"));
        }

        info!(model = %self.client.model(), topic, "Generating script");
        let prompt = self.build_prompt(topic);
        let text = self.client.complete(&prompt, MAX_TOKENS, None).await?;
        debug!(chars = text.len(), "Received script response");

        let script = parse_script(&text)?;
        info!(
            segments = script.segments.len(),
            keywords = script.keywords.len(),
            "Script generated"
        );
        Ok(script)
    }
}

/// Parse and validate a model response, tolerating a fenced code block.
pub fn parse_script(text: &str) -> WorkerResult<GeneratedScript> {
    let json = strip_code_fence(text);
    let script: GeneratedScript = serde_json::from_str(json)
        .map_err(|e| WorkerError::script_generation(format!("Failed to parse script JSON: {}", e)))?;
    script
        .validate()
        .map_err(|e| WorkerError::script_generation(format!("Invalid script: {}", e)))?;
    Ok(script)
}
