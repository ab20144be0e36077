//! OpenAI implementation of the AI trait.
//!
//! Both operations use chat completions with a strict `json_schema` response
//! format generated from the Rust response types via `schemars`.
//!
//! # Example
//!
//! ```rust,ignore
//! use bookscout::ai::OpenAI;
//!
//! let ai = OpenAI::new("sk-...").with_extraction_model("gpt-4o-mini");
//! let books = ai.extract_books(&prompt).await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{HarvestError, Result};
use crate::security::SecretString;
use crate::traits::ai::AI;
use crate::types::book::{BookList, ExtractedBook, QueryList};
use crate::types::config::{HarvestConfig, OPENAI_API_KEY};

const QUERY_SYSTEM_PROMPT: &str =
    "You write web search queries. Return only the query text, without quotes or numbering.";

const EXTRACTION_SYSTEM_PROMPT: &str = "You extract structured book records from web page text. \
Only return books that are actually books. Fill every field; when a detail is not in the text, \
give your best estimate rather than leaving it out.";

/// OpenAI-based AI implementation.
#[derive(Clone)]
pub struct OpenAI {
    client: Client,
    api_key: SecretString,
    query_model: String,
    extraction_model: String,
    base_url: String,
}

impl OpenAI {
    /// Create a new OpenAI client with the given API key.
    ///
    /// Surrounding whitespace in the key is dropped. Model calls time out
    /// after 120 seconds.
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key: String = api_key.into();
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key: SecretString::new(api_key.trim()),
            query_model: "gpt-4o".to_string(),
            extraction_model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Build from a harvest config, rejecting a blank key.
    pub fn from_config(config: &HarvestConfig) -> Result<Self> {
        let api_key = config.openai_api_key.require(OPENAI_API_KEY)?;
        Ok(Self::new(api_key)
            .with_query_model(&config.models.query_model)
            .with_extraction_model(&config.models.extraction_model)
            .with_base_url(&config.models.base_url))
    }

    /// Set the query generation model (default: gpt-4o).
    pub fn with_query_model(mut self, model: impl Into<String>) -> Self {
        self.query_model = model.into();
        self
    }

    /// Set the extraction model (default: gpt-4o-mini).
    pub fn with_extraction_model(mut self, model: impl Into<String>) -> Self {
        self.extraction_model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the extraction model name.
    pub fn extraction_model(&self) -> &str {
        &self.extraction_model
    }

    /// Structured output with a schema derived from `T`.
    pub async fn structured<T>(&self, model: &str, system: &str, user: &str) -> Result<T>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let request = StructuredRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: <T as JsonSchema>::schema_name(),
                    strict: true,
                    schema: strict_schema::<T>(),
                },
            },
        };

        debug!(model = %model, prompt_len = user.len(), "OpenAI structured request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| HarvestError::AI(Box::new(e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(HarvestError::AI(
                format!("OpenAI API error {}: {}", status, error_text).into(),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| HarvestError::AI(Box::new(e)))?;

        let message = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| HarvestError::AI("No response from OpenAI".into()))?;

        if let Some(refusal) = message.refusal {
            return Err(HarvestError::AI(
                format!("OpenAI refused: {}", refusal).into(),
            ));
        }

        let content = message
            .content
            .ok_or_else(|| HarvestError::AI("Empty response from OpenAI".into()))?;

        parse_structured(&content)
    }
}

#[async_trait]
impl AI for OpenAI {
    async fn generate_queries(&self, prompt: &str) -> Result<Vec<String>> {
        let response: QueryList = self
            .structured(&self.query_model, QUERY_SYSTEM_PROMPT, prompt)
            .await?;
        Ok(response.queries)
    }

    async fn extract_books(&self, prompt: &str) -> Result<Vec<ExtractedBook>> {
        let response: BookList = self
            .structured(&self.extraction_model, EXTRACTION_SYSTEM_PROMPT, prompt)
            .await?;
        Ok(response.books)
    }
}

/// Parse a JSON payload, tolerating a markdown code fence around it.
pub fn parse_structured<T: DeserializeOwned>(content: &str) -> Result<T> {
    serde_json::from_str(content)
        .or_else(|_| {
            let json_str = content
                .trim()
                .trim_start_matches("```json")
                .trim_start_matches("```")
                .trim_end_matches("```")
                .trim();
            serde_json::from_str(json_str)
        })
        .map_err(HarvestError::JsonParse)
}

/// JSON schema for `T` in the shape OpenAI strict mode accepts.
///
/// Strict mode needs every object closed (`additionalProperties: false`),
/// every property listed in `required`, no `$ref`, and no `format` or
/// `default` keywords.
pub fn strict_schema<T: JsonSchema>() -> Value {
    let mut value = serde_json::to_value(schema_for!(T)).unwrap_or_default();

    let definitions = value.get("definitions").cloned().unwrap_or(Value::Null);
    inline_refs(&mut value, &definitions);
    close_objects(&mut value);

    if let Value::Object(map) = &mut value {
        map.remove("definitions");
        map.remove("$schema");
        map.remove("title");
    }
    value
}

fn inline_refs(node: &mut Value, definitions: &Value) {
    match node {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(mut resolved) = target {
                inline_refs(&mut resolved, definitions);
                *node = resolved;
                return;
            }

            for (key, child) in map.iter_mut() {
                if key != "definitions" {
                    inline_refs(child, definitions);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

fn close_objects(node: &mut Value) {
    match node {
        Value::Object(map) => {
            map.remove("format");
            map.remove("default");

            let property_names: Option<Vec<Value>> = map
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| props.keys().cloned().map(Value::String).collect());

            if let Some(names) = property_names {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
                map.insert("required".to_string(), Value::Array(names));
            }

            for (key, child) in map.iter_mut() {
                if key == "properties" {
                    if let Value::Object(props) = child {
                        for prop in props.values_mut() {
                            close_objects(prop);
                        }
                    }
                } else if key != "required" {
                    close_objects(child);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                close_objects(item);
            }
        }
        _ => {}
    }
}

// Request/Response types

#[derive(Serialize)]
struct StructuredRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: Value,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_body(content: &str) -> Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content, "refusal": null},
                "finish_reason": "stop"
            }]
        })
    }

    #[test]
    fn test_openai_builder() {
        let ai = OpenAI::new("sk-test")
            .with_query_model("gpt-4o")
            .with_extraction_model("gpt-4.1-mini")
            .with_base_url("https://custom.api.com/v1/");

        assert_eq!(ai.extraction_model(), "gpt-4.1-mini");
        assert_eq!(ai.base_url, "https://custom.api.com/v1");
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = HarvestConfig::new("", "tvly-test");
        assert!(matches!(
            OpenAI::from_config(&config),
            Err(HarvestError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_strict_schema_shape() {
        let schema = strict_schema::<BookList>();
        let text = serde_json::to_string(&schema).unwrap();

        assert!(!text.contains("$ref"));
        assert!(!text.contains("definitions"));
        assert!(!text.contains("\"format\""));
        assert_eq!(schema["additionalProperties"], Value::Bool(false));
        assert_eq!(schema["required"], serde_json::json!(["books"]));

        let book = &schema["properties"]["books"]["items"];
        assert_eq!(book["additionalProperties"], Value::Bool(false));
        assert_eq!(book["required"].as_array().unwrap().len(), 9);
    }

    #[test]
    fn test_parse_structured_with_code_fence() {
        let fenced = "```json\n{\"queries\": [\"best rust books\"]}\n```";
        let parsed: QueryList = parse_structured(fenced).unwrap();
        assert_eq!(parsed.queries, vec!["best rust books".to_string()]);

        let broken: Result<QueryList> = parse_structured("not json at all");
        assert!(matches!(broken, Err(HarvestError::JsonParse(_))));
    }

    #[tokio::test]
    async fn test_extract_books_round_trip() {
        let server = MockServer::start().await;
        let content = r#"{"books": [{
            "title": "The Pragmatic Programmer",
            "author": "David Thomas, Andrew Hunt",
            "category": "software_engineering",
            "url": "https://pragprog.com/titles/tpp20/",
            "price": 49.99,
            "description": "Classic advice for developers",
            "image_url": null,
            "publisher": "Addison-Wesley",
            "publication_date": "2019-09-13"
        }]}"#;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(content)))
            .expect(1)
            .mount(&server)
            .await;

        let ai = OpenAI::new("sk-test").with_base_url(server.uri());
        let books = ai.extract_books("Extract books").await.unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title.as_deref(), Some("The Pragmatic Programmer"));
        assert_eq!(books[0].price, Some(49.99));
        assert_eq!(books[0].image_url, None);
    }

    #[tokio::test]
    async fn test_padded_key_is_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(
                r#"{"queries": ["best compiler books"]}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let ai = OpenAI::new("  sk-test\n").with_base_url(server.uri());
        let queries = ai.generate_queries("Write queries").await.unwrap();
        assert_eq!(queries, vec!["best compiler books"]);
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let ai = OpenAI::new("sk-test").with_base_url(server.uri());
        let err = ai.extract_books("Extract books").await.unwrap_err();

        assert!(matches!(err, HarvestError::AI(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_generate_queries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(
                r#"{"queries": ["best machine learning books 2024", "top system design books"]}"#,
            )))
            .mount(&server)
            .await;

        let ai = OpenAI::new("sk-test").with_base_url(server.uri());
        let queries = ai.generate_queries("Write queries").await.unwrap();
        assert_eq!(queries.len(), 2);
    }
}
