//! Language-model scorer.
//!
//! Sends the whole batch to an OpenAI-compatible `/chat/completions`
//! endpoint in a single request and parses a JSON array of
//! `{task, score, reasoning}` records out of the reply. Any failure
//! (no credential, transport, timeout, bad status, bad schema) makes the
//! batch unavailable; there is no retry.

use std::time::Duration;

use indoc::indoc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::TaskScorer;
use crate::error::ModelError;
use crate::task::{RawScore, ScoreSource};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Instruction sent as the system message.
pub const SYSTEM_PROMPT: &str = indoc! {r#"
    You are an expert productivity analyst.
    Score each task from 0-100 based on:
    - Urgency (time sensitivity)
    - Impact (business or personal value)
    - Effort (lower effort = higher score)
    - Dependencies (blocked tasks get lower priority)
    - Consequences of delay

    Also rate urgency and importance separately from 0.0 to 1.0.

    Return results ONLY in this JSON format, one entry per task, in the order given:
    [
      {
        "task": "...",
        "score": 0-100,
        "urgency": 0.0-1.0,
        "importance": 0.0-1.0,
        "reasoning": "..."
      }
    ]
"#};

/// Connection settings for the model scorer.
///
/// `api_key` is injected by the caller; the scorer never reads the
/// environment itself.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// One record of the model's reply.
#[derive(Debug, Deserialize)]
struct ScoreRecord {
    #[serde(default)]
    task: String,
    score: f64,
    reasoning: String,
    #[serde(default)]
    urgency: Option<f64>,
    #[serde(default)]
    importance: Option<f64>,
}

/// Some models wrap the array in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScoreReply {
    List(Vec<ScoreRecord>),
    Wrapped {
        #[serde(alias = "results", alias = "scores")]
        tasks: Vec<ScoreRecord>,
    },
}

/// Scorer backed by a chat completions API.
pub struct ModelScorer {
    config: ModelConfig,
}

impl ModelScorer {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Whether a non-blank credential was injected.
    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// User message listing every task.
    fn user_prompt(tasks: &[String]) -> String {
        let list: Vec<String> = tasks.iter().map(|t| format!("- {t}")).collect();
        format!("Here are the tasks:\n{}", list.join("\n"))
    }

    /// Score the batch, reporting why it failed.
    ///
    /// No request is sent when the credential is missing. Blocks the calling
    /// thread; from inside a tokio runtime the request runs on a scoped
    /// helper thread with its own runtime.
    pub fn request_scores(&self, tasks: &[String]) -> Result<Vec<RawScore>, ModelError> {
        let api_key = self.api_key().ok_or(ModelError::MissingCredential)?;

        // A runtime cannot be started on a thread that is already driving one.
        let content = if tokio::runtime::Handle::try_current().is_ok() {
            std::thread::scope(|s| {
                s.spawn(|| self.send_blocking(api_key, tasks))
                    .join()
                    .unwrap_or_else(|_| {
                        Err(ModelError::Runtime("model request thread panicked".into()))
                    })
            })?
        } else {
            self.send_blocking(api_key, tasks)?
        };
        parse_reply(&content, tasks)
    }

    fn send_blocking(&self, api_key: &str, tasks: &[String]) -> Result<String, ModelError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ModelError::Runtime(e.to_string()))?;
        rt.block_on(self.send(api_key, tasks))
    }

    async fn send(&self, api_key: &str, tasks: &[String]) -> Result<String, ModelError> {
        let timeout_secs = self.config.timeout_secs;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::user_prompt(tasks),
                },
            ],
            temperature: self.config.temperature,
        };

        debug!(endpoint = %self.endpoint(), model = %self.config.model, tasks = tasks.len(), "sending scoring request");

        let resp = client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport(e, timeout_secs))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| classify_transport(e, timeout_secs))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ModelError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ModelError::EmptyReply)
    }
}

fn classify_transport(err: reqwest::Error, timeout_secs: u64) -> ModelError {
    if err.is_timeout() {
        ModelError::Timeout { timeout_secs }
    } else {
        ModelError::from(err)
    }
}

/// Drop a surrounding Markdown code fence, if any.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (e.g. "json") on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn match_key(text: &str) -> String {
    text.trim().to_lowercase()
}

fn check_signal(name: &str, value: Option<f64>, task: &str) -> Result<Option<f64>, ModelError> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => Err(ModelError::MalformedReply(format!(
            "{name} {v} for task '{task}' is outside [0, 1]"
        ))),
        other => Ok(other),
    }
}

/// Parse the reply content into one record per input task.
///
/// The whole reply is rejected if any record is invalid. Records are matched
/// to tasks by text first and by position when text matching fails.
fn parse_reply(content: &str, tasks: &[String]) -> Result<Vec<RawScore>, ModelError> {
    let records = match serde_json::from_str::<ScoreReply>(strip_code_fence(content))? {
        ScoreReply::List(records) => records,
        ScoreReply::Wrapped { tasks } => tasks,
    };

    if records.len() != tasks.len() {
        return Err(ModelError::CountMismatch {
            expected: tasks.len(),
            actual: records.len(),
        });
    }

    for record in &records {
        if !record.score.is_finite() || !(0.0..=100.0).contains(&record.score) {
            return Err(ModelError::MalformedReply(format!(
                "score {} for task '{}' is outside 0-100",
                record.score, record.task
            )));
        }
        if record.reasoning.trim().is_empty() {
            return Err(ModelError::MalformedReply(format!(
                "empty reasoning for task '{}'",
                record.task
            )));
        }
        check_signal("urgency", record.urgency, &record.task)?;
        check_signal("importance", record.importance, &record.task)?;
    }

    let order = match_by_text(&records, tasks).unwrap_or_else(|| (0..tasks.len()).collect());

    Ok(tasks
        .iter()
        .zip(order)
        .map(|(task, idx)| {
            let record = &records[idx];
            RawScore {
                task: task.clone(),
                score: record.score.round() as u8,
                reasoning: record.reasoning.trim().to_string(),
                urgency: record.urgency,
                importance: record.importance,
            }
        })
        .collect())
}

/// Record index for each task, or `None` if some task has no text match.
fn match_by_text(records: &[ScoreRecord], tasks: &[String]) -> Option<Vec<usize>> {
    let mut used = vec![false; records.len()];
    let mut order = Vec::with_capacity(tasks.len());

    for task in tasks {
        let key = match_key(task);
        let idx = records
            .iter()
            .enumerate()
            .position(|(i, r)| !used[i] && match_key(&r.task) == key)?;
        used[idx] = true;
        order.push(idx);
    }
    Some(order)
}

impl TaskScorer for ModelScorer {
    fn name(&self) -> &str {
        "openai"
    }

    fn source(&self) -> ScoreSource {
        ScoreSource::Model
    }

    fn score_batch(&self, tasks: &[String]) -> Option<Vec<RawScore>> {
        match self.request_scores(tasks) {
            Ok(scores) => {
                info!(tasks = scores.len(), model = %self.config.model, "model scored batch");
                Some(scores)
            }
            Err(ModelError::MissingCredential) => {
                info!("no model credential configured, skipping model scorer");
                None
            }
            Err(e) => {
                warn!(error = %e, "model scorer unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tasks(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn scorer_for(server: &mockito::Server, api_key: Option<&str>) -> ModelScorer {
        ModelScorer::new(ModelConfig {
            api_key: api_key.map(str::to_string),
            base_url: server.url(),
            timeout_secs: 5,
            ..Default::default()
        })
    }

    fn completion(content: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```\n[1]\n```\n"), "[1]");
        assert_eq!(strip_code_fence("  [1] "), "[1]");
    }

    #[test]
    fn test_parse_reply_matches_by_text() {
        let input = tasks(&["Write report", "Call mom"]);
        let reply = r#"[
            {"task": "call mom", "score": 30, "reasoning": "personal"},
            {"task": "Write report", "score": 90, "reasoning": "due soon", "urgency": 0.9, "importance": 0.8}
        ]"#;
        let parsed = parse_reply(reply, &input).unwrap();
        assert_eq!(parsed[0].task, "Write report");
        assert_eq!(parsed[0].score, 90);
        assert_eq!(parsed[0].urgency, Some(0.9));
        assert_eq!(parsed[1].task, "Call mom");
        assert_eq!(parsed[1].score, 30);
        assert_eq!(parsed[1].urgency, None);
    }

    #[test]
    fn test_parse_reply_falls_back_to_position() {
        let input = tasks(&["Write report", "Call mom"]);
        let reply = r#"[
            {"task": "Report writing", "score": 88.6, "reasoning": "a"},
            {"task": "Phone call", "score": 20, "reasoning": "b"}
        ]"#;
        let parsed = parse_reply(reply, &input).unwrap();
        assert_eq!(parsed[0].task, "Write report");
        assert_eq!(parsed[0].score, 89);
        assert_eq!(parsed[1].task, "Call mom");
    }

    #[test]
    fn test_parse_reply_accepts_wrapped_object() {
        let input = tasks(&["a"]);
        let reply = r#"{"tasks": [{"task": "a", "score": 10, "reasoning": "r"}]}"#;
        assert_eq!(parse_reply(reply, &input).unwrap()[0].score, 10);
    }

    #[test]
    fn test_parse_reply_rejects_bad_records() {
        let input = tasks(&["a"]);
        let cases = [
            "not json",
            r#"[]"#,
            r#"[{"task": "a", "score": 120, "reasoning": "r"}]"#,
            r#"[{"task": "a", "score": -1, "reasoning": "r"}]"#,
            r#"[{"task": "a", "score": 50, "reasoning": "  "}]"#,
            r#"[{"task": "a", "score": 50}]"#,
            r#"[{"task": "a", "score": 50, "reasoning": "r", "urgency": 2.0}]"#,
        ];
        for reply in cases {
            assert!(parse_reply(reply, &input).is_err(), "accepted: {reply}");
        }
    }

    #[test]
    fn test_missing_credential_sends_nothing() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/chat/completions").expect(0).create();

        let scorer = scorer_for(&server, None);
        assert!(!scorer.is_configured());
        assert!(matches!(
            scorer.request_scores(&tasks(&["a"])),
            Err(ModelError::MissingCredential)
        ));
        assert!(scorer.score_batch(&tasks(&["a"])).is_none());
        mock.assert();
    }

    #[test]
    fn test_blank_credential_is_missing() {
        let server = mockito::Server::new();
        let scorer = scorer_for(&server, Some("   "));
        assert!(!scorer.is_configured());
    }

    #[test]
    fn test_scores_batch_from_api() {
        let mut server = mockito::Server::new();
        let content = "```json\n[{\"task\": \"ship release\", \"score\": 75, \"reasoning\": \"blocks others\"}]\n```";
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": DEFAULT_MODEL,
                "temperature": 0.2,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(content))
            .expect(1)
            .create();

        let scorer = scorer_for(&server, Some("test-key"));
        let scores = scorer.score_batch(&tasks(&["ship release"])).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, 75);
        assert_eq!(scores[0].reasoning, "blocks others");
        mock.assert();
    }

    #[test]
    fn test_http_error_is_unavailable() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": {"message": "Incorrect API key"}}"#)
            .expect(1)
            .create();

        let scorer = scorer_for(&server, Some("bad"));
        match scorer.request_scores(&tasks(&["a"])) {
            Err(ModelError::HttpStatus { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
        mock.assert();
    }

    #[test]
    fn test_single_attempt_on_failure() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .expect(1)
            .create();

        let scorer = scorer_for(&server, Some("key"));
        assert!(scorer.score_batch(&tasks(&["a", "b"])).is_none());
        mock.assert();
    }

    #[test]
    fn test_empty_choices_is_unavailable() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create();

        let scorer = scorer_for(&server, Some("key"));
        assert!(matches!(
            scorer.request_scores(&tasks(&["a"])),
            Err(ModelError::EmptyReply)
        ));
    }

    #[test]
    fn test_unreachable_host_is_unavailable() {
        let scorer = ModelScorer::new(ModelConfig {
            api_key: Some("key".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..Default::default()
        });
        assert!(scorer.score_batch(&tasks(&["a"])).is_none());
    }

    #[test]
    fn test_timeout_is_unavailable() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_secs(2));
                w.write_all(completion("[]").as_bytes())
            })
            .create();

        let scorer = ModelScorer::new(ModelConfig {
            api_key: Some("key".to_string()),
            base_url: server.url(),
            timeout_secs: 1,
            ..Default::default()
        });
        assert!(matches!(
            scorer.request_scores(&tasks(&["a"])),
            Err(ModelError::Timeout { timeout_secs: 1 })
        ));
        assert!(scorer.score_batch(&tasks(&["a"])).is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_scores_from_inside_runtime() {
        let mut server = mockito::Server::new_async().await;
        let content = r#"[{"task": "a", "score": 64, "reasoning": "r"}]"#;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion(content))
            .create_async()
            .await;

        let scorer = scorer_for(&server, Some("key"));
        let scores = scorer.score_batch(&tasks(&["a"])).unwrap();
        assert_eq!(scores[0].score, 64);
    }

    #[tokio::test]
    async fn test_failure_inside_runtime_is_unavailable() {
        let scorer = ModelScorer::new(ModelConfig {
            api_key: Some("key".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..Default::default()
        });
        assert!(scorer.score_batch(&tasks(&["a"])).is_none());
    }

    #[test]
    fn test_user_prompt_lists_tasks() {
        let prompt = ModelScorer::user_prompt(&tasks(&["one", "two"]));
        assert_eq!(prompt, "Here are the tasks:\n- one\n- two");
    }

    #[test]
    fn test_system_prompt_names_factors() {
        for factor in ["Urgency", "Impact", "Effort", "Dependencies", "Consequences of delay"] {
            assert!(SYSTEM_PROMPT.contains(factor));
        }
    }
}
