//! Gemini session client - direct REST API implementation.
//!
//! [`GeminiBackend`] holds the shared HTTP client, settings and credentials;
//! [`GeminiBackend::start_session`] opens one dialogue. Each [`GeminiSession`]
//! keeps its own history and resends it with every turn, so follow-up
//! questions are answered in context.

use async_trait::async_trait;
use medassist_core::session::GenerativeSession;
use medassist_core::settings::ClientSettings;
use medassist_core::{SessionCredentials, SessionError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Entry point to the Gemini HTTP API.
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    credentials: SessionCredentials,
    settings: Arc<ClientSettings>,
}

impl GeminiBackend {
    /// Creates a backend bound to the given credentials and settings.
    pub fn new(credentials: SessionCredentials, settings: ClientSettings) -> Self {
        Self {
            client: Client::new(),
            credentials,
            settings: Arc::new(settings),
        }
    }

    pub fn credentials(&self) -> &SessionCredentials {
        &self.credentials
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Starts a new dialogue with an empty history.
    pub fn start_session(&self) -> GeminiSession {
        tracing::debug!(model = %self.settings.model, "Starting Gemini session");
        GeminiSession {
            client: self.client.clone(),
            credentials: self.credentials.clone(),
            settings: Arc::clone(&self.settings),
            turn: Mutex::new(()),
            dialogue: Mutex::new(Dialogue::default()),
        }
    }
}

#[derive(Default)]
struct Dialogue {
    /// Bumped by `reset`; replies to older requests stay out of `history`.
    generation: u64,
    /// Completed exchanges, resent with every request
    history: Vec<Content>,
}

/// One dialogue with a Gemini model.
pub struct GeminiSession {
    client: Client,
    credentials: SessionCredentials,
    settings: Arc<ClientSettings>,
    /// Held for a whole round-trip so turns on one session never interleave
    turn: Mutex<()>,
    dialogue: Mutex<Dialogue>,
}

impl GeminiSession {
    /// Number of history entries (two per completed exchange).
    pub async fn history_len(&self) -> usize {
        self.dialogue.lock().await.history.len()
    }

    fn build_request(&self, history: &[Content], text: &str) -> GenerateContentRequest {
        let mut contents = history.to_vec();
        contents.push(Content::text("user", text));

        let system_instruction = self
            .settings
            .system_instruction
            .as_ref()
            .map(|instruction| Content::text("system", instruction));

        let generation_config = self
            .settings
            .temperature
            .map(|temperature| GenerationConfig { temperature });

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    async fn send_request(
        &self,
        api_key: &str,
        body: &GenerateContentRequest,
    ) -> Result<String, SessionError> {
        let url = format!(
            "{}/{model}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model = self.settings.model,
        );

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .timeout(self.settings.request_timeout())
            .json(body)
            .send()
            .await
            .map_err(|err| {
                SessionError::network(
                    format!("Gemini API request failed: {err}"),
                    err.is_timeout(),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            SessionError::backend(format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl GenerativeSession for GeminiSession {
    async fn submit(&self, text: &str) -> Result<String, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        let api_key = self
            .credentials
            .api_key()
            .ok_or(SessionError::NoCredentials)?;

        let _turn = self.turn.lock().await;
        let (request, generation) = {
            let dialogue = self.dialogue.lock().await;
            tracing::debug!(
                model = %self.settings.model,
                history = dialogue.history.len(),
                "Sending Gemini turn"
            );
            (
                self.build_request(&dialogue.history, text),
                dialogue.generation,
            )
        };

        match self.send_request(api_key.expose(), &request).await {
            Ok(reply) => {
                let mut dialogue = self.dialogue.lock().await;
                if dialogue.generation == generation {
                    dialogue.history.push(Content::text("user", text));
                    dialogue.history.push(Content::text("model", &reply));
                } else {
                    tracing::debug!("Reply belongs to a reset dialogue, not recorded");
                }
                Ok(reply)
            }
            Err(err) => {
                tracing::warn!(kind = ?err.kind(), "Gemini turn failed: {}", err);
                Err(err)
            }
        }
    }

    async fn reset(&self) {
        let mut dialogue = self.dialogue.lock().await;
        dialogue.history.clear();
        dialogue.generation += 1;
        tracing::debug!("Gemini dialogue reset");
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Clone, Debug)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize, Clone, Debug)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Joins the text parts of the first candidate; a blank result is an error.
fn extract_text_response(response: GenerateContentResponse) -> Result<String, SessionError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(SessionError::backend(format!(
            "Gemini API blocked the prompt: {reason}"
        )));
    }

    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(SessionError::backend(
            "Gemini API returned no text in the response candidates",
        ));
    }
    Ok(text)
}

fn map_http_error(status: StatusCode, body: &str) -> SessionError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    SessionError::backend_status(status.as_u16(), message, is_retryable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medassist_core::ErrorKind;
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::{Notify, mpsc};

    /// A request as seen by the stub server.
    struct CapturedRequest {
        /// Request line and headers, lower-cased
        head: String,
        body: Value,
    }

    async fn read_request(socket: &mut TcpStream) -> CapturedRequest {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|value| value.trim().parse::<usize>().unwrap())
            .unwrap_or(0);

        let body_start = header_end + 4;
        while buf.len() < body_start + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body");
            buf.extend_from_slice(&chunk[..n]);
        }

        CapturedRequest {
            head,
            body: serde_json::from_slice(&buf[body_start..body_start + content_length]).unwrap(),
        }
    }

    /// Serves one canned `generateContent` reply per connection.
    ///
    /// With a `gate`, each reply waits for a notification after the request
    /// has been captured.
    async fn spawn_stub(
        replies: Vec<&'static str>,
        gate: Option<Arc<Notify>>,
    ) -> (String, mpsc::UnboundedReceiver<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            for reply in replies {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                tx.send(request).unwrap();
                if let Some(gate) = &gate {
                    gate.notified().await;
                }

                let body = serde_json::json!({
                    "candidates": [{"content": {"role": "model", "parts": [{"text": reply}]}}]
                })
                .to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}/v1beta/models"), rx)
    }

    fn backend_at(base_url: &str) -> GeminiBackend {
        let settings = ClientSettings {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
            ..ClientSettings::default()
        };
        GeminiBackend::new(SessionCredentials::from_raw(Some("sk-test-secret")), settings)
    }

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).expect("response fixture should parse")
    }

    fn unreachable_backend(credentials: SessionCredentials) -> GeminiBackend {
        let settings = ClientSettings {
            base_url: "http://127.0.0.1:9/v1beta/models".to_string(),
            request_timeout_secs: 5,
            ..ClientSettings::default()
        };
        GeminiBackend::new(credentials, settings)
    }

    #[test]
    fn test_extract_joins_parts_verbatim() {
        let response = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"**Summary:** "},{"text":"rest.\n"}]}}]}"#,
        );
        assert_eq!(extract_text_response(response).unwrap(), "**Summary:** rest.\n");
    }

    #[test]
    fn test_extract_blank_reply_is_backend_error() {
        let response = parse(r#"{"candidates":[{"content":{"parts":[{"text":"  \n"}]}}]}"#);
        let err = extract_text_response(response).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BackendError);
    }

    #[test]
    fn test_extract_missing_candidates_is_backend_error() {
        let err = extract_text_response(parse("{}")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BackendError);
    }

    #[test]
    fn test_extract_blocked_prompt() {
        let response = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        let err = extract_text_response(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_map_http_error_parses_error_body() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body);
        assert_eq!(
            err,
            SessionError::backend_status(429, "RESOURCE_EXHAUSTED: Quota exceeded", true)
        );
    }

    #[test]
    fn test_map_http_error_plain_body() {
        let err = map_http_error(StatusCode::BAD_REQUEST, "bad things");
        assert_eq!(err, SessionError::backend_status(400, "bad things", false));
    }

    #[test]
    fn test_request_serialization() {
        let settings = ClientSettings {
            system_instruction: Some("Be brief.".to_string()),
            temperature: Some(0.5),
            ..ClientSettings::default()
        };
        let backend = GeminiBackend::new(SessionCredentials::absent(), settings);
        let session = backend.start_session();
        let history = vec![Content::text("user", "hi"), Content::text("model", "hello")];

        let json = serde_json::to_value(session.build_request(&history, "next")).unwrap();
        assert_eq!(json["contents"].as_array().unwrap().len(), 3);
        assert_eq!(json["contents"][2]["role"], "user");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "next");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_request_omits_unset_options() {
        let backend = GeminiBackend::new(SessionCredentials::absent(), ClientSettings::default());
        let json = serde_json::to_value(backend.start_session().build_request(&[], "hi")).unwrap();
        assert!(json.get("systemInstruction").is_none());
        assert!(json.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn test_follow_up_turn_carries_previous_exchange() {
        let (base_url, mut requests) =
            spawn_stub(vec!["**Summary:** rest.\n", "Water or broth."], None).await;
        let session = backend_at(&base_url).start_session();

        let first = session.submit("I have a fever").await.unwrap();
        assert_eq!(first, "**Summary:** rest.\n");
        assert_eq!(session.history_len().await, 2);

        let second = session.submit("What should I drink?").await.unwrap();
        assert_eq!(second, "Water or broth.");
        assert_eq!(session.history_len().await, 4);

        let first_request = requests.recv().await.unwrap();
        assert!(
            first_request
                .head
                .starts_with("post /v1beta/models/gemini-2.5-flash:generatecontent ")
        );
        assert!(first_request.head.contains("x-goog-api-key: sk-test-secret"));
        assert!(!first_request.head.contains("key="));
        assert_eq!(first_request.body["contents"].as_array().unwrap().len(), 1);

        let second_request = requests.recv().await.unwrap();
        assert!(second_request.head.contains("x-goog-api-key: sk-test-secret"));
        let contents = second_request.body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "I have a fever");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "**Summary:** rest.\n");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "What should I drink?");
    }

    #[tokio::test]
    async fn test_reset_drops_history_and_late_reply() {
        let gate = Arc::new(Notify::new());
        let (base_url, mut requests) =
            spawn_stub(vec!["first answer", "second answer"], Some(gate.clone())).await;
        let session = Arc::new(backend_at(&base_url).start_session());

        let pending = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.submit("first question").await }
        });
        requests.recv().await.unwrap();

        session.reset().await;
        gate.notify_one();
        assert_eq!(pending.await.unwrap().unwrap(), "first answer");
        assert_eq!(session.history_len().await, 0);

        gate.notify_one();
        session.submit("second question").await.unwrap();
        let second_request = requests.recv().await.unwrap();
        let contents = second_request.body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["parts"][0]["text"], "second question");
        assert_eq!(session.history_len().await, 2);
    }

    #[tokio::test]
    async fn test_submit_without_credentials_short_circuits() {
        let session = unreachable_backend(SessionCredentials::absent()).start_session();
        let err = session.submit("I have a headache").await.unwrap_err();
        assert_eq!(err, SessionError::NoCredentials);
        assert_eq!(session.history_len().await, 0);
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_text() {
        let session =
            unreachable_backend(SessionCredentials::from_raw(Some("key"))).start_session();
        assert_eq!(session.submit("   ").await.unwrap_err(), SessionError::EmptyInput);
    }

    #[tokio::test]
    async fn test_network_failure_leaves_history_untouched() {
        let session =
            unreachable_backend(SessionCredentials::from_raw(Some("sk-test-secret")))
                .start_session();
        let err = session.submit("hello").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert!(!err.to_string().contains("sk-test-secret"));
        assert_eq!(session.history_len().await, 0);
    }
}
