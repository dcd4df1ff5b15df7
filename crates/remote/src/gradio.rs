//! HTTP adapter for a Gradio backend.
//!
//! A predict call is two requests: `POST {base}/gradio_api/call/{name}` queues
//! the job and returns an event id, then `GET .../{event_id}` streams
//! server-sent events until a `complete` or `error` event arrives.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest_eventsource::retry::Never;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::PredictClient;
use crate::config::RemoteConfig;
use crate::endpoint::Endpoint;
use crate::error::{MalformedReply, RpcError};

pub struct GradioClient {
    http: Client,
    base_url: String,
    connected: AtomicBool,
}

impl GradioClient {
    /// Build a client for the configured backend. Does not touch the network.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::InvalidBaseUrl` for a bad base URL, or `RpcError::Http`
    /// if the HTTP client cannot be constructed.
    pub fn new(config: &RemoteConfig) -> Result<Self, RpcError> {
        config.parsed_base_url()?;
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            connected: AtomicBool::new(false),
        })
    }

    fn call_url(&self, endpoint: Endpoint) -> String {
        format!("{}/gradio_api/call/{}", self.base_url, endpoint.api_name())
    }

    /// Follow a result stream until its terminal event.
    async fn read_result(&self, endpoint: Endpoint, url: String) -> Result<Vec<Value>, RpcError> {
        let mut events = EventSource::new(self.http.get(url))
            .map_err(|e| RpcError::Request(e.to_string()))?;
        // a finished stream must not be reopened
        events.set_retry_policy(Box::new(Never));

        let outcome = loop {
            let Some(event) = events.next().await else {
                break Err(no_terminal_event(endpoint));
            };
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(message)) => match message.event.as_str() {
                    "complete" => break decode_complete(endpoint, &message.data),
                    "error" => break Err(decode_error(endpoint, &message.data)),
                    other => debug!(%endpoint, event = other, "waiting for result"),
                },
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    break Err(no_terminal_event(endpoint));
                }
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, _)) => {
                    warn!(%endpoint, %status, "result stream rejected");
                    break Err(RpcError::HttpStatus(status));
                }
                Err(reqwest_eventsource::Error::Transport(e)) => break Err(RpcError::Http(e)),
                Err(e) => break Err(RpcError::Stream(e.to_string())),
            }
        };
        events.close();
        outcome
    }
}

#[async_trait]
impl PredictClient for GradioClient {
    async fn connect(&self) -> Result<(), RpcError> {
        if self.is_connected() {
            return Ok(());
        }

        let url = format!("{}/config", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RpcError::Connection(e.to_string()))?;
        if !response.status().is_success() {
            return Err(RpcError::Connection(format!(
                "{url} answered {}",
                response.status()
            )));
        }

        self.connected.store(true, Ordering::SeqCst);
        info!(base_url = %self.base_url, "connected to backend");
        Ok(())
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn predict(&self, endpoint: Endpoint, args: Vec<Value>) -> Result<Vec<Value>, RpcError> {
        if !self.is_connected() {
            return Err(RpcError::NotConnected);
        }

        let call_url = self.call_url(endpoint);
        debug!(%endpoint, args = args.len(), "predict");

        let response = self
            .http
            .post(&call_url)
            .json(&CallRequest { data: &args })
            .send()
            .await?;
        if !response.status().is_success() {
            warn!(%endpoint, status = %response.status(), "call rejected");
            return Err(RpcError::HttpStatus(response.status()));
        }
        let ticket: CallTicket = response.json().await?;

        self.read_result(endpoint, format!("{call_url}/{}", ticket.event_id))
            .await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct CallRequest<'a> {
    data: &'a [Value],
}

#[derive(Debug, Deserialize)]
struct CallTicket {
    event_id: String,
}

fn no_terminal_event(endpoint: Endpoint) -> RpcError {
    MalformedReply::new(endpoint, "result stream ended without a complete event").into()
}

fn decode_complete(endpoint: Endpoint, payload: &str) -> Result<Vec<Value>, RpcError> {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(MalformedReply::new(endpoint, "result is not a list").into()),
        Err(e) => Err(MalformedReply::new(endpoint, e.to_string()).into()),
    }
}

fn decode_error(endpoint: Endpoint, payload: &str) -> RpcError {
    let trimmed = payload.trim();
    let message = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(message)) => message,
        Ok(Value::Null) => "backend reported an error".to_string(),
        _ if trimmed.is_empty() => "backend reported an error".to_string(),
        _ => trimmed.to_string(),
    };
    RpcError::Remote { endpoint, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn complete_payload_yields_data() {
        let data = decode_complete(Endpoint::NextWord, "[\"a\", {\"value\": \"b\"}]").unwrap();
        assert_eq!(data, vec![json!("a"), json!({ "value": "b" })]);
    }

    #[test]
    fn error_payload_becomes_remote_error() {
        match decode_error(Endpoint::StartLearning, "\"boom\"") {
            RpcError::Remote { endpoint, message } => {
                assert_eq!(endpoint, Endpoint::StartLearning);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = decode_error(Endpoint::StartLearning, "null");
        assert!(matches!(err, RpcError::Remote { message, .. } if message == "backend reported an error"));
        let err = decode_error(Endpoint::StartLearning, "  ");
        assert!(matches!(err, RpcError::Remote { message, .. } if message == "backend reported an error"));
        let err = decode_error(Endpoint::StartLearning, " quota exceeded ");
        assert!(matches!(err, RpcError::Remote { message, .. } if message == "quota exceeded"));
    }

    #[test]
    fn non_list_result_is_malformed() {
        let err = decode_complete(Endpoint::NextWord, "{\"a\": 1}").unwrap_err();
        assert!(matches!(err, RpcError::Malformed(_)));
        let err = decode_complete(Endpoint::NextWord, "not json").unwrap_err();
        assert!(matches!(err, RpcError::Malformed(_)));
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(GradioClient::new(&RemoteConfig::new("file:///tmp")).is_err());
    }
}
