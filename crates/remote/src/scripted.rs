use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::PredictClient;
use crate::endpoint::Endpoint;
use crate::error::RpcError;

/// A predict call as seen by [`ScriptedClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone)]
enum ScriptedReply {
    Data(Vec<Value>),
    Fail(String),
}

#[derive(Default)]
struct Script {
    replies: HashMap<Endpoint, VecDeque<ScriptedReply>>,
    calls: Vec<RecordedCall>,
}

/// In-memory predict client replaying queued replies, for testing and prototyping.
///
/// Replies are consumed per endpoint in the order they were pushed. A call with
/// nothing queued fails with `RpcError::Request`.
#[derive(Clone)]
pub struct ScriptedClient {
    base_url: String,
    script: Arc<Mutex<Script>>,
    connected: Arc<AtomicBool>,
    connect_failure: Option<String>,
    latency: Option<Duration>,
}

impl ScriptedClient {
    /// A client that still needs `connect`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            script: Arc::new(Mutex::new(Script::default())),
            connected: Arc::new(AtomicBool::new(false)),
            connect_failure: None,
            latency: None,
        }
    }

    /// A client that is already connected.
    #[must_use]
    pub fn connected(base_url: impl Into<String>) -> Self {
        let client = Self::new(base_url);
        client.connected.store(true, Ordering::SeqCst);
        client
    }

    /// Make every `connect` fail with the given message.
    #[must_use]
    pub fn with_connect_failure(mut self, message: impl Into<String>) -> Self {
        self.connect_failure = Some(message.into());
        self
    }

    /// Delay every predict call by `latency` before replying.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a successful reply for `endpoint`.
    pub fn push_reply(&self, endpoint: Endpoint, data: Vec<Value>) -> &Self {
        self.push(endpoint, ScriptedReply::Data(data))
    }

    /// Queue a failed call for `endpoint`.
    pub fn push_failure(&self, endpoint: Endpoint, message: impl Into<String>) -> &Self {
        self.push(endpoint, ScriptedReply::Fail(message.into()))
    }

    /// Every predict call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script
            .lock()
            .map(|script| script.calls.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn calls_to(&self, endpoint: Endpoint) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.endpoint == endpoint)
            .count()
    }

    fn push(&self, endpoint: Endpoint, reply: ScriptedReply) -> &Self {
        if let Ok(mut script) = self.script.lock() {
            script.replies.entry(endpoint).or_default().push_back(reply);
        }
        self
    }
}

#[async_trait]
impl PredictClient for ScriptedClient {
    async fn connect(&self) -> Result<(), RpcError> {
        if let Some(message) = &self.connect_failure {
            return Err(RpcError::Connection(message.clone()));
        }
        self.connected.store(true, Ordering::SeqCst);
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

        let reply = {
            let mut script = self
                .script
                .lock()
                .map_err(|e| RpcError::Request(e.to_string()))?;
            script.calls.push(RecordedCall { endpoint, args });
            script
                .replies
                .get_mut(&endpoint)
                .and_then(VecDeque::pop_front)
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            Some(ScriptedReply::Data(data)) => Ok(data),
            Some(ScriptedReply::Fail(message)) => Err(RpcError::Request(message)),
            None => Err(RpcError::Request(format!("no scripted reply for {endpoint}"))),
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replays_in_order_and_records_calls() {
        let client = ScriptedClient::connected("http://backend");
        client
            .push_reply(Endpoint::NextWord, vec![json!("first")])
            .push_failure(Endpoint::NextWord, "gone");

        let first = client.predict(Endpoint::NextWord, vec![]).await.unwrap();
        assert_eq!(first, vec![json!("first")]);
        let second = client.predict(Endpoint::NextWord, vec![json!(1)]).await;
        assert!(matches!(second, Err(RpcError::Request(message)) if message == "gone"));
        let third = client.predict(Endpoint::NextWord, vec![]).await;
        assert!(matches!(third, Err(RpcError::Request(_))));

        assert_eq!(client.calls_to(Endpoint::NextWord), 3);
        assert_eq!(client.calls()[1].args, vec![json!(1)]);
    }

    #[tokio::test]
    async fn predict_requires_connect() {
        let client = ScriptedClient::new("http://backend");
        let err = client.predict(Endpoint::GetFolders, vec![]).await.unwrap_err();
        assert!(matches!(err, RpcError::NotConnected));

        client.connect().await.unwrap();
        assert!(client.is_connected());
        client.disconnect();
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn connect_failure_is_reported() {
        let client = ScriptedClient::new("http://backend").with_connect_failure("refused");
        let err = client.connect().await.unwrap_err();
        assert_eq!(err.to_string(), "connection failed: refused");
    }
}
