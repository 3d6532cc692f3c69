//! The extractor as loaded into a tab: a listener task that owns nothing
//! but its page and talks to the outside only through JSON messages.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::error::{AppError, Result};
use crate::extract::{extract_profile, ExtractOptions};
use crate::page::Page;

pub const NO_RECEIVER: &str = "Could not establish connection. Receiving end does not exist.";
pub const PORT_CLOSED: &str = "The message port closed before a response was received.";

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ExtractProfile,
}

struct Envelope {
    message: Value,
    reply: oneshot::Sender<Value>,
}

/// Handle to a content script running in one tab.
#[derive(Clone)]
pub struct ContentScript {
    sender: mpsc::Sender<Envelope>,
}

impl ContentScript {
    /// Starts the listener for `page`. Must be called inside a tokio runtime.
    pub fn inject(page: Arc<Page>, options: ExtractOptions) -> Self {
        let (sender, mut receiver) = mpsc::channel::<Envelope>(16);

        tokio::spawn(async move {
            while let Some(envelope) = receiver.recv().await {
                let page = Arc::clone(&page);
                let options = options.clone();
                tokio::spawn(async move {
                    handle(&page, &options, envelope).await;
                });
            }
            debug!("Content script for {} stopped", page.url());
        });

        ContentScript { sender }
    }

    /// Sends one message and waits for the reply.
    pub async fn send(&self, message: Value) -> Result<Value> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Envelope { message, reply })
            .await
            .map_err(|_| AppError::MessagingError(NO_RECEIVER.to_string()))?;

        response
            .await
            .map_err(|_| AppError::MessagingError(PORT_CLOSED.to_string()))
    }
}

async fn handle(page: &Page, options: &ExtractOptions, envelope: Envelope) {
    let Envelope { message, reply } = envelope;

    // Messages this script does not understand get no reply at all.
    let Ok(request) = serde_json::from_value::<Request>(message) else {
        debug!("Ignoring unknown message");
        return;
    };

    let response = match request {
        Request::ExtractProfile => match extract_profile(page, options).await {
            Ok(record) => serde_json::to_value(&record).unwrap_or_else(|e| error_reply(&AppError::from(e))),
            Err(e) => error_reply(&e),
        },
    };

    if reply.send(response).is_err() {
        error!("Extraction reply for {} had no one waiting", page.url());
    }
}

fn error_reply(err: &AppError) -> Value {
    json!({ "error": err.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answers_extract_profile_requests() {
        let page = Arc::new(Page::new(
            "https://github.com/alice",
            r#"<body><span itemprop="name">alice</span></body>"#,
        ));
        let script = ContentScript::inject(page, ExtractOptions::default());

        let reply = script.send(json!({ "action": "extractProfile" })).await.unwrap();
        assert_eq!(reply["type"], "github");
        assert_eq!(reply["username"], "alice");
    }

    #[tokio::test]
    async fn unsupported_pages_reply_with_an_error() {
        let page = Arc::new(Page::new("https://example.com/", "<body></body>"));
        let script = ContentScript::inject(page, ExtractOptions::default());

        let reply = script.send(json!({ "action": "extractProfile" })).await.unwrap();
        assert!(reply["error"].as_str().unwrap().contains("LinkedIn or GitHub"));
    }

    #[tokio::test]
    async fn unknown_actions_close_the_port() {
        let page = Arc::new(Page::new("https://github.com/alice", "<body></body>"));
        let script = ContentScript::inject(page, ExtractOptions::default());

        let err = script.send(json!({ "action": "somethingElse" })).await.unwrap_err();
        assert!(matches!(err, AppError::MessagingError(ref msg) if msg == PORT_CLOSED));
    }
}
