//! Browser tabs as the privileged side sees them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::content_script::{ContentScript, NO_RECEIVER};
use crate::error::{AppError, Result};
use crate::extract::ExtractOptions;
use crate::page::Page;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub tab_id: u32,
    pub url: String,
}

/// The calls the orchestrator makes into the browser.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// The foreground tab of the current window, if any.
    async fn active_tab(&self) -> Result<Option<Tab>>;

    /// Loads the extractor into a tab. Fails if it is already there.
    async fn inject_extractor(&self, tab_id: u32) -> Result<()>;

    /// Sends a message to the extractor in a tab and awaits its reply.
    /// `Value::Null` stands for "no response".
    async fn send_message(&self, tab_id: u32, message: Value) -> Result<Value>;
}

struct TabEntry {
    page: Arc<Page>,
    script: Option<ContentScript>,
}

#[derive(Default)]
struct Registry {
    next_id: u32,
    active: Option<u32>,
    tabs: HashMap<u32, TabEntry>,
}

/// In-process tabs whose content scripts run as tokio tasks.
pub struct LocalTabHost {
    registry: Mutex<Registry>,
    options: ExtractOptions,
}

impl LocalTabHost {
    pub fn new(options: ExtractOptions) -> Self {
        LocalTabHost {
            registry: Mutex::new(Registry::default()),
            options,
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a tab on `html` and brings it to the foreground.
    pub fn open(&self, url: &str, html: impl Into<String>) -> Tab {
        let mut registry = self.registry();
        registry.next_id += 1;
        let tab_id = registry.next_id;

        registry.tabs.insert(
            tab_id,
            TabEntry {
                page: Arc::new(Page::new(url, html)),
                script: None,
            },
        );
        registry.active = Some(tab_id);

        info!("Opened tab {} on {}", tab_id, url);
        Tab {
            tab_id,
            url: url.to_string(),
        }
    }

    /// Brings an open tab to the foreground.
    pub fn activate(&self, tab_id: u32) -> Result<Tab> {
        let mut registry = self.registry();
        let url = registry
            .tabs
            .get(&tab_id)
            .map(|entry| entry.page.url().to_string())
            .ok_or(AppError::TabNotFound(tab_id))?;
        registry.active = Some(tab_id);

        info!("Activated tab {}", tab_id);
        Ok(Tab { tab_id, url })
    }

    /// Closes a tab. Its content script stops once the last handle to it
    /// is gone.
    pub fn close(&self, tab_id: u32) -> Result<()> {
        let mut registry = self.registry();
        registry.tabs.remove(&tab_id).ok_or(AppError::TabNotFound(tab_id))?;
        if registry.active == Some(tab_id) {
            registry.active = None;
        }

        info!("Closed tab {}", tab_id);
        Ok(())
    }

    /// The live page behind a tab, for callers that mutate it.
    pub fn page(&self, tab_id: u32) -> Option<Arc<Page>> {
        self.registry().tabs.get(&tab_id).map(|entry| Arc::clone(&entry.page))
    }
}

#[async_trait]
impl TabHost for LocalTabHost {
    async fn active_tab(&self) -> Result<Option<Tab>> {
        let registry = self.registry();
        Ok(registry.active.and_then(|tab_id| {
            registry.tabs.get(&tab_id).map(|entry| Tab {
                tab_id,
                url: entry.page.url().to_string(),
            })
        }))
    }

    async fn inject_extractor(&self, tab_id: u32) -> Result<()> {
        let mut registry = self.registry();
        let entry = registry
            .tabs
            .get_mut(&tab_id)
            .ok_or_else(|| AppError::InjectionError(format!("No tab with id {}", tab_id)))?;

        if entry.script.is_some() {
            return Err(AppError::InjectionError("Content script already injected".to_string()));
        }

        entry.script = Some(ContentScript::inject(Arc::clone(&entry.page), self.options.clone()));
        Ok(())
    }

    async fn send_message(&self, tab_id: u32, message: Value) -> Result<Value> {
        let script = {
            let registry = self.registry();
            let entry = registry
                .tabs
                .get(&tab_id)
                .ok_or_else(|| AppError::MessagingError(format!("No tab with id {}", tab_id)))?;
            entry
                .script
                .clone()
                .ok_or_else(|| AppError::MessagingError(NO_RECEIVER.to_string()))?
        };

        script.send(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn messages_need_an_injected_extractor() {
        let host = LocalTabHost::new(ExtractOptions::default());
        let tab = host.open("https://github.com/alice", r#"<body><span itemprop="name">alice</span></body>"#);

        let err = host
            .send_message(tab.tab_id, json!({ "action": "extractProfile" }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MessagingError(_)));

        host.inject_extractor(tab.tab_id).await.unwrap();
        let reply = host
            .send_message(tab.tab_id, json!({ "action": "extractProfile" }))
            .await
            .unwrap();
        assert_eq!(reply["username"], "alice");
    }

    #[tokio::test]
    async fn second_injection_fails() {
        let host = LocalTabHost::new(ExtractOptions::default());
        let tab = host.open("https://github.com/alice", "<body></body>");

        host.inject_extractor(tab.tab_id).await.unwrap();
        let err = host.inject_extractor(tab.tab_id).await.unwrap_err();
        assert!(matches!(err, AppError::InjectionError(_)));
    }

    #[tokio::test]
    async fn active_tab_follows_open_activate_and_close() {
        let host = LocalTabHost::new(ExtractOptions::default());
        assert_eq!(host.active_tab().await.unwrap(), None);

        let first = host.open("https://github.com/alice", "<body></body>");
        let second = host.open("https://www.linkedin.com/in/jane", "<body></body>");
        assert_eq!(host.active_tab().await.unwrap(), Some(second.clone()));

        assert_eq!(host.activate(first.tab_id).unwrap(), first);
        assert_eq!(host.active_tab().await.unwrap(), Some(first.clone()));

        host.close(first.tab_id).unwrap();
        assert_eq!(host.active_tab().await.unwrap(), None);
        assert!(matches!(host.activate(first.tab_id), Err(AppError::TabNotFound(id)) if id == first.tab_id));
        assert!(matches!(host.close(first.tab_id), Err(AppError::TabNotFound(_))));
        assert!(host.page(second.tab_id).is_some());
    }
}
