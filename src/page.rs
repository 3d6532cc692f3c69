//! A live document: markup that can change while observers watch it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use scraper::{Html, Selector};
use tokio::sync::watch;

#[derive(Default, Debug)]
struct ObserverStats {
    created: AtomicUsize,
    detached: AtomicUsize,
}

pub struct Page {
    url: String,
    markup: watch::Sender<String>,
    stats: Arc<ObserverStats>,
}

impl Page {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        let (markup, _) = watch::channel(html.into());
        Page {
            url: url.into(),
            markup,
            stats: Arc::new(ObserverStats::default()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current markup of the whole document.
    pub fn html(&self) -> String {
        self.markup.borrow().clone()
    }

    /// Parses the current markup. The returned tree is a snapshot and does
    /// not follow later mutations.
    pub fn snapshot(&self) -> Html {
        Html::parse_document(&self.markup.borrow())
    }

    pub fn matches(&self, selector: &Selector) -> bool {
        self.snapshot().select(selector).next().is_some()
    }

    /// Replaces the document markup and notifies every observer.
    pub fn mutate(&self, html: impl Into<String>) {
        self.markup.send_replace(html.into());
    }

    /// Applies `edit` to the current markup as one mutation batch.
    pub fn mutate_with<F>(&self, edit: F)
    where
        F: FnOnce(&mut String),
    {
        self.markup.send_modify(edit);
    }

    pub fn observe(&self) -> MutationObserver {
        self.stats.created.fetch_add(1, Ordering::SeqCst);
        MutationObserver {
            changes: self.markup.subscribe(),
            stats: Arc::clone(&self.stats),
            connected: true,
        }
    }

    /// Observers that were created and not yet detached.
    pub fn active_observers(&self) -> usize {
        self.observers_created() - self.observers_detached()
    }

    pub fn observers_created(&self) -> usize {
        self.stats.created.load(Ordering::SeqCst)
    }

    pub fn observers_detached(&self) -> usize {
        self.stats.detached.load(Ordering::SeqCst)
    }
}

/// Watches a [`Page`] for mutation batches until disconnected.
///
/// Dropping a connected observer disconnects it, so an observer abandoned
/// by a timed-out wait is still detached exactly once.
pub struct MutationObserver {
    changes: watch::Receiver<String>,
    stats: Arc<ObserverStats>,
    connected: bool,
}

impl MutationObserver {
    /// Waits for the next mutation batch. Returns false once the page is
    /// gone or the observer is disconnected.
    pub async fn changed(&mut self) -> bool {
        self.connected && self.changes.changed().await.is_ok()
    }

    pub fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.stats.detached.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for MutationObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}
