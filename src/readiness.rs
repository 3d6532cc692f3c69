use std::time::Duration;

use futures_util::future::join_all;
use scraper::Selector;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::page::Page;

pub const TIMEOUT_MESSAGE: &str = "Timeout waiting for elements";

/// Resolves once every selector matches at least one element of `page`, or
/// fails with [`AppError::ExtractionTimeout`] when `timeout` elapses first.
///
/// Each selector is watched by its own observer from the start and settles
/// on its first match, even if that element is later removed.
pub async fn wait_for_elements(page: &Page, selectors: &[&str], timeout: Duration) -> Result<()> {
    let parsed = selectors
        .iter()
        .map(|raw| {
            Selector::parse(raw)
                .map(|selector| (*raw, selector))
                .map_err(|e| AppError::ParseError(format!("Invalid selector {:?}: {:?}", raw, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    let all_present = join_all(
        parsed
            .iter()
            .map(|(raw, selector)| wait_for_selector(page, raw, selector)),
    );

    tokio::time::timeout(timeout, all_present)
        .await
        .map(|_| ())
        .map_err(|_| AppError::ExtractionTimeout(TIMEOUT_MESSAGE.to_string()))
}

async fn wait_for_selector(page: &Page, raw: &str, selector: &Selector) {
    if page.matches(selector) {
        return;
    }

    let mut observer = page.observe();
    // A mutation may have landed between the first check and the subscription.
    if page.matches(selector) {
        observer.disconnect();
        return;
    }

    while observer.changed().await {
        if page.matches(selector) {
            debug!("Selector {} appeared", raw);
            observer.disconnect();
            return;
        }
    }

    // The page went away; only the timer can settle this wait now. The
    // observer detaches when the timed-out future is dropped.
    std::future::pending::<()>().await
}
