pub mod api;
pub mod config;
pub mod content_script;
pub mod dom;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod orchestrator;
pub mod page;
pub mod readiness;
pub mod render;
pub mod scoring;
pub mod tabs;

use std::sync::Arc;
use config::Config;
use error::Result;
use extract::ExtractOptions;
use orchestrator::{Orchestrator, RetryPolicy};
use scoring::ScoringClient;
use tabs::LocalTabHost;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tabs: Arc<LocalTabHost>,
    pub orchestrator: Arc<Orchestrator<LocalTabHost>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let tabs = Arc::new(LocalTabHost::new(ExtractOptions {
            readiness_timeout: config.readiness_timeout,
            include_raw_html: config.include_raw_html,
        }));
        let scoring = ScoringClient::new(config.scoring_url.clone())?;
        let orchestrator = Orchestrator::new(Arc::clone(&tabs), scoring, RetryPolicy::from(&config));

        Ok(AppState {
            config: Arc::new(config),
            tabs,
            orchestrator: Arc::new(orchestrator),
        })
    }
}
