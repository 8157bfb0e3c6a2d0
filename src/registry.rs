//! Process-wide table of registered apps and direct tools.
//!
//! Resource modules register an [`AppConfig`] whose views loader yields the
//! app's ViewSets, plus any tools that are called directly by name. The catalog
//! and the dispatcher read only from here.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::tool::Tool;
use crate::viewset::{model_name, ViewSet};

pub type ViewsLoader = Box<dyn Fn() -> Result<Vec<Arc<dyn ViewSet>>> + Send + Sync>;

/// One registered app and the loader for its views.
pub struct AppConfig {
    label: String,
    loader: ViewsLoader,
}

impl AppConfig {
    pub fn new<F>(label: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Vec<Arc<dyn ViewSet>>> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            loader: Box::new(loader),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn load_views(&self) -> Result<Vec<Arc<dyn ViewSet>>> {
        (self.loader)()
    }
}

#[derive(Default)]
pub struct Registry {
    apps: Vec<AppConfig>,
    tools: Vec<Arc<dyn Tool>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_app<F>(&mut self, label: impl Into<String>, loader: F) -> &mut Self
    where
        F: Fn() -> Result<Vec<Arc<dyn ViewSet>>> + Send + Sync + 'static,
    {
        self.apps.push(AppConfig::new(label, loader));
        self
    }

    /// Registers an app that exposes a single, already constructed ViewSet.
    pub fn register_viewset(&mut self, label: impl Into<String>, viewset: Arc<dyn ViewSet>) -> &mut Self {
        self.register_app(label, move || Ok(vec![viewset.clone()]))
    }

    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        self.tools.push(tool);
        self
    }

    /// Keeps only the apps whose label is in `allowed`.
    pub fn retain_apps(&mut self, allowed: &[String]) {
        self.apps.retain(|app| allowed.iter().any(|a| a == app.label()));
    }

    pub fn apps(&self) -> &[AppConfig] {
        &self.apps
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Finds a direct tool by exact name. Later registrations shadow earlier ones.
    pub fn find_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .rev()
            .find(|tool| tool.descriptor().name == name)
            .cloned()
    }

    /// Loads the views of every app, skipping apps whose loader fails.
    pub fn viewsets(&self) -> Vec<(String, Arc<dyn ViewSet>)> {
        let mut found = Vec::new();
        for app in &self.apps {
            match app.load_views() {
                Ok(views) => {
                    found.extend(views.into_iter().map(|v| (app.label().to_string(), v)));
                }
                Err(e) => {
                    debug!(app = app.label(), error = %e, "Skipping app without loadable views");
                }
            }
        }
        found
    }

    /// Finds the ViewSet serving `model` (case-insensitive) in app `app`.
    /// When several match, the last registered wins.
    pub fn find_viewset(&self, app: &str, model: &str) -> Option<Arc<dyn ViewSet>> {
        let model = model.to_lowercase();
        self.apps
            .iter()
            .rev()
            .filter(|config| config.label() == app)
            .filter_map(|config| config.load_views().ok())
            .find_map(|views| {
                views
                    .into_iter()
                    .rev()
                    .find(|v| model_name(v.as_ref()).to_lowercase() == model)
            })
    }

    /// Finds the ViewSet routed under `prefix` in the REST API.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<Arc<dyn ViewSet>> {
        self.viewsets()
            .into_iter()
            .rev()
            .map(|(_, viewset)| viewset)
            .find(|v| v.route_prefix() == prefix)
    }
}
