use std::path::PathBuf;

use serde::Serialize;

use crate::config::DashboardConfig;
use crate::dashboard::DashboardView;
use crate::data::model::{ParseAttempt, ResolvedDataset};
use crate::fonts::RenderContext;

/// Headless rendition of the dashboard for `--summary`.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub path: PathBuf,
    pub encoding: Option<&'static str>,
    pub score: f64,
    pub attempts: Vec<ParseAttempt>,
    pub font: String,
    /// Absent when the post-load guard tripped.
    pub dashboard: Option<DashboardView>,
}

impl Summary {
    pub fn build(dataset: &ResolvedDataset, render: &RenderContext, config: &DashboardConfig) -> Self {
        Self {
            path: dataset.path.clone(),
            encoding: dataset.encoding,
            score: dataset.score,
            attempts: dataset.attempts.clone(),
            font: render.identifier(),
            dashboard: dataset
                .is_usable()
                .then(|| DashboardView::build(dataset, &config.columns, config.sample)),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.dashboard.is_none()
    }
}
