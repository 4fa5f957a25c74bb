use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::DashboardConfig;
use crate::dashboard::DashboardView;
use crate::data::cache::DatasetCache;
use crate::data::loader::EncodingLoader;
use crate::data::model::ResolvedDataset;

/// How often the data file's modification time is checked.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// File currently shown.
    data_path: PathBuf,

    cache: DatasetCache,

    /// Loaded dataset (None until the first refresh).
    pub dataset: Option<Arc<ResolvedDataset>>,

    /// Derived KPIs and chart series for `dataset`.
    pub view: Option<DashboardView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    last_poll: Instant,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            data_path: config.data_path.clone(),
            cache: DatasetCache::new(EncodingLoader::new(config.sample)),
            config,
            dataset: None,
            view: None,
            status_message: None,
            last_poll: Instant::now(),
        }
    }

    /// Switch to another file.
    pub fn open(&mut self, path: PathBuf) {
        self.data_path = path;
        self.refresh();
    }

    /// Fetch the current file through the cache and rebuild the view if
    /// the dataset changed.
    pub fn refresh(&mut self) {
        let dataset = self.cache.get(&self.data_path);
        if self
            .dataset
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &dataset))
        {
            return;
        }

        if dataset.is_usable() {
            let view = DashboardView::build(&dataset, &self.config.columns, self.config.sample);
            if let Some(hint) = view.misdecode {
                log::warn!("{}: {hint}", dataset.path.display());
            }
            self.view = Some(view);
            self.status_message = None;
        } else {
            log::error!("Could not load {}", dataset.path.display());
            self.view = None;
            self.status_message = Some(format!(
                "Could not load {} with any encoding",
                dataset.path.display()
            ));
        }
        self.dataset = Some(dataset);
    }

    /// Drop the cached entry and load again.
    pub fn reload(&mut self) {
        self.cache.invalidate(&self.data_path);
        self.refresh();
    }

    /// Reload when the file changed on disk; checks at most once per
    /// [`POLL_INTERVAL`].
    pub fn poll_for_changes(&mut self) {
        if self.last_poll.elapsed() < POLL_INTERVAL {
            return;
        }
        self.last_poll = Instant::now();
        if self.cache.is_stale(&self.data_path) {
            log::info!("{} changed, reloading", self.data_path.display());
            self.refresh();
        }
    }

    /// The post-load guard: nothing but the error may be rendered.
    pub fn is_fatal(&self) -> bool {
        self.dataset.as_ref().is_some_and(|ds| !ds.is_usable())
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_csv(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "survey-lens-state-{}-{name}.csv",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn refresh_builds_view_for_usable_file() {
        let path = temp_csv("usable", "부서,업무만족도\n영업,4\n".as_bytes());
        let mut state = AppState::new(DashboardConfig {
            data_path: path.clone(),
            ..DashboardConfig::default()
        });

        state.refresh();
        assert!(!state.is_fatal());
        assert!(state.status_message.is_none());
        assert_eq!(state.view.as_ref().unwrap().kpis.headcount, 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unloadable_file_trips_the_guard() {
        let mut state = AppState::new(DashboardConfig::default());
        assert_eq!(state.data_path(), Path::new("HR Data.csv"));
        state.open(PathBuf::from("/nonexistent/survey-lens/HR Data.csv"));
        assert_eq!(state.data_path(), Path::new("/nonexistent/survey-lens/HR Data.csv"));

        assert!(state.is_fatal());
        assert!(state.view.is_none());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn reload_picks_up_new_contents() {
        let path = temp_csv("reload", "부서,업무만족도\n영업,4\n".as_bytes());
        let mut state = AppState::new(DashboardConfig::default());
        state.open(path.clone());
        assert_eq!(state.view.as_ref().unwrap().kpis.headcount, 1);

        std::fs::write(&path, "부서,업무만족도\n영업,4\n개발,2\n").unwrap();
        state.reload();
        assert_eq!(state.view.as_ref().unwrap().kpis.headcount, 2);

        std::fs::remove_file(&path).unwrap();
    }
}
