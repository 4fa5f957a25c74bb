use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::data::encoding::SampleWindow;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Employee satisfaction survey dashboard.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The survey CSV to open. Overrides `data_path` from the
    /// configuration file.
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// (file path) JSON configuration file. Every field is optional.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print a JSON summary of the load and the KPIs to stdout instead of
    /// opening the window.
    #[arg(long)]
    pub summary: bool,

    /// Turn on debug logging.
    #[arg(long)]
    pub verbose: bool,
}

// ---------------------------------------------------------------------------
// Configuration file
// ---------------------------------------------------------------------------

/// Names of the survey columns the dashboard reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub department: String,
    pub satisfaction: String,
    pub environment_satisfaction: String,
    pub overtime: String,
    pub salary: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            department: "부서".to_owned(),
            satisfaction: "업무만족도".to_owned(),
            environment_satisfaction: "업무환경만족도".to_owned(),
            overtime: "야근정도".to_owned(),
            salary: "월급여".to_owned(),
        }
    }
}

/// Where to look for a Hangul-capable font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font files shipped with the application, tried first, in order.
    pub bundled: Vec<PathBuf>,
    /// Installed families, tried in order when no bundled file exists.
    pub system_preferences: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            bundled: [
                "assets/fonts/NanumGothic.ttf",
                "assets/fonts/NanumGothic-Regular.ttf",
                "assets/fonts/NotoSansKR-Regular.otf",
                "assets/fonts/NotoSansKR-Regular.ttf",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            system_preferences: [
                "Malgun Gothic",
                "AppleGothic",
                "Apple SD Gothic Neo",
                "NanumGothic",
                "Noto Sans CJK KR",
                "Noto Sans KR",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub columns: ColumnNames,
    /// Appended to the mean salary KPI.
    pub currency_suffix: String,
    pub fonts: FontConfig,
    pub sample: SampleWindow,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("HR Data.csv"),
            columns: ColumnNames::default(),
            currency_suffix: "원".to_owned(),
            fonts: FontConfig::default(),
            sample: SampleWindow::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config file (if any) with command-line overrides applied.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(data) = &args.data {
            config.data_path = data.clone();
        }
        Ok(config)
    }
}
