mod app;
mod color;
mod config;
mod dashboard;
mod data;
mod fonts;
mod report;
mod state;
mod ui;

use anyhow::{bail, Context, Result};
use clap::Parser;
use eframe::egui;

use app::SurveyLensApp;
use config::{Args, DashboardConfig};
use data::loader::EncodingLoader;
use fonts::{FontResolver, RenderContext, SystemFonts};
use report::Summary;
use state::AppState;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = DashboardConfig::from_args(&args)?;
    let render = FontResolver::new(&config.fonts).resolve(&SystemFonts::load());

    if args.summary {
        return print_summary(&config, &render);
    }

    let mut state = AppState::new(config);
    state.refresh();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Survey Lens – Satisfaction Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(SurveyLensApp::new(cc, state, render)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn print_summary(config: &DashboardConfig, render: &RenderContext) -> Result<()> {
    let dataset = EncodingLoader::new(config.sample).load(&config.data_path);
    let summary = Summary::build(&dataset, render, config);
    let json = serde_json::to_string_pretty(&summary).context("serializing summary")?;
    println!("{json}");

    if summary.is_fatal() {
        bail!(
            "could not load {} with any encoding",
            config.data_path.display()
        );
    }
    Ok(())
}
