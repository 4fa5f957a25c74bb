use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{ParseAttempt, ResolvedDataset};
use crate::data::stats::{format_thousands, Kpis, Metric};
use crate::fonts::RenderContext;
use crate::state::AppState;
use crate::ui::plot;

const WARNING: Color32 = Color32::from_rgb(200, 140, 0);

// ---------------------------------------------------------------------------
// Central panel – the dashboard page
// ---------------------------------------------------------------------------

/// Render the page: title, guard messages, KPIs, diagnostics and charts.
pub fn dashboard(ui: &mut Ui, state: &AppState, render: &RenderContext) {
    ui.heading(RichText::new("업무만족도 분석 대시보드").size(26.0));
    ui.add_space(6.0);

    if state.is_fatal() {
        let msg = state
            .status_message
            .as_deref()
            .unwrap_or("Could not load the data file");
        ui.label(RichText::new(msg).color(Color32::RED).strong());
        return;
    }

    let (Some(dataset), Some(view)) = (&state.dataset, &state.view) else {
        ui.label("No dataset loaded.");
        return;
    };

    if let Some(hint) = view.misdecode {
        ui.label(
            RichText::new(format!(
                "⚠ The text may still be decoded with the wrong encoding: {hint}"
            ))
            .color(WARNING),
        );
        ui.add_space(4.0);
    }

    kpi_row(ui, &view.kpis, &state.config.currency_suffix, render);
    ui.add_space(4.0);

    ui.label(RichText::new(caption(dataset, render)).small().weak());
    egui::CollapsingHeader::new("Encoding diagnostics")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            attempts_table(ui, &dataset.attempts, dataset.encoding);
        });

    ui.separator();
    plot::charts(ui, view, &state.config.columns, render);
}

/// `encoding: cp949 (score 0.412) · font: system:Malgun Gothic`
fn caption(dataset: &ResolvedDataset, render: &RenderContext) -> String {
    format!(
        "encoding: {} (score {:.3}) · font: {}",
        dataset.encoding.unwrap_or("none"),
        dataset.score,
        render.identifier()
    )
}

fn kpi_row(ui: &mut Ui, kpis: &Kpis, currency_suffix: &str, render: &RenderContext) {
    ui.columns(4, |cols| {
        metric(&mut cols[0], "전체 직원 수", headcount_text(kpis.headcount));
        if let Some(m) = &kpis.satisfaction {
            metric(&mut cols[1], "평균 업무만족도", mean_text(m, |v| render.format_number(v, 2)));
        }
        if let Some(m) = &kpis.environment_satisfaction {
            metric(
                &mut cols[2],
                "평균 업무환경만족도",
                mean_text(m, |v| render.format_number(v, 2)),
            );
        }
        if let Some(m) = &kpis.salary {
            metric(
                &mut cols[3],
                "평균 월급여",
                mean_text(m, |v| format!("{}{currency_suffix}", format_thousands(v))),
            );
        }
    });
}

/// `1,470명`
fn headcount_text(headcount: usize) -> String {
    format!("{}명", format_thousands(headcount as f64))
}

fn mean_text(metric: &Metric, format: impl Fn(f64) -> String) -> String {
    metric.mean.map(format).unwrap_or_else(|| "-".to_owned())
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.label(RichText::new(label).weak());
    ui.label(RichText::new(value).size(28.0).strong());
}

fn attempts_table(ui: &mut Ui, attempts: &[ParseAttempt], winner: Option<&str>) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Encoding", "Score", "Status"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for attempt in attempts {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        let name = RichText::new(attempt.encoding);
                        if winner == Some(attempt.encoding) {
                            ui.label(name.strong());
                        } else {
                            ui.label(name);
                        }
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.3}", attempt.score));
                    });
                    row.col(|ui| {
                        if attempt.is_ok() {
                            ui.label(attempt.status());
                        } else {
                            ui.label(RichText::new(attempt.status()).color(Color32::RED));
                        }
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(state.data_path().display().to_string());
        if let Some(ds) = &state.dataset {
            if ds.is_usable() {
                ui.label(format!("{} rows", format_thousands(ds.table.len() as f64)));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open survey data")
        .add_filter("CSV", &["csv", "txt"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.open(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::EncodingLoader;
    use std::path::Path;

    #[test]
    fn caption_names_encoding_score_and_font() {
        let dataset = EncodingLoader::default().load_bytes(Path::new("x.csv"), "a\n가\n".as_bytes());
        assert_eq!(
            caption(&dataset, &RenderContext::fallback()),
            "encoding: utf-8-sig (score 1.000) · font: fallback"
        );
    }

    #[test]
    fn caption_without_winner() {
        let dataset = EncodingLoader::default().load_bytes(Path::new("x.csv"), b"");
        assert_eq!(
            caption(&dataset, &RenderContext::fallback()),
            "encoding: none (score -1.000) · font: fallback"
        );
    }

    #[test]
    fn headcount_is_thousands_separated_with_counter() {
        assert_eq!(headcount_text(1470), "1,470명");
        assert_eq!(headcount_text(0), "0명");
    }

    #[test]
    fn metric_without_numbers_shows_dash() {
        let m = Metric {
            column: "업무만족도".into(),
            mean: None,
        };
        assert_eq!(mean_text(&m, |v| format!("{v:.2}")), "-");
        let m = Metric {
            column: "월급여".into(),
            mean: Some(3_500_000.0),
        };
        assert_eq!(mean_text(&m, |v| format_thousands(v) + "원"), "3,500,000원");
    }
}
