use eframe::egui::{Align2, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::{generate_palette, SCATTER_POINT, TREND_LINE};
use crate::config::ColumnNames;
use crate::dashboard::{DashboardView, ScatterSeries};
use crate::data::stats::GroupMean;
use crate::fonts::{NumberFormat, RenderContext};

const CHART_HEIGHT: f32 = 300.0;

// ---------------------------------------------------------------------------
// Charts (central panel, below the KPIs)
// ---------------------------------------------------------------------------

/// Render every chart the view has data for. Missing ones are skipped.
pub fn charts(ui: &mut Ui, view: &DashboardView, columns: &ColumnNames, render: &RenderContext) {
    let numbers = render.number_format();

    if let Some(departments) = &view.departments {
        ui.heading("부서별 업무 만족도");
        mean_bar_chart(ui, "department_chart", departments, &columns.satisfaction, numbers);
        ui.add_space(12.0);
    }

    if let Some(series) = &view.environment {
        ui.heading("업무환경만족도와 업무만족도의 관계");
        scatter_chart(ui, series, columns, numbers);
        ui.add_space(12.0);
    }

    if let Some(overtime) = &view.overtime {
        ui.heading("야근정도별 업무만족도");
        mean_bar_chart(ui, "overtime_chart", overtime, &columns.satisfaction, numbers);
    }
}

/// One bar per group, labelled with its category on the x axis and its
/// mean (two decimals) above the bar.
fn mean_bar_chart(ui: &mut Ui, id: &str, groups: &[GroupMean], value_column: &str, numbers: NumberFormat) {
    let colors = generate_palette(groups.len());
    let bars: Vec<Bar> = groups
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, (group, color))| {
            Bar::new(i as f64, group.mean)
                .name(&group.key)
                .fill(color)
                .width(0.6)
        })
        .collect();

    let categories: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(format!("평균 {value_column}"))
        .x_axis_formatter(move |mark, _range| category_label(&categories, mark.value))
        .y_axis_formatter(move |mark, _range| numbers.format(mark.value, 1))
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
            for (i, group) in groups.iter().enumerate() {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(i as f64, group.mean),
                        numbers.format(group.mean, 2),
                    )
                    .anchor(Align2::CENTER_BOTTOM),
                );
            }
        });
}

/// Category name for integer grid marks, nothing in between.
fn category_label(categories: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

fn scatter_chart(ui: &mut Ui, series: &ScatterSeries, columns: &ColumnNames, numbers: NumberFormat) {
    Plot::new("environment_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(columns.environment_satisfaction.as_str())
        .y_axis_label(columns.satisfaction.as_str())
        .x_axis_formatter(move |mark, _range| numbers.format(mark.value, 1))
        .y_axis_formatter(move |mark, _range| numbers.format(mark.value, 1))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(series.points.clone()))
                    .radius(3.0)
                    .color(SCATTER_POINT)
                    .name("responses"),
            );

            if let Some(trend) = series.trend {
                let (lo, hi) = series
                    .points
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                        (lo.min(p[0]), hi.max(p[0]))
                    });
                let line = vec![[lo, trend.at(lo)], [hi, trend.at(hi)]];
                plot_ui.line(
                    Line::new(PlotPoints::from(line))
                        .color(TREND_LINE)
                        .width(2.0)
                        .name("linear fit"),
                );
            }
        });
}
