use serde::Serialize;

use crate::config::ColumnNames;
use crate::data::encoding::{detect_misdecoding, MisdecodeHint, SampleWindow};
use crate::data::model::ResolvedDataset;
use crate::data::stats::{group_means, paired_points, sort_by_mean_desc, GroupMean, Kpis, Regression};

/// Environment satisfaction (x) against satisfaction (y).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub points: Vec<[f64; 2]>,
    pub trend: Option<Regression>,
}

/// Everything the page renders, computed once per loaded dataset.
///
/// A chart field is `None` when its columns are missing or no row
/// survives numeric coercion; the page skips it without comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub kpis: Kpis,
    /// Sorted by mean, highest first.
    pub departments: Option<Vec<GroupMean>>,
    pub environment: Option<ScatterSeries>,
    /// Sorted by level.
    pub overtime: Option<Vec<GroupMean>>,
    pub misdecode: Option<MisdecodeHint>,
}

impl DashboardView {
    pub fn build(dataset: &ResolvedDataset, columns: &ColumnNames, window: SampleWindow) -> Self {
        let table = &dataset.table;

        let departments = group_means(table, &columns.department, &columns.satisfaction)
            .filter(|groups| !groups.is_empty())
            .map(|mut groups| {
                sort_by_mean_desc(&mut groups);
                groups
            });

        let environment = paired_points(table, &columns.environment_satisfaction, &columns.satisfaction)
            .filter(|points| !points.is_empty())
            .map(|points| ScatterSeries {
                trend: Regression::fit(&points),
                points,
            });

        let overtime = group_means(table, &columns.overtime, &columns.satisfaction)
            .filter(|groups| !groups.is_empty());

        Self {
            kpis: Kpis::compute(table, columns),
            departments,
            environment,
            overtime,
            misdecode: detect_misdecoding(&table.sample_text(window)),
        }
    }
}
