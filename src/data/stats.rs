use std::collections::BTreeMap;

use serde::Serialize;

use super::model::DataTable;
use crate::config::ColumnNames;

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

/// Parse a cell as a number. Anything unparsable (including empty, `NaN`
/// and infinities) is missing rather than an error.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Like [`coerce_numeric`] after dropping every character that is not an
/// ASCII digit, `.` or `-`, so `3,500,000원` reads as 3500000.
pub fn coerce_currency(cell: &str) -> Option<f64> {
    let digits: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    coerce_numeric(&digits)
}

/// Coerced values of a column, `None` when the column does not exist.
pub fn numeric_column(
    table: &DataTable,
    name: &str,
    coerce: fn(&str) -> Option<f64>,
) -> Option<Vec<Option<f64>>> {
    Some(table.column(name)?.map(coerce).collect())
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ---------------------------------------------------------------------------
// Group-by
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: String,
    pub mean: f64,
    /// Rows that contributed a numeric value.
    pub count: usize,
}

/// Mean of `value` per distinct `key`, keys in ascending order.
///
/// Rows with an empty key or a non-numeric value are skipped; groups with
/// no numeric value at all are dropped. `None` if either column is absent.
pub fn group_means(table: &DataTable, key: &str, value: &str) -> Option<Vec<GroupMean>> {
    let key_idx = table.column_index(key)?;
    let value_idx = table.column_index(value)?;

    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in &table.rows {
        let k = row[key_idx].as_str();
        if k.is_empty() {
            continue;
        }
        if let Some(v) = coerce_numeric(&row[value_idx]) {
            let entry = groups.entry(k).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }

    Some(
        groups
            .into_iter()
            .map(|(k, (sum, count))| GroupMean {
                key: k.to_owned(),
                mean: sum / count as f64,
                count,
            })
            .collect(),
    )
}

/// Highest mean first; equal means keep their key order.
pub fn sort_by_mean_desc(groups: &mut [GroupMean]) {
    groups.sort_by(|a, b| b.mean.total_cmp(&a.mean));
}

// ---------------------------------------------------------------------------
// Scatter + regression
// ---------------------------------------------------------------------------

/// `[x, y]` pairs for rows where both columns are numeric.
pub fn paired_points(table: &DataTable, x: &str, y: &str) -> Option<Vec<[f64; 2]>> {
    let x_idx = table.column_index(x)?;
    let y_idx = table.column_index(y)?;
    Some(
        table
            .rows
            .iter()
            .filter_map(|row| Some([coerce_numeric(&row[x_idx])?, coerce_numeric(&row[y_idx])?]))
            .collect(),
    )
}

/// Ordinary least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
}

impl Regression {
    /// Needs at least two points with distinct x.
    pub fn fit(points: &[[f64; 2]]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p[0]).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p[1]).sum::<f64>() / n;

        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), p| {
            let dx = p[0] - mean_x;
            (sxy + dx * (p[1] - mean_y), sxx + dx * dx)
        });
        if sxx <= f64::EPSILON {
            return None;
        }
        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// Mean of one source column. `mean` is `None` when the column exists but
/// holds no numeric value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub column: String,
    pub mean: Option<f64>,
}

impl Metric {
    fn of(table: &DataTable, column: &str, coerce: fn(&str) -> Option<f64>) -> Option<Self> {
        let values = numeric_column(table, column, coerce)?;
        Some(Self {
            column: column.to_owned(),
            mean: mean(values.into_iter().flatten()),
        })
    }
}

/// Headline numbers. A metric is `None` when its column is absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub headcount: usize,
    pub satisfaction: Option<Metric>,
    pub environment_satisfaction: Option<Metric>,
    pub salary: Option<Metric>,
}

impl Kpis {
    pub fn compute(table: &DataTable, columns: &ColumnNames) -> Self {
        Self {
            headcount: table.len(),
            satisfaction: Metric::of(table, &columns.satisfaction, coerce_numeric),
            environment_satisfaction: Metric::of(
                table,
                &columns.environment_satisfaction,
                coerce_numeric,
            ),
            salary: Metric::of(table, &columns.salary, coerce_currency),
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Round to an integer and group digits by thousands: `3,500,000`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
