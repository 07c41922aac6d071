use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::color::ColorMap;
use crate::data::filter::{filtered_indices, OutcomeFilter, OUTCOME_COLUMN};
use crate::data::model::{CellValue, Dataset};
use crate::stats::{self, CorrelationMatrix};

/// Columns entering the correlation heatmap, in display order.
pub const HEATMAP_COLUMNS: [&str; 4] = ["Glucose", "BMI", "Age", OUTCOME_COLUMN];
/// The histogram always shows the age distribution.
pub const HISTOGRAM_COLUMN: &str = "Age";
pub const HISTOGRAM_BINS: usize = 15;

const DEFAULT_X_COLUMN: &str = "Glucose";
const DEFAULT_Y_COLUMN: &str = "BMI";
const DENSITY_GRID_POINTS: usize = 128;

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

/// User-chosen filter and axes, decoupled from any widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub outcome: OutcomeFilter,
    pub x_column: String,
    pub y_column: String,
}

impl Selection {
    /// Default axes: Glucose vs BMI, falling back to the first two columns.
    pub fn defaults_for(dataset: &Dataset) -> Self {
        let pick = |preferred: &str, fallback: usize| {
            if dataset.column_index(preferred).is_some() {
                preferred.to_string()
            } else {
                dataset.columns.get(fallback).cloned().unwrap_or_default()
            }
        };
        Selection {
            outcome: OutcomeFilter::All,
            x_column: pick(DEFAULT_X_COLUMN, 0),
            y_column: pick(DEFAULT_Y_COLUMN, 1),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart data: the per-refresh snapshot everything draws from
// ---------------------------------------------------------------------------

/// One plotted series (scatter points or a density curve) for a single
/// outcome group.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

/// Histogram bars for one outcome group, aligned with [`ChartData::bin_edges`].
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    pub label: String,
    pub color: Color32,
    pub counts: Vec<f64>,
}

/// Everything the three charts draw, rebuilt wholesale by
/// [`AppState::refresh`]. Never updated incrementally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub scatter_title: String,
    pub scatter: Vec<Series>,
    pub bin_edges: Vec<f64>,
    pub histogram: Vec<HistogramSeries>,
    pub density: Vec<Series>,
    pub correlation: CorrelationMatrix,
    /// Size of the filtered view, for the status line.
    pub visible_rows: usize,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset, read-only after construction.
    pub dataset: Dataset,

    /// Current outcome filter and axis choices.
    pub selection: Selection,

    /// Latest chart snapshot (recomputed by `refresh`).
    pub charts: ChartData,

    /// Outcome value → colour, built over the full dataset so groups keep
    /// their colour across filter changes.
    pub colors: ColorMap,

    /// Error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: Dataset) -> Self {
        let selection = Selection::defaults_for(&dataset);
        let colors = outcome_colors(&dataset);
        let mut state = AppState {
            dataset,
            selection,
            charts: ChartData::default(),
            colors,
            status_message: None,
        };
        state.refresh();
        state
    }

    // -- Setters: mutate selection only, never recompute --

    pub fn set_outcome_filter(&mut self, filter: OutcomeFilter) {
        self.selection.outcome = filter;
    }

    pub fn set_x_axis(&mut self, column: impl Into<String>) {
        self.selection.x_column = column.into();
    }

    pub fn set_y_axis(&mut self, column: impl Into<String>) {
        self.selection.y_column = column.into();
    }

    /// Swap in a newly opened dataset, keeping the outcome filter but
    /// resetting axis choices that no longer exist.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        self.colors = outcome_colors(&dataset);
        if dataset.column_index(&self.selection.x_column).is_none()
            || dataset.column_index(&self.selection.y_column).is_none()
        {
            let outcome = self.selection.outcome;
            self.selection = Selection::defaults_for(&dataset);
            self.selection.outcome = outcome;
        }
        self.dataset = dataset;
        self.status_message = None;
        self.refresh();
    }

    /// The sole render entry point: recompute the filtered view and rebuild
    /// all three charts. Runs synchronously to completion; an empty view
    /// produces empty/NaN chart data rather than an error.
    pub fn refresh(&mut self) {
        let indices = filtered_indices(&self.dataset, self.selection.outcome);
        let groups = outcome_groups(&self.dataset, &indices);

        // -- Scatter: X vs Y, one series per outcome group --
        let x_col = self.dataset.column_index(&self.selection.x_column);
        let y_col = self.dataset.column_index(&self.selection.y_column);
        let scatter: Vec<Series> = groups
            .iter()
            .map(|(value, idxs)| Series {
                label: value.to_string(),
                color: self.colors.color_for(value),
                points: match (x_col, y_col) {
                    (Some(x), Some(y)) => idxs
                        .iter()
                        .filter_map(|&i| {
                            Some([
                                self.dataset.rows[i][x].as_f64()?,
                                self.dataset.rows[i][y].as_f64()?,
                            ])
                        })
                        .collect(),
                    _ => Vec::new(),
                },
            })
            .collect();

        // -- Histogram: fixed Age column, shared bins, per-group counts --
        let all_ages = self.dataset.numeric_column(HISTOGRAM_COLUMN, &indices);
        let bin_edges = stats::bin_edges(&all_ages, HISTOGRAM_BINS);

        let mut histogram = Vec::with_capacity(groups.len());
        let mut density = Vec::with_capacity(groups.len());
        for (value, idxs) in &groups {
            let ages = self.dataset.numeric_column(HISTOGRAM_COLUMN, idxs);
            let label = value.to_string();
            let color = self.colors.color_for(value);
            histogram.push(HistogramSeries {
                label: label.clone(),
                color,
                counts: stats::bin_counts(&ages, &bin_edges),
            });

            // Smoothed density overlay, scaled from probability density to
            // the histogram's count scale (n * bin width).
            if let (Some(&lo), Some(&hi)) = (bin_edges.first(), bin_edges.last()) {
                let grid: Vec<f64> = (0..DENSITY_GRID_POINTS)
                    .map(|i| lo + (hi - lo) * i as f64 / (DENSITY_GRID_POINTS - 1) as f64)
                    .collect();
                let curve = stats::gaussian_kde(&ages, &grid);
                if !curve.is_empty() {
                    let n = ages.iter().filter(|v| v.is_finite()).count() as f64;
                    let bin_width = (hi - lo) / HISTOGRAM_BINS as f64;
                    density.push(Series {
                        label,
                        color,
                        points: grid
                            .iter()
                            .zip(&curve)
                            .map(|(&g, &d)| [g, d * n * bin_width])
                            .collect(),
                    });
                }
            }
        }

        // -- Heatmap: Pearson matrix over the fixed column set --
        let correlation = stats::correlation_matrix(&self.dataset, &indices, &HEATMAP_COLUMNS);

        self.charts = ChartData {
            scatter_title: format!(
                "{} vs {}",
                self.selection.y_column, self.selection.x_column
            ),
            scatter,
            bin_edges,
            histogram,
            density,
            correlation,
            visible_rows: indices.len(),
        };
    }
}

/// Outcome value → colour map over the full dataset.
fn outcome_colors(dataset: &Dataset) -> ColorMap {
    let values: BTreeSet<CellValue> = match dataset.column_index(OUTCOME_COLUMN) {
        Some(col) => dataset.rows.iter().map(|r| r[col].clone()).collect(),
        None => BTreeSet::new(),
    };
    ColorMap::new(&values)
}

/// Group the filtered rows by their outcome value, sorted by value. With no
/// outcome column the whole view forms one unlabelled group.
fn outcome_groups(dataset: &Dataset, indices: &[usize]) -> Vec<(CellValue, Vec<usize>)> {
    match dataset.column_index(OUTCOME_COLUMN) {
        Some(col) => {
            let mut groups: BTreeMap<CellValue, Vec<usize>> = BTreeMap::new();
            for &i in indices {
                groups.entry(dataset.rows[i][col].clone()).or_default().push(i);
            }
            groups.into_iter().collect()
        }
        None => {
            if indices.is_empty() {
                Vec::new()
            } else {
                vec![(CellValue::Null, indices.to_vec())]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(glucose: i64, bmi: f64, age: i64, outcome: i64) -> Vec<CellValue> {
        vec![
            CellValue::Integer(glucose),
            CellValue::Float(bmi),
            CellValue::Integer(age),
            CellValue::Integer(outcome),
        ]
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec!["Glucose".into(), "BMI".into(), "Age".into(), "Outcome".into()],
            vec![
                row(90, 22.0, 25, 0),
                row(100, 25.0, 30, 0),
                row(120, 28.5, 41, 0),
                row(140, 31.0, 45, 1),
                row(150, 32.0, 52, 1),
                row(165, 36.5, 60, 1),
            ],
        )
    }

    #[test]
    fn setters_do_not_recompute() {
        let mut state = AppState::new(sample());
        let before = state.charts.clone();
        state.set_outcome_filter(OutcomeFilter::Positive);
        state.set_x_axis("Age");
        state.set_y_axis("Glucose");
        assert_eq!(state.charts, before);
    }

    #[test]
    fn all_filter_shows_every_row() {
        let state = AppState::new(sample());
        assert_eq!(state.charts.visible_rows, 6);
        let total: usize = state.charts.scatter.iter().map(|s| s.points.len()).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn changing_only_x_leaves_histogram_and_heatmap_unchanged() {
        let mut state = AppState::new(sample());
        state.refresh();
        let before = state.charts.clone();

        state.set_x_axis("Age");
        state.refresh();

        assert_eq!(state.charts.histogram, before.histogram);
        assert_eq!(state.charts.density, before.density);
        assert_eq!(state.charts.correlation, before.correlation);
        assert_ne!(state.charts.scatter, before.scatter);
        assert_eq!(state.charts.scatter_title, "BMI vs Age");
    }

    #[test]
    fn outcome_filter_splits_the_view() {
        let mut state = AppState::new(sample());
        state.set_outcome_filter(OutcomeFilter::Positive);
        state.refresh();
        assert_eq!(state.charts.visible_rows, 3);
        // a single group remains in the scatter legend
        assert_eq!(state.charts.scatter.len(), 1);
        assert_eq!(state.charts.scatter[0].label, "1");
    }

    #[test]
    fn single_row_view_yields_nan_heatmap_without_panicking() {
        let ds = Dataset::new(
            vec!["Glucose".into(), "BMI".into(), "Age".into(), "Outcome".into()],
            vec![row(100, 25.0, 30, 0), row(150, 32.0, 45, 1)],
        );
        let mut state = AppState::new(ds);
        state.set_outcome_filter(OutcomeFilter::Positive);
        state.refresh();
        assert_eq!(state.charts.visible_rows, 1);
        assert!(state
            .charts
            .correlation
            .values
            .iter()
            .all(|r| r.iter().all(|v| v.is_nan())));
    }

    #[test]
    fn empty_view_produces_empty_charts() {
        let ds = Dataset::new(
            vec!["Glucose".into(), "BMI".into(), "Age".into(), "Outcome".into()],
            vec![row(100, 25.0, 30, 0)],
        );
        let mut state = AppState::new(ds);
        state.set_outcome_filter(OutcomeFilter::Positive);
        state.refresh();
        assert_eq!(state.charts.visible_rows, 0);
        assert!(state.charts.scatter.is_empty());
        assert!(state.charts.bin_edges.is_empty());
        assert!(state.charts.density.is_empty());
    }

    #[test]
    fn replace_dataset_resets_missing_axes() {
        let mut state = AppState::new(sample());
        state.set_x_axis("Age");
        state.set_outcome_filter(OutcomeFilter::Negative);
        state.replace_dataset(Dataset::new(
            vec!["Glucose".into(), "BMI".into(), "Outcome".into()],
            vec![vec![
                CellValue::Integer(100),
                CellValue::Float(25.0),
                CellValue::Integer(0),
            ]],
        ));
        // "Age" no longer exists, axes fall back to the defaults
        assert_eq!(state.selection.x_column, "Glucose");
        assert_eq!(state.selection.y_column, "BMI");
        // the filter choice survives the swap
        assert_eq!(state.selection.outcome, OutcomeFilter::Negative);
        assert_eq!(state.charts.visible_rows, 1);
    }

    #[test]
    fn selection_round_trips_through_serde() {
        let selection = Selection {
            outcome: OutcomeFilter::Positive,
            x_column: "Age".into(),
            y_column: "Glucose".into(),
        };
        let json = serde_json::to_string(&selection).unwrap();
        let back: Selection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, selection);
    }
}
