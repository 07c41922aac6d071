use serde::{Deserialize, Serialize};

use super::model::{CellValue, Dataset};

/// Column used for outcome filtering and chart grouping.
pub const OUTCOME_COLUMN: &str = "Outcome";

// ---------------------------------------------------------------------------
// Outcome filter: single equality predicate on the Outcome column
// ---------------------------------------------------------------------------

/// The outcome filter selected in the control panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeFilter {
    #[default]
    All,
    Positive,
    Negative,
}

impl OutcomeFilter {
    /// All filters in control-panel order.
    pub const ALL: [OutcomeFilter; 3] = [
        OutcomeFilter::All,
        OutcomeFilter::Positive,
        OutcomeFilter::Negative,
    ];

    /// Radio-button label.
    pub fn label(self) -> &'static str {
        match self {
            OutcomeFilter::All => "All Cases",
            OutcomeFilter::Positive => "Diabetes",
            OutcomeFilter::Negative => "No Diabetes",
        }
    }

    /// The outcome value this filter selects, if it selects at all.
    fn target(self) -> Option<f64> {
        match self {
            OutcomeFilter::All => None,
            OutcomeFilter::Positive => Some(1.0),
            OutcomeFilter::Negative => Some(0.0),
        }
    }

    /// Whether a row with the given outcome cell passes the filter.
    ///
    /// `All` passes every row. `Positive`/`Negative` compare numerically, so
    /// integer 1 and float 1.0 both count as positive. Rows whose outcome is
    /// absent or non-numeric only pass `All`; the same holds for outcome
    /// values outside {0, 1}.
    pub fn matches(self, outcome: Option<&CellValue>) -> bool {
        match self.target() {
            None => true,
            Some(target) => outcome
                .and_then(CellValue::as_f64)
                .is_some_and(|v| v == target),
        }
    }
}

/// Indices of rows passing the outcome filter, in dataset order.
pub fn filtered_indices(dataset: &Dataset, filter: OutcomeFilter) -> Vec<usize> {
    let col = dataset.column_index(OUTCOME_COLUMN);
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| filter.matches(col.map(|c| &row[c])))
        .map(|(i, _)| i)
        .collect()
}
