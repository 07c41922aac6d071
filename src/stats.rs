use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Pearson correlation
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient over the pairs where both sides are
/// finite. Returns NaN for fewer than two pairs or when either side has
/// zero variance (the degenerate single-row case ends up here).
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }
    let n_f = n as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n_f;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n_f;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        cov / denom
    }
}

/// Pairwise Pearson correlations over the filtered rows, restricted to the
/// columns of `names` that exist in the dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// `values[i][j]` correlates `labels[i]` with `labels[j]`.
    pub values: Vec<Vec<f64>>,
}

pub fn correlation_matrix(dataset: &Dataset, indices: &[usize], names: &[&str]) -> CorrelationMatrix {
    let labels: Vec<String> = names
        .iter()
        .filter(|n| dataset.column_index(n).is_some())
        .map(|n| n.to_string())
        .collect();
    let series: Vec<Vec<f64>> = labels
        .iter()
        .map(|n| dataset.numeric_column(n, indices))
        .collect();

    let values = (0..labels.len())
        .map(|i| {
            (0..labels.len())
                .map(|j| pearson(&series[i], &series[j]))
                .collect()
        })
        .collect();

    CorrelationMatrix { labels, values }
}

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

/// Equal-width bin edges over the finite values (`bins + 1` edges). Empty
/// input yields no edges; a zero-width range is widened so a lone value
/// still lands in a bin.
pub fn bin_edges(values: &[f64], bins: usize) -> Vec<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    // force the last edge onto the maximum so it cannot fall out of range
    (0..=bins)
        .map(|i| if i == bins { hi } else { lo + i as f64 * width })
        .collect()
}

/// Per-bin counts of the finite values that fall inside `edges`. The
/// maximum value belongs to the last bin.
pub fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<f64> {
    if edges.len() < 2 {
        return Vec::new();
    }
    let bins = edges.len() - 1;
    let lo = edges[0];
    let hi = edges[bins];
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0.0; bins];
    for &v in values {
        if !v.is_finite() || v < lo || v > hi {
            continue;
        }
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1.0;
    }
    counts
}

// ---------------------------------------------------------------------------
// Kernel density estimate (the smoothed histogram overlay)
// ---------------------------------------------------------------------------

/// Gaussian KDE with Scott's-rule bandwidth, evaluated at `grid`. Fewer
/// than two finite values or zero spread yields an empty curve.
pub fn gaussian_kde(values: &[f64], grid: &[f64]) -> Vec<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    if n < 2 {
        return Vec::new();
    }

    let n_f = n as f64;
    let mean = finite.iter().sum::<f64>() / n_f;
    let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n_f - 1.0);
    let sigma = var.sqrt();
    if sigma == 0.0 {
        return Vec::new();
    }
    let bandwidth = sigma * n_f.powf(-0.2);

    let norm = 1.0 / (n_f * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    grid.iter()
        .map(|&g| {
            norm * finite
                .iter()
                .map(|&v| (-0.5 * ((g - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn pearson_detects_perfect_linear_relations() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let down: Vec<f64> = x.iter().map(|v| -3.0 * v).collect();
        assert_close(pearson(&x, &up), 1.0);
        assert_close(pearson(&x, &down), -1.0);
    }

    #[test]
    fn pearson_degenerate_inputs_are_nan() {
        assert!(pearson(&[], &[]).is_nan());
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        // zero variance on one side
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        // NaN pairs are skipped, leaving a single pair
        assert!(pearson(&[1.0, f64::NAN], &[2.0, 3.0]).is_nan());
    }

    #[test]
    fn correlation_matrix_over_one_row_is_nan_filled() {
        let ds = Dataset::new(
            vec!["Glucose".into(), "BMI".into()],
            vec![vec![CellValue::Integer(100), CellValue::Float(25.0)]],
        );
        let m = correlation_matrix(&ds, &[0], &["Glucose", "BMI", "Age"]);
        // "Age" is absent and silently skipped.
        assert_eq!(m.labels, vec!["Glucose", "BMI"]);
        assert!(m
            .values
            .iter()
            .all(|row| row.iter().all(|v| v.is_nan())));
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let ds = Dataset::new(
            vec!["Glucose".into(), "BMI".into()],
            vec![
                vec![CellValue::Integer(90), CellValue::Float(22.0)],
                vec![CellValue::Integer(120), CellValue::Float(28.5)],
                vec![CellValue::Integer(150), CellValue::Float(31.0)],
            ],
        );
        let m = correlation_matrix(&ds, &[0, 1, 2], &["Glucose", "BMI"]);
        assert_close(m.values[0][0], 1.0);
        assert_close(m.values[1][1], 1.0);
        assert_close(m.values[0][1], m.values[1][0]);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let edges = bin_edges(&values, 4);
        assert_eq!(edges.len(), 5);
        let counts = bin_counts(&values, &edges);
        assert_eq!(counts.iter().sum::<f64>(), 5.0);
        // the maximum lands in the last bin, not past it
        assert_eq!(counts[3], 2.0);
    }

    #[test]
    fn histogram_handles_degenerate_inputs() {
        assert!(bin_edges(&[], 15).is_empty());
        assert!(bin_counts(&[1.0], &[]).is_empty());
        // single distinct value: widened range, everything in one pass
        let edges = bin_edges(&[7.0, 7.0], 15);
        let counts = bin_counts(&[7.0, 7.0], &edges);
        assert_eq!(counts.iter().sum::<f64>(), 2.0);
    }

    #[test]
    fn kde_is_positive_and_peaks_near_the_data() {
        let values = [10.0, 11.0, 12.0, 11.5, 10.5];
        let grid = [5.0, 11.0, 17.0];
        let density = gaussian_kde(&values, &grid);
        assert_eq!(density.len(), 3);
        assert!(density.iter().all(|d| *d >= 0.0));
        assert!(density[1] > density[0] && density[1] > density[2]);
    }

    #[test]
    fn kde_degenerate_inputs_yield_empty_curves() {
        assert!(gaussian_kde(&[], &[0.0]).is_empty());
        assert!(gaussian_kde(&[1.0], &[0.0]).is_empty());
        assert!(gaussian_kde(&[2.0, 2.0, 2.0], &[0.0]).is_empty());
    }
}
