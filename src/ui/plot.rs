use eframe::egui::{pos2, Align2, FontId, Rect, Sense, Ui, Vec2};
use egui_extras::{Size, StripBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color;
use crate::state::AppState;

const HISTOGRAM_TITLE: &str = "Age Distribution";
const HEATMAP_TITLE: &str = "Correlation Heatmap";

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Fixed layout: scatter and histogram side by side on the first row, the
/// heatmap spanning the full width of the second. Each region is redrawn
/// from the current `ChartData` snapshot every frame.
pub fn charts(ui: &mut Ui, state: &AppState) {
    StripBuilder::new(ui)
        .size(Size::relative(0.5))
        .size(Size::remainder())
        .vertical(|mut strip| {
            strip.strip(|builder| {
                builder
                    .size(Size::relative(0.5))
                    .size(Size::remainder())
                    .horizontal(|mut strip| {
                        strip.cell(|ui| scatter_chart(ui, state));
                        strip.cell(|ui| histogram_chart(ui, state));
                    });
            });
            strip.cell(|ui| heatmap_chart(ui, state));
        });
}

// ---------------------------------------------------------------------------
// Scatter plot
// ---------------------------------------------------------------------------

fn scatter_chart(ui: &mut Ui, state: &AppState) {
    let charts = &state.charts;
    ui.vertical(|ui: &mut Ui| {
        ui.strong(&charts.scatter_title);
        Plot::new("scatter")
            .legend(Legend::default())
            .x_axis_label(&state.selection.x_column)
            .y_axis_label(&state.selection.y_column)
            .show(ui, |plot_ui| {
                for series in &charts.scatter {
                    let points: PlotPoints = series.points.iter().copied().collect();
                    plot_ui.points(
                        Points::new(points)
                            .name(&series.label)
                            .color(series.color)
                            .radius(2.5),
                    );
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Age histogram with density overlay
// ---------------------------------------------------------------------------

fn histogram_chart(ui: &mut Ui, state: &AppState) {
    let charts = &state.charts;
    ui.vertical(|ui: &mut Ui| {
        ui.strong(HISTOGRAM_TITLE);
        Plot::new("histogram")
            .legend(Legend::default())
            .x_axis_label("Age")
            .y_axis_label("Count")
            .show(ui, |plot_ui| {
                let edges = &charts.bin_edges;
                if edges.len() >= 2 {
                    let width = edges[1] - edges[0];
                    for series in &charts.histogram {
                        let bars: Vec<Bar> = series
                            .counts
                            .iter()
                            .enumerate()
                            .map(|(i, &count)| {
                                Bar::new(edges[i] + width / 2.0, count).width(width)
                            })
                            .collect();
                        plot_ui.bar_chart(
                            BarChart::new(bars)
                                .name(&series.label)
                                // translucent so overlapping groups stay readable
                                .color(series.color.gamma_multiply(0.55)),
                        );
                    }
                }
                for series in &charts.density {
                    let curve: PlotPoints = series.points.iter().copied().collect();
                    plot_ui.line(
                        Line::new(curve)
                            .name(&series.label)
                            .color(series.color)
                            .width(1.5),
                    );
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn heatmap_chart(ui: &mut Ui, state: &AppState) {
    let matrix = &state.charts.correlation;
    ui.vertical(|ui: &mut Ui| {
        ui.strong(HEATMAP_TITLE);
        if matrix.labels.is_empty() {
            ui.label("None of the heatmap columns are present in this dataset.");
            return;
        }

        let n = matrix.labels.len();
        let (rect, _response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
        let painter = ui.painter_at(rect);
        let text_color = ui.visuals().text_color();

        // Margins reserve room for the row labels (left) and column labels
        // (bottom).
        let left = 80.0_f32;
        let bottom = 22.0_f32;
        let grid = Rect::from_min_max(
            pos2(rect.min.x + left, rect.min.y + 4.0),
            pos2(rect.max.x - 8.0, rect.max.y - bottom),
        );
        if grid.width() <= 0.0 || grid.height() <= 0.0 {
            return;
        }
        let cell_w = grid.width() / n as f32;
        let cell_h = grid.height() / n as f32;

        for i in 0..n {
            for j in 0..n {
                let value = matrix.values[i][j];
                let cell = Rect::from_min_size(
                    pos2(grid.min.x + j as f32 * cell_w, grid.min.y + i as f32 * cell_h),
                    Vec2::new(cell_w, cell_h),
                );
                let fill = color::diverging(value);
                painter.rect_filled(cell.shrink(0.5), 0.0, fill);

                let annotation = if value.is_finite() {
                    format!("{value:.2}")
                } else {
                    "n/a".to_string()
                };
                painter.text(
                    cell.center(),
                    Align2::CENTER_CENTER,
                    annotation,
                    FontId::proportional(12.0),
                    color::contrast_text(fill),
                );
            }
        }

        for (i, label) in matrix.labels.iter().enumerate() {
            painter.text(
                pos2(grid.min.x - 6.0, grid.min.y + (i as f32 + 0.5) * cell_h),
                Align2::RIGHT_CENTER,
                label,
                FontId::proportional(12.0),
                text_color,
            );
            painter.text(
                pos2(grid.min.x + (i as f32 + 0.5) * cell_w, grid.max.y + 4.0),
                Align2::CENTER_TOP,
                label,
                FontId::proportional(12.0),
                text_color,
            );
        }
    });
}
