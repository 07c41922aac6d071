use eframe::egui::{self, Color32, ComboBox, RichText, Ui};

use crate::data::filter::OutcomeFilter;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – dashboard controls
// ---------------------------------------------------------------------------

/// Render the control panel: outcome filter, axis pickers, update button.
/// Every interaction updates the selection and then triggers one explicit
/// refresh; nothing redraws reactively.
pub fn control_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dashboard Controls");
    ui.separator();

    // ---- Outcome filter (mutually exclusive) ----
    ui.strong("Filter by Outcome");
    for filter in OutcomeFilter::ALL {
        let selected = state.selection.outcome == filter;
        if ui.radio(selected, filter.label()).clicked() && !selected {
            state.set_outcome_filter(filter);
            state.refresh();
        }
    }
    ui.separator();

    // ---- Axis selectors, constrained to the dataset's columns ----
    ui.strong("Plot Variables");
    let columns = state.dataset.columns.clone();

    ui.label("X-axis Variable:");
    let current_x = state.selection.x_column.clone();
    ComboBox::from_id_salt("x_axis")
        .selected_text(&current_x)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &columns {
                if ui.selectable_label(current_x == *col, col).clicked() {
                    state.set_x_axis(col.clone());
                    state.refresh();
                }
            }
        });

    ui.label("Y-axis Variable:");
    let current_y = state.selection.y_column.clone();
    ComboBox::from_id_salt("y_axis")
        .selected_text(&current_y)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &columns {
                if ui.selectable_label(current_y == *col, col).clicked() {
                    state.set_y_axis(col.clone());
                    state.refresh();
                }
            }
        });

    ui.add_space(10.0);
    if ui.button("Update Plots").clicked() {
        state.refresh();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} rows loaded, {} in view",
            state.dataset.len(),
            state.charts.visible_rows
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                state.replace_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
