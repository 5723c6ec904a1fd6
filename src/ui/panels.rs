use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use cycle_plotter::data::model::Column;
use crate::state::{AppState, PlotMode};

// ---------------------------------------------------------------------------
// Left side panel – plot options
// ---------------------------------------------------------------------------

/// Render the left options panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Mode ----
            ui.strong("Mode");
            let previous = state.mode;
            ui.radio_value(&mut state.mode, PlotMode::Single, "Single Plot");
            ui.radio_value(&mut state.mode, PlotMode::Multi, "Multi-File Comparison");
            if state.mode != previous && state.mode == PlotMode::Single && state.files.len() > 1 {
                let files = std::mem::take(&mut state.files);
                state.set_files(files);
            }
            ui.separator();

            // ---- Files ----
            ui.strong("File Selection");
            if ui.button("Select File(s)…").clicked() {
                open_file_dialog(state);
            }
            match &state.file_summary {
                Some(summary) => ui.label(summary.as_str()),
                None => ui.label("No files selected"),
            };
            ui.separator();

            // ---- Axes ----
            ui.strong("Axes");
            column_combo(ui, "x_axis", "X-Axis", &mut state.x_column);
            column_combo(ui, "y_axis", "Y-Axis", &mut state.y_column);
            ui.separator();

            // ---- Processing options ----
            ui.strong("Options");
            ui.label("Active Mass (g, optional):");
            ui.text_edit_singleline(&mut state.mass_text);
            ui.label("Cycle:");
            ui.text_edit_singleline(&mut state.cycle_text);
            ui.label(
                RichText::new("e.g. 'discharge 3', 'charge 2', '5' or 'all'")
                    .small()
                    .weak(),
            );
            ui.add_space(8.0);

            if ui.button("Plot").clicked() {
                state.plot();
            }
        });
}

fn column_combo(ui: &mut Ui, id: &str, label: &str, selected: &mut Column) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(selected.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for column in Column::ALL {
                    ui.selectable_value(selected, column, column.to_string());
                }
            });
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
        });

        ui.separator();

        if !state.series.is_empty() {
            let cycles: usize = state.series.iter().map(|s| s.segments.len()).sum();
            ui.label(format!(
                "{} file(s), {cycles} cycle segment(s) plotted",
                state.series.len()
            ));
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
    let dialog = rfd::FileDialog::new()
        .set_title("Select cycling data")
        .add_filter("Text files", &["txt", "csv"])
        .add_filter("All files", &["*"]);

    let files = match state.mode {
        PlotMode::Single => dialog.pick_file().map(|f| vec![f]),
        PlotMode::Multi => dialog.pick_files(),
    };

    if let Some(files) = files {
        log::info!("Selected {} file(s)", files.len());
        state.set_files(files);
        state.status_message = None;
    }
}
