use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::color::series_colors;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Cycle plot (central panel)
// ---------------------------------------------------------------------------

/// Render the processed series in the central panel.
pub fn cycle_plot(ui: &mut Ui, state: &AppState) {
    let Some(first) = state.series.first() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Select data files and press Plot");
        });
        return;
    };

    Plot::new("cycle_plot")
        .legend(Legend::default())
        .x_axis_label(first.x_label.clone())
        .y_axis_label(first.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let colors = series_colors(state.series.len());
            for (series, &color) in state.series.iter().zip(&colors) {
                for (n, segment) in series.segments.iter().enumerate() {
                    let points: PlotPoints = segment.points.iter().copied().collect();

                    // Name only the first cycle so each file appears once in the legend.
                    let mut line = Line::new(points).color(color).width(1.0);
                    if n == 0 {
                        line = line.name(&series.name);
                    }
                    plot_ui.line(line);
                }
            }
        });
}
