use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::{Kpis, Variant};
use crate::data::model::Dimension;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

enum FilterAction {
    Toggle(Dimension, String),
    All(Dimension),
    Clear(Dimension),
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_empty() {
        ui.label("No transactions loaded.");
        return;
    }

    // Collect clicks first, apply them after the widgets are drawn.
    let mut actions = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let all_values = state.dataset.options(dim);
                let selected = state.selection.selected(dim);

                // Show count of selected / total in the header
                let header_text = format!("{dim}  ({}/{})", selected.len(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.column())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                actions.push(FilterAction::All(dim));
                            }
                            if ui.small_button("None").clicked() {
                                actions.push(FilterAction::Clear(dim));
                            }
                        });

                        for val in all_values {
                            let mut text = RichText::new(val);
                            if dim == Dimension::ProductLine {
                                text = text.color(state.product_colors.color_for(val));
                            }

                            let mut checked = selected.contains(val);
                            if ui.checkbox(&mut checked, text).changed() {
                                actions.push(FilterAction::Toggle(dim, val.clone()));
                            }
                        }
                    });
            }
        });

    for action in actions {
        match action {
            FilterAction::Toggle(dim, value) => state.toggle_filter_value(dim, &value),
            FilterAction::All(dim) => state.select_all(dim),
            FilterAction::Clear(dim) => state.select_none(dim),
        }
    }
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

        ui.label(format!(
            "{} transactions loaded, {} visible",
            state.dataset.len(),
            state.visible_indices.len()
        ));

        ui.separator();

        let extended = state.variant == Variant::Extended;
        if ui.selectable_label(extended, "Extended charts").clicked() {
            state.set_variant(if extended {
                Variant::Basic
            } else {
                Variant::Extended
            });
        }

        if ui.button("Reset filters").clicked() {
            state.reset_filters();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// KPI strip
// ---------------------------------------------------------------------------

/// Render the three headline metrics side by side.
pub fn kpi_strip(ui: &mut Ui, kpis: &Kpis) {
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Total sales", &dollars(kpis.total_sales));
        metric(&mut cols[1], "Gross income", &dollars(kpis.gross_income));
        let rating = kpis
            .mean_rating
            .map(|r| format!("{r:.2}"))
            .unwrap_or_else(|| "no data".to_string());
        metric(&mut cols[2], "Average rating", &rating);
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.label(RichText::new(label).weak());
    ui.label(RichText::new(value).size(28.0).strong());
}

/// `$` amount, or "no data" when a NaN / infinite cell reached the sum.
pub fn dollars(value: f64) -> String {
    if value.is_finite() {
        format!("${}", money(value))
    } else {
        "no data".to_string()
    }
}

/// Two decimals with thousands separators, e.g. `322,966.75`.
/// `value` must be finite.
pub fn money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}

#[cfg(test)]
mod tests {
    use super::{dollars, money};

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "0.00");
        assert_eq!(money(999.999), "1,000.00");
        assert_eq!(money(322966.749), "322,966.75");
        assert_eq!(money(1234567.0), "1,234,567.00");
        assert_eq!(money(-1500.5), "-1,500.50");
    }

    #[test]
    fn non_finite_amounts_show_no_data() {
        assert_eq!(dollars(1234.5), "$1,234.50");
        assert_eq!(dollars(0.0), "$0.00");
        assert_eq!(dollars(f64::NAN), "no data");
        assert_eq!(dollars(f64::INFINITY), "no data");
        assert_eq!(dollars(f64::NEG_INFINITY), "no data");
    }
}
