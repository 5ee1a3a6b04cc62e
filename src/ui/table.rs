use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::viridis;
use crate::data::aggregate::CorrelationMatrix;

/// Correlation matrix as a coloured table with the coefficient in each cell.
pub fn correlation_heatmap(ui: &mut Ui, corr: &CorrelationMatrix) {
    let n = corr.fields.len();

    ui.push_id("correlation_heatmap", |ui| {
        TableBuilder::new(ui)
            .vscroll(false)
            .column(Column::exact(100.0))
            .columns(Column::exact(90.0), n)
            .header(22.0, |mut header| {
                header.col(|_| {});
                for field in &corr.fields {
                    header.col(|ui| {
                        ui.strong(field.column());
                    });
                }
            })
            .body(|mut body| {
                for (i, field) in corr.fields.iter().enumerate() {
                    body.row(28.0, |mut row| {
                        row.col(|ui| {
                            ui.strong(field.column());
                        });
                        for j in 0..n {
                            let r = corr.get(i, j);
                            row.col(|ui| {
                                // Correlations span [-1, 1]; the scale spans [0, 1].
                                let fill = viridis((r + 1.0) / 2.0);
                                ui.painter().rect_filled(ui.max_rect(), 0.0, fill);
                                ui.centered_and_justified(|ui| {
                                    ui.label(RichText::new(cell_text(r)).color(text_on(fill)));
                                });
                            });
                        }
                    });
                }
            });
    });
}

fn cell_text(r: f64) -> String {
    if r.is_nan() {
        "NaN".to_string()
    } else {
        format!("{r:.2}")
    }
}

/// Black or white, whichever reads better on `fill`.
fn text_on(fill: Color32) -> Color32 {
    let luma = 0.299 * fill.r() as f32 + 0.587 * fill.g() as f32 + 0.114 * fill.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_show_two_decimals_or_nan() {
        assert_eq!(cell_text(1.0), "1.00");
        assert_eq!(cell_text(-0.456), "-0.46");
        assert_eq!(cell_text(f64::NAN), "NaN");
    }

    #[test]
    fn text_contrasts_with_fill() {
        assert_eq!(text_on(Color32::WHITE), Color32::BLACK);
        assert_eq!(text_on(Color32::from_rgb(68, 1, 84)), Color32::WHITE);
    }
}
