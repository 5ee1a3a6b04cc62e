use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints};

use crate::color::{generate_palette, ColorMap};
use crate::data::aggregate::DailySales;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Daily sales (line)
// ---------------------------------------------------------------------------

/// Render total sales per day as a line over calendar dates.
pub fn daily_sales_line(ui: &mut Ui, series: &[DailySales]) {
    let points: PlotPoints = series
        .iter()
        .map(|d| [d.date.num_days_from_ce() as f64, d.total])
        .collect();

    Plot::new("daily_sales")
        .height(CHART_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label("Sales ($)")
        .x_axis_formatter(|mark, _range| {
            NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Total")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
        });
}

// ---------------------------------------------------------------------------
// Revenue by product line (bars)
// ---------------------------------------------------------------------------

pub fn revenue_bars(ui: &mut Ui, revenue: &BTreeMap<String, f64>, colors: &ColorMap) {
    let labels: Vec<String> = revenue.keys().cloned().collect();
    let bars: Vec<Bar> = revenue
        .iter()
        .enumerate()
        .map(|(i, (line, total))| {
            Bar::new(i as f64, *total)
                .name(line)
                .fill(colors.color_for(line))
                .width(0.7)
        })
        .collect();

    Plot::new("revenue_by_product_line")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Revenue ($)")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Spend by customer type (box plot)
// ---------------------------------------------------------------------------

pub fn spend_boxes(ui: &mut Ui, spend: &BTreeMap<String, Vec<f64>>) {
    let labels: Vec<String> = spend.keys().cloned().collect();
    let palette = generate_palette(spend.len());

    let boxes: Vec<BoxElem> = spend
        .iter()
        .zip(palette)
        .enumerate()
        .filter_map(|(i, ((ctype, totals), color))| {
            let summary = five_number_summary(totals)?;
            Some(
                BoxElem::new(i as f64, summary.into())
                    .name(ctype)
                    .fill(color.gamma_multiply(0.4))
                    .stroke(Stroke::new(1.5, color))
                    .box_width(0.5),
            )
        })
        .collect();

    Plot::new("spend_by_customer_type")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Total spend ($)")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes));
        });
}

/// Label for a category axis placed at integer positions.
fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Box statistics
// ---------------------------------------------------------------------------

/// Box-plot statistics: linear-interpolated quartiles, whiskers at the most
/// extreme values within 1.5 × IQR of the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumbers {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl From<FiveNumbers> for BoxSpread {
    fn from(f: FiveNumbers) -> Self {
        BoxSpread::new(f.lower_whisker, f.q1, f.median, f.q3, f.upper_whisker)
    }
}

/// `None` for an empty (or all-NaN) group.
pub fn five_number_summary(values: &[f64]) -> Option<FiveNumbers> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let fence = 1.5 * (q3 - q1);

    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|&v| v >= q1 - fence)
        .unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= q3 + fence)
        .unwrap_or(q3);

    Some(FiveNumbers {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
    })
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
