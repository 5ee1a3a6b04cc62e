use eframe::egui;

use crate::data::model::SalesDataset;
use crate::state::AppState;
use crate::ui::{panels, plot, shapes, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
}

impl SalesDashboardApp {
    pub fn new(dataset: SalesDataset) -> Self {
        Self {
            state: AppState::new(dataset),
        }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| dashboard_body(ui, &self.state));
        });
    }
}

/// KPI strip followed by the chart sequence.
fn dashboard_body(ui: &mut egui::Ui, state: &AppState) {
    let dash = &state.dashboard;

    panels::kpi_strip(ui, &dash.kpis);
    ui.separator();

    section(ui, "1. Daily sales");
    plot::daily_sales_line(ui, &dash.daily_sales);

    section(ui, "2. Revenue by product line");
    plot::revenue_bars(ui, &dash.revenue_by_product_line, &state.product_colors);

    section(ui, "3. Spend by customer type");
    plot::spend_boxes(ui, &dash.spend_by_customer_type);

    section(ui, "4. Payment methods");
    shapes::payment_pie(ui, &dash.payment_counts);

    if let Some(ext) = &dash.extended {
        section(ui, "5. Cost, gross income and unit price");
        shapes::cost_income_price_scatter(ui, &ext.scatter, &state.product_colors);

        section(ui, "6. Correlation of numeric columns");
        table::correlation_heatmap(ui, &ext.correlation);

        section(ui, "7. Gross income by branch and product line");
        shapes::income_sunburst(ui, &ext.income_by_branch_product, &state.product_colors);
    }
}

fn section(ui: &mut egui::Ui, title: &str) {
    ui.add_space(12.0);
    ui.heading(title);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::Variant;
    use crate::data::model::tests::sample_dataset;
    use crate::data::model::Dimension;

    /// Run one headless frame of the central panel.
    fn render(state: &AppState) {
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| dashboard_body(ui, state));
            });
        });
    }

    #[test]
    fn renders_every_chart_for_the_full_view() {
        let state = AppState::new(sample_dataset());
        assert!(state.dashboard.extended.is_some());
        render(&state);
    }

    #[test]
    fn renders_empty_and_basic_views() {
        let mut state = AppState::new(sample_dataset());
        state.select_none(Dimension::Branch);
        render(&state);

        state.reset_filters();
        state.set_variant(Variant::Basic);
        render(&state);
    }
}
