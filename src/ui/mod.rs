//! Presentation: panels, egui_plot charts, painted charts and tables.

pub mod panels;
pub mod plot;
pub mod shapes;
pub mod table;
