use std::path::Path;

use crate::color::ColorMap;
use crate::data::aggregate::{Dashboard, Variant};
use crate::data::filter::{self, FilterSelection};
use crate::data::loader;
use crate::data::model::{Dimension, SalesDataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset. Read-only once loaded.
    pub dataset: SalesDataset,

    /// Per-dimension filter selections.
    pub selection: FilterSelection,

    /// Indices of transactions passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Summaries of the visible rows, recomputed with `visible_indices`.
    pub dashboard: Dashboard,

    /// Which summaries to compute.
    pub variant: Variant,

    /// Product line colours shared by every chart.
    pub product_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: SalesDataset) -> Self {
        let selection = FilterSelection::all(&dataset);
        let view = filter::apply(&dataset, &selection);
        let variant = Variant::default();
        let dashboard = Dashboard::compute(&view, variant);
        let visible_indices = view.indices().to_vec();

        Self {
            product_colors: ColorMap::new(dataset.options(Dimension::ProductLine)),
            dataset,
            selection,
            visible_indices,
            dashboard,
            variant,
            status_message: None,
        }
    }

    /// Replace the dataset and reset every filter to its full domain.
    pub fn set_dataset(&mut self, dataset: SalesDataset) {
        let variant = self.variant;
        *self = Self::new(dataset);
        self.variant = variant;
        self.recompute();
    }

    /// Load a file, keeping the current dataset if that fails.
    pub fn open_file(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute the filtered view and every summary.
    pub fn recompute(&mut self) {
        let view = filter::apply(&self.dataset, &self.selection);
        if view.is_empty() {
            log::warn!("Current filters match no transactions");
        }
        log::debug!(
            "Recomputed dashboard: {} of {} rows visible (branches {}, product lines {}, customer types {})",
            view.len(),
            self.dataset.len(),
            self.selection.selected(Dimension::Branch).len(),
            self.selection.selected(Dimension::ProductLine).len(),
            self.selection.selected(Dimension::CustomerType).len(),
        );
        self.dashboard = Dashboard::compute(&view, self.variant);
        self.visible_indices = view.indices().to_vec();
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        self.selection.toggle(dim, value);
        self.recompute();
    }

    /// Select all values of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        self.selection.select_all(dim, &self.dataset);
        self.recompute();
    }

    /// Deselect all values of a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.selection.select_none(dim);
        self.recompute();
    }

    /// Every dimension back to its full domain.
    pub fn reset_filters(&mut self) {
        self.selection = FilterSelection::all(&self.dataset);
        self.recompute();
    }

    pub fn set_variant(&mut self, variant: Variant) {
        if self.variant != variant {
            self.variant = variant;
            self.recompute();
        }
    }
}
