use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dimension, SalesDataset, Transaction};

// ---------------------------------------------------------------------------
// Filter selection: which values are allowed per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state. A dimension with an empty set (or no entry
/// at all) matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    selected: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterSelection {
    /// Every observed value selected, i.e. show everything.
    pub fn all(dataset: &SalesDataset) -> Self {
        FilterSelection {
            selected: Dimension::ALL
                .iter()
                .map(|&dim| (dim, dataset.options(dim).clone()))
                .collect(),
        }
    }

    pub fn selected(&self, dim: Dimension) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.selected.get(&dim).unwrap_or(&EMPTY)
    }

    pub fn set(&mut self, dim: Dimension, values: BTreeSet<String>) {
        self.selected.insert(dim, values);
    }

    /// Add `value` if absent, remove it if present.
    pub fn toggle(&mut self, dim: Dimension, value: &str) {
        let selected = self.selected.entry(dim).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    pub fn select_all(&mut self, dim: Dimension, dataset: &SalesDataset) {
        self.set(dim, dataset.options(dim).clone());
    }

    pub fn select_none(&mut self, dim: Dimension) {
        self.set(dim, BTreeSet::new());
    }

    /// Whether every observed value of `dim` is selected.
    pub fn is_full(&self, dim: Dimension, dataset: &SalesDataset) -> bool {
        dataset.options(dim).is_subset(self.selected(dim))
    }

    /// Whether a transaction passes all three dimensions.
    pub fn matches(&self, tx: &Transaction) -> bool {
        Dimension::ALL
            .iter()
            .all(|&dim| self.selected(dim).contains(dim.value_of(tx)))
    }
}

// ---------------------------------------------------------------------------
// Filtered view: read-only subset of the dataset
// ---------------------------------------------------------------------------

/// Rows of a dataset that passed a selection, in file order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a SalesDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// View over the given row indices.
    pub fn from_indices(dataset: &'a SalesDataset, indices: Vec<usize>) -> Self {
        FilteredView { dataset, indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Transaction> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.transactions[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return indices of transactions that pass all active filters.
pub fn filtered_indices(dataset: &SalesDataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .transactions
        .iter()
        .enumerate()
        .filter(|(_, tx)| selection.matches(tx))
        .map(|(i, _)| i)
        .collect()
}

/// Apply `selection` to `dataset`.
pub fn apply<'a>(dataset: &'a SalesDataset, selection: &FilterSelection) -> FilteredView<'a> {
    FilteredView::from_indices(dataset, filtered_indices(dataset, selection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_dataset;

    #[test]
    fn full_selection_is_identity() {
        let ds = sample_dataset();
        let sel = FilterSelection::all(&ds);
        let view = apply(&ds, &sel);
        assert_eq!(view.indices(), (0..ds.len()).collect::<Vec<_>>().as_slice());
        assert!(view.iter().zip(&ds.transactions).all(|(a, b)| a == b));
        for dim in Dimension::ALL {
            assert!(sel.is_full(dim, &ds));
        }
    }

    #[test]
    fn single_branch_keeps_only_that_branch() {
        let ds = sample_dataset();
        let mut sel = FilterSelection::all(&ds);
        sel.set(Dimension::Branch, BTreeSet::from(["A".to_string()]));
        let view = apply(&ds, &sel);

        assert_eq!(view.len(), 3);
        assert!(view.iter().all(|tx| tx.branch == "A"));
        assert!(!sel.is_full(Dimension::Branch, &ds));
    }

    #[test]
    fn empty_selection_in_any_dimension_yields_nothing() {
        let ds = sample_dataset();
        for dim in Dimension::ALL {
            let mut sel = FilterSelection::all(&ds);
            sel.select_none(dim);
            assert!(apply(&ds, &sel).is_empty(), "{dim} empty");
        }
        assert!(apply(&ds, &FilterSelection::default()).is_empty());
    }

    #[test]
    fn dimensions_combine_with_and() {
        let ds = sample_dataset();
        let mut sel = FilterSelection::all(&ds);
        sel.set(Dimension::Branch, BTreeSet::from(["B".to_string()]));
        sel.set(Dimension::CustomerType, BTreeSet::from(["Member".to_string()]));
        let view = apply(&ds, &sel);

        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|tx| tx.branch == "B" && tx.customer_type == "Member"));
    }

    #[test]
    fn every_selection_yields_a_subset() {
        let ds = sample_dataset();
        let branches: Vec<String> = ds.options(Dimension::Branch).iter().cloned().collect();
        // Walk every subset of branches crossed with each customer type.
        for mask in 0..(1u32 << branches.len()) {
            for ctype in ds.options(Dimension::CustomerType) {
                let mut sel = FilterSelection::all(&ds);
                let chosen: BTreeSet<String> = branches
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, b)| b.clone())
                    .collect();
                sel.set(Dimension::Branch, chosen.clone());
                sel.set(Dimension::CustomerType, BTreeSet::from([ctype.clone()]));

                let view = apply(&ds, &sel);
                assert!(view.indices().iter().all(|&i| i < ds.len()));
                assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
                assert!(view
                    .iter()
                    .all(|tx| chosen.contains(&tx.branch) && &tx.customer_type == ctype));
            }
        }
    }

    #[test]
    fn toggle_and_select_all_round_trip() {
        let ds = sample_dataset();
        let mut sel = FilterSelection::all(&ds);
        sel.toggle(Dimension::ProductLine, "Home and lifestyle");
        assert!(!sel.selected(Dimension::ProductLine).contains("Home and lifestyle"));
        assert_eq!(apply(&ds, &sel).len(), 6);

        sel.toggle(Dimension::ProductLine, "Home and lifestyle");
        assert_eq!(sel, FilterSelection::all(&ds));

        sel.select_none(Dimension::ProductLine);
        sel.select_all(Dimension::ProductLine, &ds);
        assert_eq!(sel, FilterSelection::all(&ds));
    }
}
