/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///     data.csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SalesDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset  │  Vec<Transaction>, option lists
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  branch ∧ product line ∧ customer type → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  FilteredView → Dashboard (KPIs, grouped summaries)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
