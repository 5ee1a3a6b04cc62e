use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::filter::FilteredView;
use super::model::NumericField;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Headline numbers for the current view.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub total_sales: f64,
    pub gross_income: f64,
    /// `None` when the view is empty.
    pub mean_rating: Option<f64>,
    pub transactions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total: f64,
}

/// One point of the cost / income / price scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub cogs: f64,
    pub gross_income: f64,
    pub unit_price: f64,
    pub product_line: String,
}

/// Pairwise Pearson correlation over [`NumericField::ALL`].
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub fields: Vec<NumericField>,
    /// Row-major, `fields.len()` × `fields.len()`. NaN where undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }
}

/// Which set of summaries to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// KPIs, time series, revenue, spend distribution, payment counts.
    Basic,
    /// Basic plus scatter, correlation and branch × product line income.
    #[default]
    Extended,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedSummaries {
    pub scatter: Vec<ScatterPoint>,
    pub correlation: CorrelationMatrix,
    pub income_by_branch_product: BTreeMap<(String, String), f64>,
}

/// Everything the charts need, computed from one filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub kpis: Kpis,
    pub daily_sales: Vec<DailySales>,
    pub revenue_by_product_line: BTreeMap<String, f64>,
    pub spend_by_customer_type: BTreeMap<String, Vec<f64>>,
    pub payment_counts: Vec<(String, usize)>,
    pub extended: Option<ExtendedSummaries>,
}

impl Dashboard {
    pub fn compute(view: &FilteredView<'_>, variant: Variant) -> Self {
        let extended = match variant {
            Variant::Basic => None,
            Variant::Extended => Some(ExtendedSummaries {
                scatter: scatter_points(view),
                correlation: correlation_matrix(view),
                income_by_branch_product: income_by_branch_product(view),
            }),
        };

        Dashboard {
            kpis: kpis(view),
            daily_sales: daily_sales(view),
            revenue_by_product_line: revenue_by_product_line(view),
            spend_by_customer_type: spend_by_customer_type(view),
            payment_counts: payment_counts(view),
            extended,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

pub fn kpis(view: &FilteredView<'_>) -> Kpis {
    let total_sales = view.iter().map(|tx| tx.total).sum();
    let gross_income = view.iter().map(|tx| tx.gross_income).sum();
    let mean_rating = mean(view.iter().map(|tx| tx.rating));
    Kpis {
        total_sales,
        gross_income,
        mean_rating,
        transactions: view.len(),
    }
}

/// Sum of `Total` per date, ascending.
pub fn daily_sales(view: &FilteredView<'_>) -> Vec<DailySales> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for tx in view.iter() {
        *by_date.entry(tx.date).or_default() += tx.total;
    }
    by_date
        .into_iter()
        .map(|(date, total)| DailySales { date, total })
        .collect()
}

pub fn revenue_by_product_line(view: &FilteredView<'_>) -> BTreeMap<String, f64> {
    let mut out: BTreeMap<String, f64> = BTreeMap::new();
    for tx in view.iter() {
        *out.entry(tx.product_line.clone()).or_default() += tx.total;
    }
    out
}

/// Raw `Total` values per customer type, in row order.
pub fn spend_by_customer_type(view: &FilteredView<'_>) -> BTreeMap<String, Vec<f64>> {
    let mut out: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for tx in view.iter() {
        out.entry(tx.customer_type.clone()).or_default().push(tx.total);
    }
    out
}

/// Row count per payment method, most frequent first.
pub fn payment_counts(view: &FilteredView<'_>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tx in view.iter() {
        *counts.entry(tx.payment.as_str()).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, n)| (name.to_string(), n))
        .collect();
    // BTreeMap order already breaks ties by name; the sort is stable.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

pub fn scatter_points(view: &FilteredView<'_>) -> Vec<ScatterPoint> {
    view.iter()
        .map(|tx| ScatterPoint {
            cogs: tx.cogs,
            gross_income: tx.gross_income,
            unit_price: tx.unit_price,
            product_line: tx.product_line.clone(),
        })
        .collect()
}

pub fn correlation_matrix(view: &FilteredView<'_>) -> CorrelationMatrix {
    let fields = NumericField::ALL.to_vec();
    let columns: Vec<Vec<f64>> = fields
        .iter()
        .map(|&field| view.iter().map(|tx| field.value_of(tx)).collect())
        .collect();

    // A degenerate column is NaN across its whole row and column.
    let varies: Vec<bool> = columns.iter().map(|c| !is_degenerate(c)).collect();

    let n = fields.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in (0..n).filter(|&i| varies[i]) {
        values[i][i] = 1.0;
        for j in (i + 1..n).filter(|&j| varies[j]) {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix { fields, values }
}

/// Sum of `gross income` per (branch, product line).
pub fn income_by_branch_product(view: &FilteredView<'_>) -> BTreeMap<(String, String), f64> {
    let mut out: BTreeMap<(String, String), f64> = BTreeMap::new();
    for tx in view.iter() {
        *out
            .entry((tx.branch.clone(), tx.product_line.clone()))
            .or_default() += tx.gross_income;
    }
    out
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0_f64, 0_usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Spread below this many ulps of the column's magnitude counts as constant.
const DEGENERATE_ULPS: f64 = 8.0;

/// Whether a column has no usable spread: fewer than two values, a
/// non-finite value, or a range lost in rounding noise. The threshold is
/// relative to the column's own magnitude, so tiny but varying values
/// still correlate.
fn is_degenerate(xs: &[f64]) -> bool {
    if xs.len() < 2 || xs.iter().any(|x| !x.is_finite()) {
        return true;
    }
    let (min, max) = xs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    let scale = min.abs().max(max.abs());
    max - min <= scale * DEGENERATE_ULPS * f64::EPSILON
}

/// Sample Pearson correlation. NaN with fewer than two pairs or when either
/// side has exactly zero spread.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let len = xs.len().min(ys.len());
    if len < 2 {
        return f64::NAN;
    }
    let (xs, ys) = (&xs[..len], &ys[..len]);
    let n = len as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0_f64;
    let mut var_x = 0.0_f64;
    let mut var_y = 0.0_f64;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        (cov / denom).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::filter::{apply, FilterSelection};
    use crate::data::model::tests::{sample_dataset, tx};
    use crate::data::model::{Dimension, SalesDataset};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn kpis_match_hand_sums() {
        let ds = sample_dataset();
        let view = apply(&ds, &FilterSelection::all(&ds));
        let k = kpis(&view);

        let total: f64 = ds.transactions.iter().map(|t| t.total).sum();
        let income: f64 = ds.transactions.iter().map(|t| t.gross_income).sum();
        let rating: f64 = ds.transactions.iter().map(|t| t.rating).sum::<f64>() / 8.0;
        assert!(close(k.total_sales, total));
        assert!(close(k.gross_income, income));
        assert!(close(k.mean_rating.unwrap(), rating));
        assert_eq!(k.transactions, 8);
    }

    #[test]
    fn branch_a_total_sales_matches_manual_sum() {
        let ds = sample_dataset();
        let mut sel = FilterSelection::all(&ds);
        sel.set(Dimension::Branch, BTreeSet::from(["A".to_string()]));
        let view = apply(&ds, &sel);

        let expected: f64 = ds
            .transactions
            .iter()
            .filter(|t| t.branch == "A")
            .map(|t| t.total)
            .sum();
        assert!(close(kpis(&view).total_sales, expected));
        assert!(close(expected, (500.0 + 324.3 + 465.8) * 1.05));
    }

    #[test]
    fn empty_view_gives_zero_sums_and_no_rating() {
        let ds = sample_dataset();
        let mut sel = FilterSelection::all(&ds);
        sel.select_none(Dimension::CustomerType);
        let view = apply(&ds, &sel);
        let dash = Dashboard::compute(&view, Variant::Extended);

        assert_eq!(dash.kpis.total_sales, 0.0);
        assert_eq!(dash.kpis.gross_income, 0.0);
        assert_eq!(dash.kpis.mean_rating, None);
        assert!(dash.daily_sales.is_empty());
        assert!(dash.revenue_by_product_line.is_empty());
        assert!(dash.payment_counts.is_empty());
        let ext = dash.extended.unwrap();
        assert!(ext.scatter.is_empty());
        assert!(ext.correlation.values.iter().flatten().all(|v| v.is_nan()));
    }

    #[test]
    fn daily_sales_are_grouped_and_ascending() {
        let ds = sample_dataset();
        let view = apply(&ds, &FilterSelection::all(&ds));
        let series = daily_sales(&view);

        assert_eq!(series.len(), 6);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        let jan5 = &series[0];
        assert_eq!(jan5.date, NaiveDate::from_ymd_opt(2019, 1, 5).unwrap());
        assert!(close(jan5.total, (500.0 + 76.4) * 1.05));
    }

    #[test]
    fn revenue_groups_partition_the_total() {
        let ds = sample_dataset();
        for branch in ds.options(Dimension::Branch).clone() {
            let mut sel = FilterSelection::all(&ds);
            sel.set(Dimension::Branch, BTreeSet::from([branch]));
            let view = apply(&ds, &sel);
            let groups: f64 = revenue_by_product_line(&view).values().sum();
            assert!(close(groups, kpis(&view).total_sales));
        }
    }

    #[test]
    fn spend_distribution_keeps_every_total() {
        let ds = sample_dataset();
        let view = apply(&ds, &FilterSelection::all(&ds));
        let spend = spend_by_customer_type(&view);
        assert_eq!(spend["Member"].len(), 4);
        assert_eq!(spend["Normal"].len(), 4);
        assert!(close(spend["Member"][0], 525.0));
    }

    #[test]
    fn payment_counts_sum_to_row_count_and_sort_by_frequency() {
        let ds = sample_dataset();
        let view = apply(&ds, &FilterSelection::all(&ds));
        let counts = payment_counts(&view);

        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), view.len());
        assert_eq!(
            counts,
            vec![
                ("Ewallet".to_string(), 4),
                ("Cash".to_string(), 2),
                ("Credit card".to_string(), 2),
            ]
        );
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let ds = SalesDataset::from_transactions(vec![
            tx((2019, 1, 1), "A", "p", "Member", "Cash", 100.0, 4.0),
            tx((2019, 1, 2), "A", "p", "Member", "Cash", 250.0, 9.0),
            tx((2019, 1, 3), "B", "q", "Normal", "Cash", 80.0, 6.5),
            tx((2019, 1, 4), "B", "q", "Normal", "Cash", 410.0, 5.0),
        ]);
        let mut with_qty = ds.clone();
        for (i, t) in with_qty.transactions.iter_mut().enumerate() {
            t.quantity = i as u32 + 1;
        }
        let view = apply(&with_qty, &FilterSelection::all(&with_qty));
        let corr = correlation_matrix(&view);

        assert_eq!(corr.fields.len(), 7);
        for i in 0..7 {
            assert_eq!(corr.get(i, i), 1.0);
            for j in 0..7 {
                assert_eq!(corr.get(i, j).to_bits(), corr.get(j, i).to_bits());
                assert!(corr.get(i, j).abs() <= 1.0);
            }
        }
        // cogs, tax, total and gross income are all linear in cogs.
        let cogs = 4;
        let total = 3;
        assert!(close(corr.get(cogs, total), 1.0));
    }

    #[test]
    fn constant_column_correlates_to_nan() {
        let ds = sample_dataset();
        let view = apply(&ds, &FilterSelection::all(&ds));
        let corr = correlation_matrix(&view);
        // Quantity is 2 on every sample row.
        let qty = 1;
        assert!(corr.get(qty, qty).is_nan());
        assert!(corr.get(qty, 0).is_nan());
        assert_eq!(corr.get(0, 0), 1.0);
    }

    #[test]
    fn small_magnitude_column_still_correlates() {
        let mut ds = SalesDataset::from_transactions(vec![
            tx((2019, 1, 1), "A", "p", "Member", "Cash", 100.0, 0.0),
            tx((2019, 1, 2), "A", "p", "Member", "Cash", 250.0, 0.0),
            tx((2019, 1, 3), "B", "q", "Normal", "Cash", 80.0, 0.0),
            tx((2019, 1, 4), "B", "q", "Normal", "Cash", 410.0, 0.0),
        ]);
        for (i, t) in ds.transactions.iter_mut().enumerate() {
            t.rating = (i + 1) as f64 * 1e-9;
        }
        let view = apply(&ds, &FilterSelection::all(&ds));
        let corr = correlation_matrix(&view);

        let rating = 6;
        let cogs = 4;
        assert_eq!(corr.get(rating, rating), 1.0);
        assert!(corr.get(rating, cogs).is_finite());
        assert_eq!(corr.get(rating, cogs).to_bits(), corr.get(cogs, rating).to_bits());
    }

    #[test]
    fn column_constant_up_to_rounding_is_nan_throughout() {
        let mut ds = SalesDataset::from_transactions(
            (1..=10)
                .map(|d| tx((2019, 1, d), "A", "p", "Member", "Cash", 10.0 * d as f64, d as f64))
                .collect(),
        );
        let noisy = f64::from_bits(0.1_f64.to_bits() + 1);
        for (i, t) in ds.transactions.iter_mut().enumerate() {
            t.total = if i % 3 == 0 { noisy } else { 0.1 };
            t.quantity = i as u32 + 1;
        }
        let view = apply(&ds, &FilterSelection::all(&ds));
        let corr = correlation_matrix(&view);

        let total = 3;
        for j in 0..7 {
            assert!(corr.get(total, j).is_nan(), "total~{j}");
            assert!(corr.get(j, total).is_nan(), "{j}~total");
        }
        for i in (0..7).filter(|&i| i != total) {
            assert_eq!(corr.get(i, i), 1.0, "diagonal {i}");
        }
    }

    #[test]
    fn exactly_constant_column_is_nan_throughout() {
        let ds = SalesDataset::from_transactions(
            (1..=10)
                .map(|d| {
                    let mut t = tx((2019, 1, d), "A", "p", "Member", "Cash", 10.0 * d as f64, 5.0);
                    t.total = 0.1;
                    t
                })
                .collect(),
        );
        let view = apply(&ds, &FilterSelection::all(&ds));
        let corr = correlation_matrix(&view);

        let (total, rating, cogs) = (3, 6, 4);
        assert!((0..7).all(|j| corr.get(total, j).is_nan()));
        assert!((0..7).all(|j| corr.get(rating, j).is_nan()));
        assert_eq!(corr.get(cogs, cogs), 1.0);
    }

    #[test]
    fn pearson_matches_known_values() {
        assert!(close(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1.0));
        assert!(close(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), -1.0));
        assert!(pearson(&[1.0], &[1.0]).is_nan());
        assert!(pearson(&[1.0, 1.0], &[2.0, 3.0]).is_nan());
    }

    #[test]
    fn income_pairs_roll_up_to_gross_income() {
        let ds = sample_dataset();
        let view = apply(&ds, &FilterSelection::all(&ds));
        let pairs = income_by_branch_product(&view);

        assert_eq!(pairs.len(), 6);
        let key = ("A".to_string(), "Health and beauty".to_string());
        assert!(close(pairs[&key], (500.0 + 465.8) * 0.05));
        assert!(close(pairs.values().sum::<f64>(), kpis(&view).gross_income));
    }

    #[test]
    fn basic_variant_skips_extended_summaries() {
        let ds = sample_dataset();
        let view = apply(&ds, &FilterSelection::all(&ds));
        assert!(Dashboard::compute(&view, Variant::Basic).extended.is_none());
        assert!(Dashboard::compute(&view, Variant::Extended).extended.is_some());
    }
}
