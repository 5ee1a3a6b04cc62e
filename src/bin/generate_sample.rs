use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

const ROWS: usize = 1000;
const TAX_RATE: f64 = 0.05;

const BRANCHES: [(&str, &str); 3] = [("A", "Yangon"), ("B", "Mandalay"), ("C", "Naypyitaw")];
const PRODUCT_LINES: [&str; 6] = [
    "Electronic accessories",
    "Fashion accessories",
    "Food and beverages",
    "Health and beauty",
    "Home and lifestyle",
    "Sports and travel",
];
const CUSTOMER_TYPES: [&str; 2] = ["Member", "Normal"];
const GENDERS: [&str; 2] = ["Female", "Male"];
const PAYMENTS: [&str; 3] = ["Ewallet", "Cash", "Credit card"];

/// One output row, in the column order of the supermarket sales export.
#[derive(Serialize)]
struct Row {
    #[serde(rename = "Invoice ID")]
    invoice_id: String,
    #[serde(rename = "Branch")]
    branch: &'static str,
    #[serde(rename = "City")]
    city: &'static str,
    #[serde(rename = "Customer type")]
    customer_type: &'static str,
    #[serde(rename = "Gender")]
    gender: &'static str,
    #[serde(rename = "Product line")]
    product_line: &'static str,
    #[serde(rename = "Unit price")]
    unit_price: f64,
    #[serde(rename = "Quantity")]
    quantity: u32,
    #[serde(rename = "Tax 5%")]
    tax: f64,
    #[serde(rename = "Total")]
    total: f64,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Payment")]
    payment: &'static str,
    #[serde(rename = "cogs")]
    cogs: f64,
    #[serde(rename = "gross margin percentage")]
    gross_margin_percentage: f64,
    #[serde(rename = "gross income")]
    gross_income: f64,
    #[serde(rename = "Rating")]
    rating: f64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let first_day = NaiveDate::from_ymd_opt(2019, 1, 1).context("invalid start date")?;
    let days_in_q1 = 90;

    let output_path = "data.csv";
    let mut writer = csv::Writer::from_path(output_path).context("creating output file")?;

    for i in 0..ROWS {
        let (branch, city) = rng.pick(&BRANCHES);
        let unit_price = round_to(rng.range(10.0, 100.0), 2);
        let quantity = (rng.next_u64() % 10 + 1) as u32;
        let cogs = round_to(unit_price * quantity as f64, 2);
        let tax = round_to(cogs * TAX_RATE, 4);
        let date = first_day + Duration::days((rng.next_u64() % days_in_q1) as i64);
        let minutes = 10 * 60 + rng.next_u64() % (11 * 60);

        let row = Row {
            invoice_id: format!("{:03}-{:02}-{:04}", 100 + i % 900, i % 100, i),
            branch,
            city,
            customer_type: rng.pick(&CUSTOMER_TYPES),
            gender: rng.pick(&GENDERS),
            product_line: rng.pick(&PRODUCT_LINES),
            unit_price,
            quantity,
            tax,
            total: round_to(cogs + tax, 4),
            date: date.format("%-m/%-d/%Y").to_string(),
            time: format!("{:02}:{:02}", minutes / 60, minutes % 60),
            payment: rng.pick(&PAYMENTS),
            cogs,
            gross_margin_percentage: 4.761904762,
            gross_income: tax,
            rating: round_to(rng.range(4.0, 10.0), 1),
        };
        writer.serialize(row).context("writing row")?;
    }
    writer.flush().context("flushing output file")?;

    println!("Wrote {ROWS} transactions to {output_path}");
    Ok(())
}
