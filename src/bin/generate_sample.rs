use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // (code, name, starting level, yearly drift)
    let companies: &[(&str, &str, f64, f64)] = &[
        ("600000", "浦发银行", 12.0, 1.8),
        ("600016", "民生银行", 9.5, 1.2),
        ("600036", "招商银行", 18.0, 2.4),
        ("000001", "平安银行", 15.5, 2.1),
        ("600030", "中信证券", 7.0, 1.5),
        ("601318", "中国平安", 20.0, 2.8),
        ("600519", "贵州茅台", 3.5, 0.6),
        // Starts below zero so annotation placement gets exercised.
        ("000858", "五粮液", -1.5, 0.9),
    ];
    let years: Vec<i32> = (2012..=2023).collect();

    let mut all_years: Vec<i32> = Vec::new();
    let mut all_codes: Vec<&str> = Vec::new();
    let mut all_names: Vec<&str> = Vec::new();
    let mut all_values: Vec<f64> = Vec::new();

    for &(code, name, base, drift) in companies {
        for (t, &year) in years.iter().enumerate() {
            let value = base + drift * t as f64 + rng.gauss(0.0, 0.8);
            all_years.push(year);
            all_codes.push(code);
            all_names.push(name);
            all_values.push(value);
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("stock_code", DataType::Utf8, false),
        Field::new("company_name", DataType::Utf8, false),
        Field::new("index_value", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from(all_years.clone())),
            Arc::new(StringArray::from(all_codes)),
            Arc::new(StringArray::from(all_names)),
            Arc::new(Float64Array::from(all_values)),
        ],
    )
    .context("building record batch")?;

    let output_path = "dt_index.parquet";
    let file = std::fs::File::create(output_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!(
        "Wrote {} records ({} companies × {} years) to {output_path}",
        all_years.len(),
        companies.len(),
        years.len()
    );
    Ok(())
}
