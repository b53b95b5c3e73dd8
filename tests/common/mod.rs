//! Common test utilities and data generators.
#![allow(dead_code)]

use faer::{Col, Mat};
use std::io::Write;
use tempfile::NamedTempFile;
use wq_regress::data::{Observation, ObservationTable};

/// Header row with every required column plus the date.
pub const HEADER: &str = "FECHA,pH_CAMPO,DQO_TOT,OD_mg/L,SST,TEMP_AGUA,DBO5";

/// Deterministic noise in [-0.5, 0.5), independent across salts.
pub fn noise(i: usize, salt: u64) -> f64 {
    let mut z = (i as u64).wrapping_add(salt.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64 - 0.5
}

/// Generate simple linear data: y = x * beta + intercept + noise
pub fn generate_linear_data(
    n_samples: usize,
    n_features: usize,
    intercept: f64,
    noise_std: f64,
    seed: u64,
) -> (Mat<f64>, Col<f64>, Col<f64>) {
    let true_coefficients = Col::from_fn(n_features, |j| (j + 1) as f64);
    let x = Mat::from_fn(n_samples, n_features, |i, j| {
        2.0 * noise(i, seed.wrapping_add(j as u64 + 1))
    });
    let y = Col::from_fn(n_samples, |i| {
        intercept
            + (0..n_features)
                .map(|j| x[(i, j)] * true_coefficients[j])
                .sum::<f64>()
            + noise_std * 2.0 * noise(i, seed.wrapping_add(1000))
    });

    (x, y, true_coefficients)
}

/// Generate data with collinear features.
pub fn generate_collinear_data(n_samples: usize) -> (Mat<f64>, Col<f64>) {
    let x = Mat::from_fn(n_samples, 3, |i, j| match j {
        0 => i as f64,
        1 => 2.0 * i as f64, // Perfectly collinear with x0
        _ => (i * i) as f64,
    });
    let y = Col::from_fn(n_samples, |i| 1.0 + 2.0 * x[(i, 0)] + 3.0 * x[(i, 2)]);

    (x, y)
}

/// Generate data with a constant column.
pub fn generate_constant_column_data(n_samples: usize) -> (Mat<f64>, Col<f64>) {
    let x = Mat::from_fn(n_samples, 2, |i, j| if j == 0 { i as f64 } else { 5.0 });
    let y = Col::from_fn(n_samples, |i| 1.0 + 2.0 * x[(i, 0)]);

    (x, y)
}

/// Realistic-looking monthly river samples.
///
/// COD drives BOD5 and dissolved oxygen falls as COD rises; pH, TSS and
/// temperature are unrelated noise. Dates run monthly from January 2010.
pub fn river_table(n: usize, seed: u64) -> ObservationTable {
    (0..n)
        .map(|i| {
            let cod = 40.0 + 30.0 * noise(i, seed) + 0.2 * i as f64;
            let dissolved_oxygen = 8.0 - 0.03 * cod + 0.4 * noise(i, seed + 1);
            let ph = 7.2 + 0.3 * noise(i, seed + 2);
            let tss = 15.0 + 10.0 * noise(i, seed + 3);
            let temp = 20.0 + 4.0 * noise(i, seed + 4);
            let bod5 = 2.0 + 0.35 * cod + 1.5 * noise(i, seed + 5);
            let date = chrono::NaiveDate::from_ymd_opt(2010 + (i / 12) as i32, (i % 12) as u32 + 1, 15);
            Observation::new(date, [ph, cod, dissolved_oxygen, tss, temp, bod5])
        })
        .collect()
}

/// Render a table as CSV text with [`HEADER`].
pub fn to_csv(table: &ObservationTable) -> String {
    let mut out = String::from(HEADER);
    for row in table.rows() {
        out.push('\n');
        if let Some(d) = row.date {
            out.push_str(&d.format("%d/%m/%Y").to_string());
        }
        for v in row.values() {
            out.push_str(&format!(",{}", v));
        }
    }
    out.push('\n');
    out
}

/// Write `contents` to a temporary file that lives as long as the handle.
pub fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// Approximate equality check for floating point values.
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
