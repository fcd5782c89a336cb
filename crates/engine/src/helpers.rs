use chrono::NaiveDate;
use vd_database::helpers::render_literal;
use vd_types::Value;

/// Round half away from zero to two decimals.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Zero for fewer than two values.
pub fn sample_std(xs: &[f64]) -> f64 {
    let Some(m) = mean(xs) else {
        return 0.0;
    };
    if xs.len() < 2 {
        return 0.0;
    }
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

pub fn date_literal(d: NaiveDate) -> String {
    render_literal(&Value::Date(d))
}
