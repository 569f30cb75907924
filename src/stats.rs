use std::fmt;

use log::debug;
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::data::{Field, SaleRecord};
use crate::error::{Result, SalesError};

/// The skewness part of the normality test is undefined below this many values
pub const MIN_NORMALITY_SAMPLES: usize = 8;

/// Count, mean, sample standard deviation, min, quartiles and max of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub field: Field,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1), needs two values
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q1: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Distribution {
    Normal,
    #[serde(rename = "Not Normal")]
    NotNormal,
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Normal => f.write_str("Normal"),
            Distribution::NotNormal => f.write_str("Not Normal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityResult {
    pub field: Field,
    /// D'Agostino-Pearson K² statistic
    pub statistic: f64,
    pub p_value: f64,
    pub distribution: Distribution,
}

/// Pairwise Pearson correlation, `values[i][j]` for `fields[i]`, `fields[j]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub fields: Vec<Field>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Field, b: Field) -> Option<f64> {
        let i = self.fields.iter().position(|f| *f == a)?;
        let j = self.fields.iter().position(|f| *f == b)?;
        Some(self.values[i][j])
    }
}

fn numeric(field: Field) -> Result<Field> {
    if field.is_numeric() {
        Ok(field)
    } else {
        Err(SalesError::NotNumeric(field))
    }
}

fn column(records: &[SaleRecord], field: Field) -> Vec<f64> {
    records.iter().filter_map(|r| r.number(field)).collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Linear interpolation between closest ranks (`sorted` must be ascending)
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

fn summarize(field: Field, values: &[f64]) -> ColumnSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mean = mean(values);
    let std = match (mean, values.len()) {
        (Some(m), n) if n > 1 => {
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            Some((ss / (n - 1) as f64).sqrt())
        }
        _ => None,
    };
    ColumnSummary {
        field,
        count: values.len(),
        mean,
        std,
        min: sorted.first().copied(),
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Summary of every numeric column
pub fn describe(records: &[SaleRecord]) -> Vec<ColumnSummary> {
    Field::NUMERIC
        .into_iter()
        .map(|field| summarize(field, &column(records, field)))
        .collect()
}

/// Summary of the given columns, failing on any non-numeric column
pub fn describe_columns(records: &[SaleRecord], fields: &[Field]) -> Result<Vec<ColumnSummary>> {
    fields
        .iter()
        .map(|&field| Ok(summarize(numeric(field)?, &column(records, field))))
        .collect()
}

/// Central moments m2, m3, m4 (biased)
fn moments(values: &[f64]) -> (f64, f64, f64) {
    let n = values.len() as f64;
    let m = values.iter().sum::<f64>() / n;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

fn skew_z(n: f64, m2: f64, m3: f64) -> f64 {
    let b2 = m3 / m2.powf(1.5);
    let y = b2 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    delta * (y / alpha).asinh()
}

fn kurtosis_z(n: f64, m2: f64, m4: f64) -> f64 {
    let b2 = m4 / (m2 * m2);
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (b2 - e) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}

/// D'Agostino-Pearson omnibus test. Returns `(K², p-value)`.
///
/// K² is chi-squared with two degrees of freedom, so the p-value is
/// `exp(-K²/2)`. A constant column yields NaN for both.
pub fn dagostino_pearson(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < MIN_NORMALITY_SAMPLES {
        return None;
    }
    let n = values.len() as f64;
    let (m2, m3, m4) = moments(values);
    let zs = skew_z(n, m2, m3);
    let zk = kurtosis_z(n, m2, m4);
    let k2 = zs * zs + zk * zk;
    Some((k2, (-k2 / 2.0).exp()))
}

fn assess(field: Field, values: &[f64], alpha: f64) -> Result<NormalityResult> {
    let (statistic, p_value) =
        dagostino_pearson(values).ok_or(SalesError::InsufficientData {
            field,
            required: MIN_NORMALITY_SAMPLES,
            actual: values.len(),
        })?;
    let distribution = if p_value > alpha {
        Distribution::Normal
    } else {
        Distribution::NotNormal
    };
    debug!("Normality of {}: p = {:.4} ({})", field, p_value, distribution);
    Ok(NormalityResult {
        field,
        statistic,
        p_value,
        distribution,
    })
}

/// Normality assessment of every numeric column at significance `alpha`
pub fn normality(records: &[SaleRecord], alpha: f64) -> Result<Vec<NormalityResult>> {
    normality_columns(records, &Field::NUMERIC, alpha)
}

/// Normality assessment of every numeric column at the configured `normality_alpha`
pub fn normality_with(
    records: &[SaleRecord],
    config: &DashboardConfig,
) -> Result<Vec<NormalityResult>> {
    normality(records, config.normality_alpha)
}

pub fn normality_columns(
    records: &[SaleRecord],
    fields: &[Field],
    alpha: f64,
) -> Result<Vec<NormalityResult>> {
    fields
        .iter()
        .map(|&field| assess(numeric(field)?, &column(records, field), alpha))
        .collect()
}

/// Pearson correlation coefficient, NaN when either side is constant or
/// there are fewer than two pairs
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mx = xs.iter().sum::<f64>() / n as f64;
    let my = ys.iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    sxy / (sxx * syy).sqrt()
}

/// Correlation matrix over every numeric column
pub fn correlation(records: &[SaleRecord]) -> CorrelationMatrix {
    build_matrix(records, Field::NUMERIC.to_vec())
}

pub fn correlation_columns(records: &[SaleRecord], fields: &[Field]) -> Result<CorrelationMatrix> {
    let fields = fields
        .iter()
        .map(|&f| numeric(f))
        .collect::<Result<Vec<_>>>()?;
    Ok(build_matrix(records, fields))
}

fn build_matrix(records: &[SaleRecord], fields: Vec<Field>) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = fields.iter().map(|&f| column(records, f)).collect();
    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();
    CorrelationMatrix { fields, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_close, sale, sample_dataset};

    fn priced(prices: &[f64]) -> Vec<SaleRecord> {
        prices
            .iter()
            .map(|&p| sale("Ana", "livros", "Livro", "boleto", p, "2020-01-01", "SP"))
            .collect()
    }

    /// Approximate normal quantiles (Tukey lambda, lambda = 0.14)
    fn bell_curve(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let p = (i as f64 + 0.5) / n as f64;
                1000.0 + 100.0 * 4.91 * (p.powf(0.14) - (1.0 - p).powf(0.14))
            })
            .collect()
    }

    #[test]
    fn describe_price_column() {
        let summaries = describe(&sample_dataset());
        assert_eq!(summaries.len(), Field::NUMERIC.len());
        let price = &summaries[0];
        assert_eq!(price.field, Field::Price);
        assert_eq!(price.count, 10);
        assert_close(price.mean.unwrap(), 465.5);
        assert_close(price.min.unwrap(), 40.0);
        assert_close(price.q1.unwrap(), 48.75);
        assert_close(price.median.unwrap(), 210.0);
        assert_close(price.q3.unwrap(), 687.5);
        assert_close(price.max.unwrap(), 1500.0);
    }

    #[test]
    fn describe_uses_sample_std() {
        let summaries = describe_columns(&sample_dataset(), &[Field::Rating]).unwrap();
        assert_close(summaries[0].std.unwrap(), (17.6_f64 / 9.0).sqrt());
    }

    #[test]
    fn describe_degenerate_columns() {
        let empty = describe(&[]);
        assert!(empty.iter().all(|s| s.count == 0 && s.mean.is_none() && s.max.is_none()));

        let single = describe_columns(&priced(&[7.0]), &[Field::Price]).unwrap();
        assert_eq!(single[0].mean, Some(7.0));
        assert_eq!(single[0].std, None);
        assert_eq!(single[0].median, Some(7.0));
    }

    #[test]
    fn describe_rejects_text_column() {
        assert!(matches!(
            describe_columns(&sample_dataset(), &[Field::Price, Field::Seller]),
            Err(SalesError::NotNumeric(Field::Seller))
        ));
    }

    #[test]
    fn skewed_column_is_not_normal() {
        let prices: Vec<f64> = (1..=50).map(|i| f64::from(i).powi(4)).collect();
        let results = normality_columns(&priced(&prices), &[Field::Price], 0.05).unwrap();
        assert_eq!(results[0].distribution, Distribution::NotNormal);
        assert!(results[0].p_value < 0.05);
    }

    #[test]
    fn bell_shaped_column_is_normal() {
        let results = normality_columns(&priced(&bell_curve(200)), &[Field::Price], 0.05).unwrap();
        assert_eq!(results[0].distribution, Distribution::Normal);
        assert!(results[0].p_value > 0.05 && results[0].p_value <= 1.0);
    }

    #[test]
    fn normality_uses_configured_alpha() {
        let records = priced(&bell_curve(200));
        let default = normality_with(&records, &DashboardConfig::default()).unwrap();
        assert_eq!(default[0].field, Field::Price);
        assert_eq!(default[0].distribution, Distribution::Normal);

        // no p-value exceeds 1, so nothing passes at alpha = 1
        let strict = DashboardConfig {
            normality_alpha: 1.0,
            ..Default::default()
        };
        let results = normality_with(&records, &strict).unwrap();
        assert_eq!(results.len(), Field::NUMERIC.len());
        assert!(results.iter().all(|r| r.distribution == Distribution::NotNormal));
    }

    #[test]
    fn constant_column_is_not_normal() {
        let (_, p) = dagostino_pearson(&[3.0; 20]).unwrap();
        assert!(p.is_nan());
        let results = normality_columns(&priced(&[3.0; 20]), &[Field::Price], 0.05).unwrap();
        assert_eq!(results[0].distribution, Distribution::NotNormal);
    }

    #[test]
    fn normality_needs_eight_values() {
        let err = normality(&sample_dataset()[..5], 0.05).unwrap_err();
        assert!(matches!(
            err,
            SalesError::InsufficientData { field: Field::Price, required: 8, actual: 5 }
        ));
        assert_eq!(normality(&sample_dataset(), 0.05).unwrap().len(), 5);
    }

    #[test]
    fn correlation_matrix() {
        let matrix = correlation(&sample_dataset());
        assert_eq!(matrix.fields, Field::NUMERIC.to_vec());
        // freight is a fixed share of price in the fixture
        assert_close(matrix.get(Field::Price, Field::Freight).unwrap(), 1.0);
        assert_close(matrix.get(Field::Rating, Field::Rating).unwrap(), 1.0);
        assert_eq!(
            matrix.get(Field::Price, Field::Rating),
            matrix.get(Field::Rating, Field::Price)
        );
        assert_eq!(matrix.get(Field::Price, Field::Seller), None);
    }

    #[test]
    fn correlation_degenerate_inputs() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert_close(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), -1.0);
        assert!(correlation_columns(&sample_dataset(), &[Field::Category]).is_err());
    }
}
