use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Map,
    Line,
    Bar,
    Pie,
    Heatmap,
    Histogram,
}

/// Tabular data for one chart plus the fields to encode on each axis
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub title: String,
    #[serde(alias = "chart_type")]
    pub chart_type: ChartType,
    #[serde(alias = "x")]
    pub x_field: String,
    #[serde(alias = "y")]
    pub y_field: String,
    /// Field that splits rows into series (e.g. one line per year)
    #[serde(default, alias = "series_field")]
    pub series_field: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Fixed y-axis range, otherwise the renderer picks one
    #[serde(default, alias = "y_range")]
    pub y_range: Option<(f64, f64)>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "truncated_from")]
    pub truncated_from: Option<usize>,
}

impl ChartData {
    pub fn new(
        title: impl Into<String>,
        chart_type: ChartType,
        x_field: &str,
        y_field: &str,
        columns: &[&str],
    ) -> Self {
        Self {
            title: title.into(),
            chart_type,
            x_field: x_field.to_string(),
            y_field: y_field.to_string(),
            series_field: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            y_range: None,
            status: None,
            truncated_from: None,
        }
    }

    #[must_use]
    pub fn with_series(mut self, field: &str) -> Self {
        self.series_field = Some(field.to_string());
        self
    }

    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows = rows;
        self
    }

    /// Pin the y axis to `[0, max y]`
    #[must_use]
    pub fn with_zero_based_y(mut self) -> Self {
        self.y_range = Some((0.0, self.max_y()));
        self
    }

    /// Truncate rows to `max_rows`, recording original count in `truncated_from`
    pub fn apply_row_limit(&mut self, max_rows: usize) {
        if self.rows.len() > max_rows {
            self.truncated_from = Some(self.rows.len());
            self.rows.truncate(max_rows);
            self.status = Some("truncated".to_string());
        }
    }

    pub fn get_x_index(&self) -> usize {
        self.columns
            .iter()
            .position(|c| c == &self.x_field)
            .unwrap_or(0)
    }

    pub fn get_y_index(&self) -> usize {
        self.columns
            .iter()
            .position(|c| c == &self.y_field)
            .unwrap_or(1.min(self.columns.len().saturating_sub(1)))
    }

    pub fn get_y_value(&self, row: &[Value]) -> f64 {
        let idx = self.get_y_index();
        row.get(idx).map(value_to_f64).unwrap_or(0.0)
    }

    pub fn max_y(&self) -> f64 {
        self.rows
            .iter()
            .map(|row| self.get_y_value(row))
            .fold(0.0_f64, |a, b| a.max(b))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn value_to_f64(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn revenue_chart() -> ChartData {
        ChartData::new("Receita", ChartType::Bar, "region", "revenue", &["region", "revenue"])
    }

    #[test]
    fn apply_row_limit_truncates() {
        let mut data = revenue_chart();
        for i in 0..60 {
            data.rows.push(vec![json!(format!("R{i}")), json!(i)]);
        }
        data.apply_row_limit(50);
        assert_eq!(data.rows.len(), 50);
        assert_eq!(data.truncated_from, Some(60));
        assert_eq!(data.status.as_deref(), Some("truncated"));
    }

    #[test]
    fn apply_row_limit_keeps_short_tables() {
        let mut data = revenue_chart().with_rows(vec![vec![json!("SP"), json!(10.0)]]);
        data.apply_row_limit(50);
        assert_eq!(data.rows.len(), 1);
        assert!(data.truncated_from.is_none());
        assert!(data.status.is_none());
    }

    #[test]
    fn zero_based_y_uses_max() {
        let data = revenue_chart()
            .with_rows(vec![
                vec![json!("SP"), json!(120.5)],
                vec![json!("RJ"), json!("300")],
                vec![json!("MG"), json!(null)],
            ])
            .with_zero_based_y();
        assert_eq!(data.y_range, Some((0.0, 300.0)));
        assert_eq!(data.get_x_index(), 0);
        assert_eq!(data.get_y_index(), 1);
    }

    #[test]
    fn parse_snake_case_payload() {
        let json = r#"{
            "title": "Test",
            "chart_type": "line",
            "x": "month",
            "y": "revenue",
            "series_field": "year",
            "columns": ["month", "year", "revenue"],
            "rows": [["January", 2020, 100]]
        }"#;
        let data: ChartData = serde_json::from_str(json).unwrap();
        assert_eq!(data.chart_type, ChartType::Line);
        assert_eq!(data.x_field, "month");
        assert_eq!(data.series_field.as_deref(), Some("year"));
        assert_eq!(data.get_y_index(), 2);
    }

    #[test]
    fn json_round_trip_uses_camel_case() {
        let data = revenue_chart().with_series("year");
        let json = data.to_json().unwrap();
        assert!(json.contains("\"xField\""));
        assert!(json.contains("\"seriesField\""));
        let parsed: ChartData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, data);
    }
}
