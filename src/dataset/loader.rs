//! Record parsing for marketing datasets

use crate::dataset::types::{DatasetOptions, MarketingDataset};
use crate::errors::{MixError, Result};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

type Record = Map<String, Value>;

impl MarketingDataset {
    /// Parse a JSON document holding the records
    ///
    /// Accepted shapes: an array of records, `{"records": [...]}`, or an
    /// object keyed by date whose values are the remaining columns.
    pub fn from_json_str(input: &str, options: &DatasetOptions) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        let records = records_from_value(value, &options.date_column)?;
        Self::from_records(&records, options)
    }

    /// Build a dataset from tabular records
    pub fn from_records(records: &[Record], options: &DatasetOptions) -> Result<Self> {
        if records.is_empty() {
            return Err(MixError::Dataset("no records provided".to_string()));
        }

        let mut rows: Vec<(NaiveDate, &Record)> = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let raw = record.get(&options.date_column).ok_or_else(|| {
                    MixError::Dataset(format!(
                        "row {} has no date column '{}'",
                        i, options.date_column
                    ))
                })?;
                Ok::<_, MixError>((parse_date(raw)?, record))
            })
            .collect::<Result<_>>()?;
        rows.sort_by_key(|(date, _)| *date);

        let columns: BTreeSet<&String> = records.iter().flat_map(|r| r.keys()).collect();

        let target_column = match &options.target_column {
            Some(column) => columns
                .iter()
                .find(|c| c.as_str() == column.as_str())
                .map(|c| c.to_string()),
            None => options
                .target_candidates
                .iter()
                .find(|candidate| columns.iter().any(|c| c == candidate))
                .cloned(),
        }
        .ok_or_else(|| MixError::Dataset("target KPI column not found or specified".to_string()))?;

        let channel_columns: Vec<String> = if options.channel_columns.is_empty() {
            columns
                .iter()
                .filter(|c| {
                    **c != &target_column
                        && !c.to_lowercase().contains("date")
                        && !options.control_columns.contains(**c)
                        && records.iter().all(|r| r.get(c.as_str()).map_or(false, Value::is_number))
                })
                .map(|c| c.to_string())
                .collect()
        } else {
            options
                .channel_columns
                .iter()
                .filter(|c| columns.contains(c))
                .cloned()
                .collect()
        };

        if channel_columns.is_empty() {
            return Err(MixError::Dataset(
                "no marketing channel columns found or specified".to_string(),
            ));
        }

        let control_columns: Vec<&String> = options
            .control_columns
            .iter()
            .filter(|c| columns.contains(c))
            .collect();

        let target = column_values(&rows, &target_column)?;

        let mut channels = BTreeMap::new();
        for column in &channel_columns {
            channels.insert(column.clone(), column_values(&rows, column)?);
        }

        let mut controls = BTreeMap::new();
        for column in control_columns {
            controls.insert(column.clone(), column_values(&rows, column)?);
        }

        debug!(
            rows = rows.len(),
            channels = channels.len(),
            target = %target_column,
            "prepared marketing dataset"
        );

        Ok(Self {
            dates: rows.iter().map(|(date, _)| *date).collect(),
            target_column,
            target,
            channels,
            controls,
        })
    }
}

fn records_from_value(value: Value, date_column: &str) -> Result<Vec<Record>> {
    match value {
        Value::Array(items) => items.into_iter().map(into_record).collect(),
        Value::Object(mut object) => {
            if let Some(Value::Array(items)) = object.remove("records") {
                return items.into_iter().map(into_record).collect();
            }
            // Date-keyed object: {"2024-01-01": {"revenue": ...}, ...}
            object
                .into_iter()
                .map(|(date, row)| {
                    let mut record = into_record(row)?;
                    record.insert(date_column.to_string(), Value::String(date));
                    Ok(record)
                })
                .collect()
        }
        _ => Err(MixError::Dataset(
            "expected an array of records or an object".to_string(),
        )),
    }
}

fn into_record(value: Value) -> Result<Record> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(MixError::Dataset(format!("record is not an object: {}", other))),
    }
}

fn parse_date(value: &Value) -> Result<NaiveDate> {
    let text = value
        .as_str()
        .ok_or_else(|| MixError::Dataset(format!("date is not a string: {}", value)))?;
    // Tolerate timestamps by reading the calendar date prefix
    let day = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| MixError::Dataset(format!("invalid date '{}': {}", text, e)))
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn column_values(rows: &[(NaiveDate, &Record)], column: &str) -> Result<Vec<f64>> {
    rows.iter()
        .map(|(date, record)| {
            record.get(column).and_then(numeric).ok_or_else(|| {
                MixError::Dataset(format!("column '{}' is not numeric on {}", column, date))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Record> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|v| v.as_object().cloned().unwrap())
                .collect(),
            _ => panic!("expected array"),
        }
    }

    fn sample() -> Vec<Record> {
        records(json!([
            {"date": "2024-01-15", "revenue": 1500.0, "search": 300.0, "social": 120.0, "region": "north"},
            {"date": "2024-01-01", "revenue": 1000.0, "search": 200.0, "social": 100.0, "region": "north"},
            {"date": "2024-01-08", "revenue": 1200.0, "search": 250.0, "social": 110.0, "region": "south"}
        ]))
    }

    #[test]
    fn test_guesses_target_and_channels() {
        let dataset = MarketingDataset::from_records(&sample(), &DatasetOptions::default()).unwrap();
        assert_eq!(dataset.target_column, "revenue");
        assert_eq!(
            dataset.channels.keys().cloned().collect::<Vec<_>>(),
            vec!["search".to_string(), "social".to_string()]
        );
        assert_eq!(dataset.period_count(), 3);
    }

    #[test]
    fn test_sorted_by_date() {
        let dataset = MarketingDataset::from_records(&sample(), &DatasetOptions::default()).unwrap();
        assert_eq!(dataset.target, vec![1000.0, 1200.0, 1500.0]);
        assert_eq!(dataset.channel_spend("search").unwrap(), &[200.0, 250.0, 300.0]);

        let range = dataset.date_range().unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_explicit_columns() {
        let options = DatasetOptions {
            target_column: Some("search".to_string()),
            channel_columns: vec!["social".to_string(), "missing".to_string()],
            ..DatasetOptions::default()
        };
        let dataset = MarketingDataset::from_records(&sample(), &options).unwrap();
        assert_eq!(dataset.target_column, "search");
        assert_eq!(dataset.channels.len(), 1);
        assert!(dataset.channels.contains_key("social"));
    }

    #[test]
    fn test_controls_excluded_from_channels() {
        let rows = records(json!([
            {"date": "2024-01-01", "sales": 10, "tv": 5, "temperature": 21.5},
            {"date": "2024-01-02", "sales": 12, "tv": 6, "temperature": 19.0}
        ]));
        let options = DatasetOptions {
            control_columns: vec!["temperature".to_string()],
            ..DatasetOptions::default()
        };
        let dataset = MarketingDataset::from_records(&rows, &options).unwrap();
        assert_eq!(dataset.target_column, "sales");
        assert!(dataset.channels.contains_key("tv"));
        assert!(!dataset.channels.contains_key("temperature"));
        assert_eq!(dataset.controls["temperature"], vec![21.5, 19.0]);
    }

    #[test]
    fn test_missing_target() {
        let rows = records(json!([{"date": "2024-01-01", "search": 1.0}]));
        let err = MarketingDataset::from_records(&rows, &DatasetOptions::default()).unwrap_err();
        assert!(err.to_string().contains("target"));
    }

    #[test]
    fn test_no_channels() {
        let rows = records(json!([{"date": "2024-01-01", "revenue": 1.0, "note": "x"}]));
        let err = MarketingDataset::from_records(&rows, &DatasetOptions::default()).unwrap_err();
        assert!(err.to_string().contains("channel"));
    }

    #[test]
    fn test_bad_date() {
        let rows = records(json!([{"date": "01/02/2024", "revenue": 1.0, "search": 1.0}]));
        assert!(MarketingDataset::from_records(&rows, &DatasetOptions::default()).is_err());
    }

    #[test]
    fn test_timestamp_dates() {
        let rows = records(json!([{"date": "2024-03-01T00:00:00Z", "revenue": 1.0, "search": 1.0}]));
        let dataset = MarketingDataset::from_records(&rows, &DatasetOptions::default()).unwrap();
        assert_eq!(dataset.dates[0], NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_json_shapes() {
        let options = DatasetOptions::default();

        let wrapped = r#"{"records": [{"date": "2024-01-01", "kpi": 3, "email": 1}]}"#;
        let dataset = MarketingDataset::from_json_str(wrapped, &options).unwrap();
        assert_eq!(dataset.target_column, "kpi");

        let keyed = r#"{
            "2024-01-02": {"conversions": 4, "email": 2},
            "2024-01-01": {"conversions": 3, "email": 1}
        }"#;
        let dataset = MarketingDataset::from_json_str(keyed, &options).unwrap();
        assert_eq!(dataset.target, vec![3.0, 4.0]);
        assert_eq!(dataset.metadata().row_count, 2);
    }

    #[test]
    fn test_empty_records() {
        assert!(MarketingDataset::from_records(&[], &DatasetOptions::default()).is_err());
    }
}
