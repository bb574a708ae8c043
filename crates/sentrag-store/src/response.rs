//! Response decoding.
//!
//! Search output arrives as one array per row, each array holding
//! single-key objects (`[{"name": "a.txt"}, {"index": 0}, {"fulltext_column": "..."}]`).
//! Rows are merged into one map and every field is checked before it is read.

use serde::Deserialize;
use serde_json::{Map, Value};

use sentrag_core::types::SearchHit;

use crate::error::StoreError;
use crate::schema::{INDEX_COLUMN, NAME_COLUMN, SCORE_COLUMN, SIMILARITY_COLUMN, TEXT_COLUMN};

/// Status envelope returned by every endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub error_code: i64,
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl StatusResponse {
    pub fn into_result(self, operation: &'static str) -> Result<(), StoreError> {
        if self.error_code == 0 {
            return Ok(());
        }
        Err(StoreError::Rejected {
            operation,
            code: self.error_code,
            message: self.error_msg.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub status: StatusResponse,
    /// Absent and `null` both mean no rows.
    #[serde(default)]
    pub output: Option<Vec<Value>>,
}

impl SearchResponse {
    pub fn into_hits(self) -> Result<Vec<SearchHit>, StoreError> {
        self.status.into_result("search")?;
        flatten_rows(&self.output.unwrap_or_default())
    }
}

pub fn flatten_rows(output: &[Value]) -> Result<Vec<SearchHit>, StoreError> {
    output.iter().enumerate().map(|(row, value)| flatten_row(row, value)).collect()
}

/// Merge one row's column objects and extract a typed hit. Later columns win
/// when a key repeats.
pub fn flatten_row(row: usize, value: &Value) -> Result<SearchHit, StoreError> {
    let columns = value
        .as_array()
        .ok_or_else(|| invalid(row, format!("expected an array of column objects, got {}", kind(value))))?;

    let mut merged = Map::new();
    for column in columns {
        let object = column
            .as_object()
            .ok_or_else(|| invalid(row, format!("expected a column object, got {}", kind(column))))?;
        for (key, v) in object {
            merged.insert(key.clone(), v.clone());
        }
    }

    let name = required(row, &merged, NAME_COLUMN)?
        .as_str()
        .ok_or_else(|| wrong_type(row, NAME_COLUMN, "a string"))?
        .to_string();
    let index = as_index(required(row, &merged, INDEX_COLUMN)?)
        .ok_or_else(|| wrong_type(row, INDEX_COLUMN, "a non-negative integer"))?;
    let text = required(row, &merged, TEXT_COLUMN)?
        .as_str()
        .ok_or_else(|| wrong_type(row, TEXT_COLUMN, "a string"))?
        .to_string();

    let score = match [SCORE_COLUMN, SIMILARITY_COLUMN].iter().find_map(|c| merged.get(*c).map(|v| (*c, v))) {
        Some((column, v)) => Some(v.as_f64().ok_or_else(|| wrong_type(row, column, "a number"))? as f32),
        None => None,
    };

    Ok(SearchHit { name, index, text, score })
}

fn required<'a>(row: usize, merged: &'a Map<String, Value>, column: &str) -> Result<&'a Value, StoreError> {
    merged.get(column).ok_or_else(|| invalid(row, format!("missing column `{column}`")))
}

/// Integers may arrive as JSON floats (`3.0`); fractional or negative values
/// are rejected.
fn as_index(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 {
        return usize::try_from(f as u64).ok();
    }
    None
}

fn invalid(row: usize, problem: String) -> StoreError {
    StoreError::InvalidRow { row, problem }
}

fn wrong_type(row: usize, column: &str, expected: &str) -> StoreError {
    invalid(row, format!("column `{column}` is not {expected}"))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_single_key_columns() {
        let row = json!([{ "name": "notes.txt" }, { "index": 3 }, { "fulltext_column": "Today is Saturday." }]);
        let hit = flatten_row(0, &row).unwrap();
        assert_eq!(
            hit,
            SearchHit { name: "notes.txt".into(), index: 3, text: "Today is Saturday.".into(), score: None }
        );
    }

    #[test]
    fn columns_may_share_an_object_and_come_in_any_order() {
        let row = json!([{ "fulltext_column": "t", "_score": 1.5 }, { "index": 2.0, "name": "n" }]);
        let hit = flatten_row(0, &row).unwrap();
        assert_eq!(hit.index, 2);
        assert_eq!(hit.score, Some(1.5));
    }

    #[test]
    fn missing_column_names_row_and_field() {
        let row = json!([{ "name": "n" }, { "fulltext_column": "t" }]);
        let err = flatten_row(4, &row).unwrap_err();
        assert_eq!(err.to_string(), "search row 4: missing column `index`");
    }

    #[test]
    fn wrong_types_are_rejected() {
        for row in [
            json!([{ "name": 7 }, { "index": 0 }, { "fulltext_column": "t" }]),
            json!([{ "name": "n" }, { "index": "0" }, { "fulltext_column": "t" }]),
            json!([{ "name": "n" }, { "index": -1 }, { "fulltext_column": "t" }]),
            json!([{ "name": "n" }, { "index": 1.5 }, { "fulltext_column": "t" }]),
            json!([{ "name": "n" }, { "index": 0 }, { "fulltext_column": null }]),
            json!([{ "name": "n" }, { "index": 0 }, { "fulltext_column": "t" }, { "_score": "high" }]),
            json!({ "name": "n", "index": 0, "fulltext_column": "t" }),
            json!([["name", "n"]]),
        ] {
            let err = flatten_row(0, &row).unwrap_err();
            assert!(matches!(err, StoreError::InvalidRow { row: 0, .. }), "row {row} gave {err}");
        }
    }

    #[test]
    fn non_zero_code_is_rejected_with_store_message() {
        let resp: SearchResponse = serde_json::from_value(json!({
            "error_code": 3022,
            "error_msg": "Table data not found",
            "output": []
        }))
        .unwrap();
        let err = resp.into_hits().unwrap_err();
        assert!(err.to_string().contains("Table data not found"));
    }

    #[test]
    fn zero_code_without_output_is_empty() {
        let resp: SearchResponse = serde_json::from_value(json!({ "error_code": 0 })).unwrap();
        assert!(resp.into_hits().unwrap().is_empty());
    }

    #[test]
    fn null_output_is_empty() {
        let resp: SearchResponse = serde_json::from_str(
            r#"{"error_code":0,"error_msg":null,"output":null,"total_hits_count":0}"#,
        )
        .unwrap();
        assert!(resp.into_hits().unwrap().is_empty());
    }
}
