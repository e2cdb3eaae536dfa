//! Reader and writer for the JSON documents the game exchanges with its host:
//!
//! - grid definition: `{"blocks": [{"R": 1, "C": 1, "number": 3}, ...]}`
//! - result log: `{"results": [{"total_clicks": 4, "total_time": 10.0, "pairs": 2, "score": 1140}, ...]}`
//! - leaderboard: `{"leaderboard": [{"playerName": "AAA", "score": 300}, ...]}`
//!
//! Fields are read one by one so every mismatch names the offending path, e.g. `blocks[3].number`.
//! Unknown fields are ignored.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde_json::{Map, Value, json};

use crate::*;

type Object = Map<String, Value>;
type DocResult<T> = core::result::Result<T, DocumentError>;

const ROOT: &str = "$";

pub fn parse_grid(text: &str) -> DocResult<Vec<TileSpec>> {
    let root = parse_root(text)?;
    records(&root, "blocks")?
        .into_iter()
        .map(|(path, record)| {
            Ok(TileSpec {
                row: int_field(record, &path, "R")?,
                col: int_field(record, &path, "C")?,
                value: int_field(record, &path, "number")?,
            })
        })
        .collect()
}

pub fn grid_to_json(tiles: &[TileSpec]) -> DocResult<String> {
    let blocks: Vec<Value> = tiles
        .iter()
        .map(|tile| json!({ "R": tile.row, "C": tile.col, "number": tile.value }))
        .collect();
    encode(&json!({ "blocks": blocks }))
}

pub fn parse_results(text: &str) -> DocResult<Vec<GameResult>> {
    let root = parse_root(text)?;
    records(&root, "results")?
        .into_iter()
        .map(|(path, record)| {
            Ok(GameResult {
                total_clicks: int_field(record, &path, "total_clicks")?,
                total_time_seconds: float_field(record, &path, "total_time")?,
                pairs_found: int_field(record, &path, "pairs")?,
                score: int_field(record, &path, "score")?,
            })
        })
        .collect()
}

pub fn results_to_json(results: &[GameResult]) -> DocResult<String> {
    let records: Vec<Value> = results
        .iter()
        .map(|result| {
            json!({
                "total_clicks": result.total_clicks,
                "total_time": result.total_time_seconds,
                "pairs": result.pairs_found,
                "score": result.score,
            })
        })
        .collect();
    encode(&json!({ "results": records }))
}

pub fn parse_leaderboard(text: &str) -> DocResult<Vec<PlayerScoreEntry>> {
    let root = parse_root(text)?;
    records(&root, "leaderboard")?
        .into_iter()
        .map(|(path, record)| {
            Ok(PlayerScoreEntry {
                player_name: string_field(record, &path, "playerName")?,
                score: int_field(record, &path, "score")?,
            })
        })
        .collect()
}

pub fn leaderboard_to_json(entries: &[PlayerScoreEntry]) -> DocResult<String> {
    let records: Vec<Value> = entries
        .iter()
        .map(|entry| json!({ "playerName": entry.player_name, "score": entry.score }))
        .collect();
    encode(&json!({ "leaderboard": records }))
}

fn encode(value: &Value) -> DocResult<String> {
    serde_json::to_string_pretty(value).map_err(|err| DocumentError::Encode(err.to_string()))
}

fn parse_root(text: &str) -> DocResult<Object> {
    match serde_json::from_str(text) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(wrong_type(ROOT, "an object")),
        Err(err) => Err(DocumentError::Syntax(err.to_string())),
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent == ROOT {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn wrong_type(path: &str, expected: &'static str) -> DocumentError {
    DocumentError::WrongType {
        path: path.to_string(),
        expected,
    }
}

fn field<'a>(object: &'a Object, parent: &str, name: &str) -> DocResult<(&'a Value, String)> {
    let path = child_path(parent, name);
    match object.get(name) {
        Some(value) => Ok((value, path)),
        None => Err(DocumentError::MissingField { path }),
    }
}

/// Objects of the array stored under `name` in the root, each with its path.
fn records<'a>(root: &'a Object, name: &str) -> DocResult<Vec<(String, &'a Object)>> {
    let (value, path) = field(root, ROOT, name)?;
    let Value::Array(items) = value else {
        return Err(wrong_type(&path, "an array"));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let item_path = format!("{path}[{index}]");
            match item {
                Value::Object(record) => Ok((item_path, record)),
                _ => Err(wrong_type(&item_path, "an object")),
            }
        })
        .collect()
}

fn int_field<T: TryFrom<i64>>(record: &Object, parent: &str, name: &str) -> DocResult<T> {
    let (value, path) = field(record, parent, name)?;
    let Value::Number(number) = value else {
        return Err(wrong_type(&path, "an integer"));
    };

    if let Some(int) = number.as_i64() {
        T::try_from(int).map_err(|_| DocumentError::OutOfRange { path })
    } else if number.is_u64() {
        Err(DocumentError::OutOfRange { path })
    } else {
        Err(wrong_type(&path, "an integer"))
    }
}

fn float_field(record: &Object, parent: &str, name: &str) -> DocResult<f64> {
    let (value, path) = field(record, parent, name)?;
    value.as_f64().ok_or_else(|| wrong_type(&path, "a number"))
}

fn string_field(record: &Object, parent: &str, name: &str) -> DocResult<String> {
    let (value, path) = field(record, parent, name)?;
    value
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| wrong_type(&path, "a string"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn grid_fields_are_read_in_file_order() {
        let text = r#"{
            "blocks": [
                { "R": 1, "C": 1, "number": 1 },
                { "R": 1, "C": 2, "number": 1, "comment": "ignored" },
                { "R": -2, "C": 0, "number": 12 }
            ]
        }"#;

        assert_eq!(
            parse_grid(text).unwrap(),
            vec![
                TileSpec::new(1, 1, 1),
                TileSpec::new(1, 2, 1),
                TileSpec::new(-2, 0, 12),
            ]
        );
    }

    #[test]
    fn empty_block_list_is_a_valid_document() {
        assert_eq!(parse_grid(r#"{"blocks": []}"#).unwrap(), vec![]);
    }

    #[test]
    fn missing_fields_are_reported_with_their_path() {
        let text = r#"{"blocks": [{"R": 1, "C": 1, "number": 1}, {"R": 1, "number": 1}]}"#;

        assert_eq!(
            parse_grid(text).unwrap_err(),
            DocumentError::MissingField {
                path: "blocks[1].C".into()
            }
        );
        assert_eq!(
            parse_grid("{}").unwrap_err(),
            DocumentError::MissingField {
                path: "blocks".into()
            }
        );
    }

    #[test]
    fn wrong_types_are_reported_with_their_path() {
        assert_eq!(
            parse_grid(r#"{"blocks": [{"R": "1", "C": 1, "number": 1}]}"#).unwrap_err(),
            DocumentError::WrongType {
                path: "blocks[0].R".into(),
                expected: "an integer"
            }
        );
        assert_eq!(
            parse_grid(r#"{"blocks": [{"R": 1.5, "C": 1, "number": 1}]}"#).unwrap_err(),
            DocumentError::WrongType {
                path: "blocks[0].R".into(),
                expected: "an integer"
            }
        );
        assert_eq!(
            parse_grid(r#"{"blocks": {}}"#).unwrap_err(),
            DocumentError::WrongType {
                path: "blocks".into(),
                expected: "an array"
            }
        );
        assert_eq!(
            parse_grid(r#"{"blocks": [7]}"#).unwrap_err(),
            DocumentError::WrongType {
                path: "blocks[0]".into(),
                expected: "an object"
            }
        );
    }

    #[test]
    fn integers_outside_the_field_type_are_out_of_range() {
        assert_eq!(
            parse_grid(r#"{"blocks": [{"R": 3000000000, "C": 1, "number": 1}]}"#).unwrap_err(),
            DocumentError::OutOfRange {
                path: "blocks[0].R".into()
            }
        );
        assert_eq!(
            parse_results(
                r#"{"results": [{"total_clicks": -1, "total_time": 1, "pairs": 0, "score": 0}]}"#
            )
            .unwrap_err(),
            DocumentError::OutOfRange {
                path: "results[0].total_clicks".into()
            }
        );
    }

    #[test]
    fn malformed_json_is_a_syntax_error() {
        assert!(matches!(
            parse_leaderboard("{\"leaderboard\": ["),
            Err(DocumentError::Syntax(_))
        ));
    }

    #[test]
    fn results_accept_integer_and_float_times() {
        let text = r#"{"results": [
            {"total_clicks": 4, "total_time": 10.0, "pairs": 2, "score": 1140},
            {"total_clicks": 8, "total_time": 31, "pairs": 2, "score": 858}
        ]}"#;

        let results = parse_results(text).unwrap();

        assert_eq!(results[0].total_time_seconds, 10.0);
        assert_eq!(results[1].total_time_seconds, 31.0);
        assert_eq!(results[1].score, 858);
    }

    #[test]
    fn written_leaderboard_keeps_camel_case_names() {
        let entries = [PlayerScoreEntry::new("AAA", 300)];
        let text = leaderboard_to_json(&entries).unwrap();

        assert!(text.contains("\"playerName\": \"AAA\""));
        assert_eq!(parse_leaderboard(&text).unwrap(), entries);
    }

    #[test]
    fn written_grid_reads_back() {
        let tiles = [TileSpec::new(0, 0, 4), TileSpec::new(0, 1, 4)];

        assert_eq!(parse_grid(&grid_to_json(&tiles).unwrap()).unwrap(), tiles);
    }
}
