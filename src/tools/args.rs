//! Argument extraction for tool calls

use crate::tools::ToolError;
use serde::de::DeserializeOwned;
use serde_json::Value;

fn field<'a>(args: &'a Value, name: &str) -> Option<&'a Value> {
    args.get(name).filter(|v| !v.is_null())
}

pub fn required_str<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    match field(args, name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        Some(Value::String(_)) | None => Err(ToolError::MissingArgument(name.to_string())),
        Some(_) => Err(ToolError::invalid(name, "expected a string")),
    }
}

pub fn optional_str<'a>(args: &'a Value, name: &str) -> Option<&'a str> {
    field(args, name).and_then(Value::as_str)
}

pub fn str_or<'a>(args: &'a Value, name: &str, default: &'a str) -> &'a str {
    optional_str(args, name).unwrap_or(default)
}

pub fn usize_or(args: &Value, name: &str, default: usize) -> Result<usize, ToolError> {
    match field(args, name) {
        None => Ok(default),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| ToolError::invalid(name, "expected a non-negative integer")),
    }
}

pub fn u32_or(args: &Value, name: &str, default: u32) -> Result<u32, ToolError> {
    let value = usize_or(args, name, default as usize)?;
    u32::try_from(value).map_err(|_| ToolError::invalid(name, format!("must be at most {}", u32::MAX)))
}

pub fn f64_or(args: &Value, name: &str, default: f64) -> Result<f64, ToolError> {
    match field(args, name) {
        None => Ok(default),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| ToolError::invalid(name, "expected a number")),
    }
}

pub fn required_f64(args: &Value, name: &str) -> Result<f64, ToolError> {
    match field(args, name) {
        None => Err(ToolError::MissingArgument(name.to_string())),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| ToolError::invalid(name, "expected a number")),
    }
}

pub fn bool_or(args: &Value, name: &str, default: bool) -> bool {
    field(args, name).and_then(Value::as_bool).unwrap_or(default)
}

/// List of strings; a single string is treated as a one-item list
pub fn string_list(args: &Value, name: &str) -> Result<Vec<String>, ToolError> {
    match field(args, name) {
        None => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(ToolError::invalid(
                    name,
                    format!("expected a list of strings, found {}", other),
                )),
            })
            .collect(),
        Some(_) => Err(ToolError::invalid(name, "expected a list of strings")),
    }
}

/// Deserialize a required argument
pub fn parse<T: DeserializeOwned>(args: &Value, name: &str) -> Result<T, ToolError> {
    let value = field(args, name).ok_or_else(|| ToolError::MissingArgument(name.to_string()))?;
    serde_json::from_value(value.clone()).map_err(|e| ToolError::invalid(name, e.to_string()))
}

/// Deserialize an optional argument
pub fn parse_opt<T: DeserializeOwned>(args: &Value, name: &str) -> Result<Option<T>, ToolError> {
    field(args, name)
        .map(|value| {
            serde_json::from_value(value.clone()).map_err(|e| ToolError::invalid(name, e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_str() {
        let args = json!({ "query": "ai", "blank": "  ", "n": 3 });
        assert_eq!(required_str(&args, "query").unwrap(), "ai");
        assert!(matches!(
            required_str(&args, "blank"),
            Err(ToolError::MissingArgument(_))
        ));
        assert!(matches!(
            required_str(&args, "n"),
            Err(ToolError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_defaults_and_nulls() {
        let args = json!({ "max_results": null, "depth": 2 });
        assert_eq!(usize_or(&args, "max_results", 5).unwrap(), 5);
        assert_eq!(usize_or(&args, "depth", 5).unwrap(), 2);
        assert!(usize_or(&json!({ "depth": -1 }), "depth", 5).is_err());
        assert_eq!(str_or(&args, "format", "daily"), "daily");
        assert_eq!(u32_or(&args, "depth", 7).unwrap(), 2);
        assert!(matches!(
            u32_or(&json!({ "fps": 4_294_967_306u64 }), "fps", 25),
            Err(ToolError::InvalidArgument { .. })
        ));
        assert!(bool_or(&args, "missing", true));
    }

    #[test]
    fn test_string_list() {
        assert_eq!(
            string_list(&json!({ "s": "one" }), "s").unwrap(),
            vec!["one".to_string()]
        );
        assert_eq!(
            string_list(&json!({ "s": ["a", "b"] }), "s").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(string_list(&json!({}), "s").unwrap().is_empty());
        assert!(string_list(&json!({ "s": [1] }), "s").is_err());
    }

    #[test]
    fn test_parse() {
        let args = json!({ "items": [1, 2, 3] });
        let items: Vec<u32> = parse(&args, "items").unwrap();
        assert_eq!(items, vec![1, 2, 3]);
        assert!(parse::<Vec<u32>>(&args, "other").is_err());
        assert_eq!(parse_opt::<Vec<u32>>(&args, "other").unwrap(), None);
    }
}
