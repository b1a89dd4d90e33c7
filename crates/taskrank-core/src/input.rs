//! Task list parsing.
//!
//! Accepts either one task per line or a JSON array of strings. Input that
//! starts with `[` is always treated as JSON.

use crate::error::ValidationError;

/// Parse free-form text into a list of tasks.
///
/// # Errors
///
/// - [`ValidationError::EmptyBatch`] if no non-blank task remains
/// - [`ValidationError::InvalidJson`] if the input looks like a JSON array
///   but does not parse
/// - [`ValidationError::InvalidValue`] if a JSON element is not a string
pub fn parse_task_input(text: &str) -> Result<Vec<String>, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }

    let tasks = if trimmed.starts_with('[') {
        parse_json_array(trimmed)?
    } else {
        trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    };

    if tasks.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }
    Ok(tasks)
}

fn parse_json_array(text: &str) -> Result<Vec<String>, ValidationError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(text).map_err(|e| ValidationError::InvalidJson(e.to_string()))?;

    let mut tasks = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match value {
            serde_json::Value::String(s) if s.trim().is_empty() => {}
            serde_json::Value::String(s) => tasks.push(s),
            other => {
                return Err(ValidationError::InvalidValue {
                    field: format!("tasks[{index}]"),
                    message: format!("expected a string, got {other}"),
                })
            }
        }
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_trimmed_and_blank_lines_dropped() {
        let tasks = parse_task_input("  Finish report \n\n\tBuy groceries\n   \n").unwrap();
        assert_eq!(tasks, vec!["Finish report", "Buy groceries"]);
    }

    #[test]
    fn test_windows_line_endings() {
        let tasks = parse_task_input("a\r\nb\r\n").unwrap();
        assert_eq!(tasks, vec!["a", "b"]);
    }

    #[test]
    fn test_json_array() {
        let tasks = parse_task_input(r#"["Write report", "Call client"]"#).unwrap();
        assert_eq!(tasks, vec!["Write report", "Call client"]);
    }

    #[test]
    fn test_json_array_keeps_inner_whitespace_and_drops_blank() {
        let tasks = parse_task_input(r#"[" padded ", ""]"#).unwrap();
        assert_eq!(tasks, vec![" padded "]);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = parse_task_input(r#"["unterminated"#).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidJson(_)));
    }

    #[test]
    fn test_non_string_element_rejected() {
        let err = parse_task_input(r#"["ok", 42]"#).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidValue {
                field: "tasks[1]".to_string(),
                message: "expected a string, got 42".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert_eq!(parse_task_input(""), Err(ValidationError::EmptyBatch));
        assert_eq!(parse_task_input("  \n \n"), Err(ValidationError::EmptyBatch));
        assert_eq!(parse_task_input("[]"), Err(ValidationError::EmptyBatch));
        assert_eq!(parse_task_input(r#"["  "]"#), Err(ValidationError::EmptyBatch));
    }
}
