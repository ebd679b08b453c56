//! Decode LLM output into a target value

use crate::error::AttemptFailure;
use serde::de::DeserializeOwned;

/// Decode a model reply into `T`
///
/// Markdown code fences around the JSON are tolerated.
pub(crate) fn decode_response<T: DeserializeOwned>(response: &str) -> Result<T, AttemptFailure> {
    let json = extract_json(response)?;
    serde_json::from_str(json).map_err(|e| AttemptFailure::Decode(e.to_string()))
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<&str, AttemptFailure> {
    let trimmed = response.trim();

    // Models sometimes wrap JSON in ```json ... ``` even in JSON mode
    let Some(fenced) = trimmed.strip_prefix("```") else {
        return Ok(trimmed);
    };

    // Skip the opening line (``` or ```json)
    let (_, body) = fenced
        .split_once('\n')
        .ok_or_else(|| AttemptFailure::Decode("Empty code block".to_string()))?;

    Ok(body.trim_end().strip_suffix("```").unwrap_or(body).trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use moneysaver_domain::TransactionView;

    #[test]
    fn test_decode_plain_json() {
        let view: TransactionView = decode_response(
            r#"{"transaction_type":"expense","amount":12,"item":{"name":"lunch","description":"","category":"food"}}"#,
        )
        .unwrap();
        assert_eq!(view.amount, 12);
        assert_eq!(view.item.unwrap().name, "lunch");
    }

    #[test]
    fn test_decode_json_with_markdown_wrapper() {
        let response = r#"```json
{"transaction_type": "revenue", "amount": 500}
```"#;
        let view: TransactionView = decode_response(response).unwrap();
        assert_eq!(view.transaction_type, "revenue");
        assert_eq!(view.amount, 500);
    }

    #[test]
    fn test_decode_invalid_json() {
        let result = decode_response::<TransactionView>("This is not JSON");
        assert!(matches!(result, Err(AttemptFailure::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_field_type() {
        let result = decode_response::<TransactionView>(r#"{"amount": "twelve"}"#);
        let Err(AttemptFailure::Decode(message)) = result else {
            panic!("expected decode failure");
        };
        assert!(message.contains("invalid type"));
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }

    #[test]
    fn test_extract_json_from_markdown() {
        let response = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response).unwrap(), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_json_from_markdown_without_language() {
        let response = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response).unwrap(), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_json_single_line_fence() {
        assert!(extract_json("```").is_err());
    }
}
