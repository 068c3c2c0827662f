use serde_json::Value;

use crate::error::{Error, Result};

const MAX_FORM_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_COMMENT_LEN: usize = 2000;

/// Upper bound on a serialized form schema.
pub const MAX_SCHEMA_BYTES: usize = 256 * 1024;
/// Upper bound on serialized response data.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

fn invalid(message: String) -> Error {
    Error::InvalidArgument(message)
}

pub fn validate_form_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("Form name cannot be empty".to_string()));
    }
    if trimmed.len() != name.len() {
        return Err(invalid(
            "Form name cannot start or end with whitespace".to_string(),
        ));
    }
    if name.chars().count() > MAX_FORM_NAME_LEN {
        return Err(invalid(format!(
            "Form name cannot exceed {MAX_FORM_NAME_LEN} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid(
            "Form name cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_description(description: Option<&str>) -> Result<()> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(invalid(format!(
            "Description cannot exceed {MAX_DESCRIPTION_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

pub fn validate_comment(comment: Option<&str>) -> Result<()> {
    match comment {
        Some(c) if c.chars().count() > MAX_COMMENT_LEN => Err(invalid(format!(
            "Comment cannot exceed {MAX_COMMENT_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

fn validate_json_size(value: &Value, what: &str, max_bytes: usize) -> Result<()> {
    let size = serde_json::to_vec(value)
        .map_err(|e| invalid(format!("{what} is not serializable: {e}")))?
        .len();
    if size > max_bytes {
        return Err(invalid(format!("{what} cannot exceed {max_bytes} bytes")));
    }
    Ok(())
}

/// Schemas are opaque, but must be a JSON object or array within the size bound.
pub fn validate_schema(schema: &Value) -> Result<()> {
    if !(schema.is_object() || schema.is_array()) {
        return Err(invalid(
            "Form schema must be a JSON object or array".to_string(),
        ));
    }
    validate_json_size(schema, "Form schema", MAX_SCHEMA_BYTES)
}

pub fn validate_response_data(data: &Value) -> Result<()> {
    validate_json_size(data, "Response data", MAX_RESPONSE_BYTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_name_rules() {
        assert!(validate_form_name("Vendor Intake").is_ok());
        assert!(validate_form_name("").is_err());
        assert!(validate_form_name("   ").is_err());
        assert!(validate_form_name(" padded").is_err());
        assert!(validate_form_name("tab\tname").is_err());
        assert!(validate_form_name(&"x".repeat(MAX_FORM_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_schema_must_be_structured_and_bounded() {
        assert!(validate_schema(&json!({"fields": []})).is_ok());
        assert!(validate_schema(&json!([])).is_ok());
        assert!(validate_schema(&json!("text")).is_err());

        let huge = json!({ "blob": "x".repeat(MAX_SCHEMA_BYTES) });
        assert!(matches!(
            validate_schema(&huge),
            Err(Error::InvalidArgument(_))
        ));
    }
}
