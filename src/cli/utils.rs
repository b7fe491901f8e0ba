use serde_json::{json, Value};

use crate::cli::client::ClientResponse;
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print a server reply: the raw body for JSON output, a readable summary otherwise
pub fn output_response(output_format: &OutputFormat, response: &ClientResponse) -> anyhow::Result<()> {
    if let OutputFormat::Json = output_format {
        println!("{}", serde_json::to_string_pretty(&response.body)?);
        return Ok(());
    }

    if response.is_success() {
        match &response.body {
            Value::Array(items) if items.is_empty() => println!("No students found"),
            Value::Array(items) => {
                for item in items {
                    println!("{}", describe_student(item));
                }
            }
            Value::Object(map) if map.contains_key("msg") => {
                println!("✓ {}", map["msg"].as_str().unwrap_or_default());
            }
            other => println!("{}", describe_student(other)),
        }
        return Ok(());
    }

    match response.body.get("message").and_then(Value::as_str) {
        Some(message) => output_error(
            output_format,
            message,
            response.body.get("code").and_then(Value::as_str),
        ),
        None => {
            // Field errors: {"field": ["message", ...]}
            eprintln!("Request rejected ({}):", response.status);
            if let Value::Object(fields) = &response.body {
                for (field, messages) in fields {
                    for message in messages.as_array().into_iter().flatten() {
                        eprintln!("  {}: {}", field, message.as_str().unwrap_or_default());
                    }
                }
            }
            Ok(())
        }
    }
}

fn describe_student(value: &Value) -> String {
    let text = |key: &str| {
        value
            .get(key)
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .unwrap_or_default()
    };
    format!("{} (roll {}) - {}", text("name"), text("roll"), text("city"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_student_rows() {
        let row = json!({"name": "rahim", "roll": 10, "city": "lahore"});
        assert_eq!(describe_student(&row), "rahim (roll 10) - lahore");
    }
}
