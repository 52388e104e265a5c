use anyhow::Result;
use bat::{PrettyPrinter, WrappingMode};
use serde_json::Value;

const THEME: &str = "zenburn";

/// Print a reply from the Cat as markdown
pub fn markdown(content: &str) -> Result<()> {
    print(content, "Markdown")
}

/// Pretty print any endpoint output as JSON
pub fn json<T: serde::Serialize>(output: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(output)?;
    print(&text, "JSON")
}

fn print(content: &str, language: &str) -> Result<()> {
    PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(THEME)
        .language(language)
        .wrapping_mode(WrappingMode::Character)
        .print()?;
    println!();
    Ok(())
}

/// Short status line for a frame that arrives before the reply
pub fn frame_status(frame: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(frame) else {
        return "awaiting reply".to_string();
    };

    match value.get("type").and_then(Value::as_str) {
        Some("notification") => value
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or("working")
            .to_string(),
        Some("chat_token") => "typing...".to_string(),
        Some("error") => format!(
            "error: {}",
            value
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
        ),
        Some(other) => other.to_string(),
        None => "awaiting reply".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_status() {
        assert_eq!(
            frame_status(r#"{"type": "notification", "content": "Searching memory"}"#),
            "Searching memory"
        );
        assert_eq!(frame_status(r#"{"type": "chat_token", "content": "Me"}"#), "typing...");
        assert_eq!(
            frame_status(r#"{"type": "error", "description": "boom"}"#),
            "error: boom"
        );
        assert_eq!(frame_status("not json"), "awaiting reply");
    }
}
