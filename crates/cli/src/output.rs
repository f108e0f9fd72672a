//! Command result envelope and rendering.

use std::time::Instant;

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable key/value text
	#[default]
	Text,
	/// Pretty JSON envelope
	Json,
}

/// The result envelope printed by every command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
}

/// Builder for constructing command results.
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	start_time: Instant,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			start_time: Instant::now(),
		}
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		CommandResult {
			ok: self.data.is_some(),
			command: self.command,
			data: self.data,
			duration_ms: Some(self.start_time.elapsed().as_millis() as u64),
		}
	}
}

pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => match serde_json::to_string_pretty(result) {
			Ok(json) => println!("{json}"),
			Err(err) => eprintln!("failed to serialize result: {err}"),
		},
		OutputFormat::Text => {
			let data = result.data.as_ref().and_then(|data| serde_json::to_value(data).ok()).unwrap_or(Value::Null);
			let mut lines = Vec::new();
			render_text(&data, "", &mut lines);
			for (key, value) in lines {
				if key.is_empty() {
					println!("{value}");
				} else {
					println!("{} {}", format!("{key}:").bold(), value);
				}
			}
		}
	}
}

/// Flattens nested objects into dotted keys.
fn render_text(value: &Value, prefix: &str, lines: &mut Vec<(String, String)>) {
	match value {
		Value::Object(map) if !map.is_empty() => {
			for (key, child) in map {
				let key = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
				render_text(child, &key, lines);
			}
		}
		Value::Array(items) if !items.is_empty() => {
			for (index, child) in items.iter().enumerate() {
				render_text(child, &format!("{prefix}[{index}]"), lines);
			}
		}
		Value::Null => lines.push((prefix.to_string(), "-".dimmed().to_string())),
		Value::String(s) => lines.push((prefix.to_string(), s.clone())),
		other => lines.push((prefix.to_string(), other.to_string())),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn text_rendering_flattens_nested_keys() {
		colored::control::set_override(false);
		let mut lines = Vec::new();
		render_text(
			&json!({ "state": "fallback", "decision": { "mode": "fallback", "url": null }, "names": ["a", "b"] }),
			"",
			&mut lines,
		);
		assert!(lines.contains(&("state".into(), "fallback".into())));
		assert!(lines.contains(&("decision.mode".into(), "fallback".into())));
		assert!(lines.contains(&("decision.url".into(), "-".into())));
		assert!(lines.contains(&("names[1]".into(), "b".into())));
	}

	#[test]
	fn result_without_data_is_not_ok() {
		let result = ResultBuilder::<Value>::new("status").build();
		assert!(!result.ok);
		let result = ResultBuilder::new("status").data(json!({})).build();
		assert!(result.ok);
	}
}
