//! Diagnostic rendering of values
//!
//! A narrow JSON-like formatter for violation messages. It is bounded in
//! depth and length and never fails: values nested past the depth bound
//! render as [`FALLBACK`], long output is truncated.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::value::{Fields, Scalar, Value, IDENTIFIER_KEY};

/// Placeholder for values that cannot be rendered
pub const FALLBACK: &str = "[unrenderable value]";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Deepest nesting rendered before falling back
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Output longer than this is cut and suffixed with `...`
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_max_depth() -> usize {
    16
}

fn default_max_length() -> usize {
    512
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_length: default_max_length(),
        }
    }
}

struct TooDeep;

/// Render a value for a diagnostic message
pub fn render_value(value: &Value, options: &RenderOptions) -> String {
    let mut out = String::new();
    if write_value(&mut out, value, 0, options).is_err() {
        return FALLBACK.to_string();
    }
    truncate(out, options.max_length)
}

fn truncate(mut out: String, max_length: usize) -> String {
    if out.len() <= max_length {
        return out;
    }
    let mut cut = max_length;
    while !out.is_char_boundary(cut) {
        cut -= 1;
    }
    out.truncate(cut);
    out.push_str("...");
    out
}

fn write_value(
    out: &mut String,
    value: &Value,
    depth: usize,
    options: &RenderOptions,
) -> Result<(), TooDeep> {
    if depth > options.max_depth {
        return Err(TooDeep);
    }

    match value {
        Value::Scalar(scalar) => write_scalar(out, scalar),
        Value::Enum(literal) => write_string(out, literal),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item, depth + 1, options)?;
                // no point rendering what truncation will drop
                if out.len() > options.max_length {
                    break;
                }
            }
            out.push(']');
        }
        Value::Concept(concept) => {
            write_object(out, &concept.type_name, None, &concept.fields, depth, options)?;
        }
        Value::Resource(resource) => {
            write_object(
                out,
                &resource.type_name,
                resource.identifier.as_deref(),
                &resource.fields,
                depth,
                options,
            )?;
        }
        Value::Relationship(relationship) => write_string(out, &relationship.to_uri()),
    }
    Ok(())
}

fn write_object(
    out: &mut String,
    type_name: &str,
    identifier: Option<&str>,
    fields: &Fields,
    depth: usize,
    options: &RenderOptions,
) -> Result<(), TooDeep> {
    out.push_str("{\"$class\":");
    write_string(out, type_name);
    if let Some(identifier) = identifier {
        out.push(',');
        write_string(out, IDENTIFIER_KEY);
        out.push(':');
        write_string(out, identifier);
    }
    for (key, value) in fields {
        if key == IDENTIFIER_KEY && identifier.is_some() {
            continue;
        }
        out.push(',');
        write_string(out, key);
        out.push(':');
        write_value(out, value, depth + 1, options)?;
        if out.len() > options.max_length {
            break;
        }
    }
    out.push('}');
    Ok(())
}

fn write_scalar(out: &mut String, scalar: &Scalar) {
    match scalar {
        Scalar::String(s) => write_string(out, s),
        Scalar::Integer(n) => {
            let _ = write!(out, "{n}");
        }
        Scalar::Double(n) if n.is_nan() => out.push_str("NaN"),
        Scalar::Double(n) if n.is_infinite() => {
            out.push_str(if *n > 0.0 { "Infinity" } else { "-Infinity" });
        }
        Scalar::Double(n) => {
            let _ = write!(out, "{n}");
        }
        Scalar::Boolean(b) => {
            let _ = write!(out, "{b}");
        }
        Scalar::DateTime(dt) => write_string(out, &dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
    }
}

fn write_string(out: &mut String, s: &str) {
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str(FALLBACK),
    }
}
