//! Validation walk
//!
//! Recursive descent over a payload, driven by the schema structure.
//! Options resolve per node: library defaults, overridden by the caller's
//! defaults, overridden by each schema's own option bag on the way down.
//! The walk never mutates the payload; coerced values are built into a
//! fresh output value.

use serde_json::{Map, Number, Value};

use super::errors::{SchemaErrorRef, ValidationDetail, ValidationFailure};
use super::types::{EffectiveOptions, Schema, SchemaKind, SchemaOptions};

impl Schema {
    /// Validates a payload, returning the validated (and possibly coerced)
    /// value or a structured failure.
    ///
    /// `defaults` are the caller's validation options; keys set on this
    /// schema (or any nested schema) always win over them.
    pub fn validate(&self, payload: &Value, defaults: &SchemaOptions) -> Result<Value, ValidationFailure> {
        let base = EffectiveOptions::LIBRARY_DEFAULTS.overridden_by(defaults);
        let mut walk = Walk::default();

        if payload.is_null() {
            if self.required {
                walk.details
                    .push(ValidationDetail::new("value", "\"value\" is required"));
                return Err(walk.into_failure());
            }
            return Ok(Value::Null);
        }

        match walk.check(self, payload, "", base) {
            Some(value) if walk.details.is_empty() => Ok(value),
            _ => Err(walk.into_failure()),
        }
    }
}

/// Accumulated state of one validation pass.
#[derive(Default)]
struct Walk {
    details: Vec<ValidationDetail>,
    custom: Option<SchemaErrorRef>,
}

impl Walk {
    fn into_failure(self) -> ValidationFailure {
        ValidationFailure {
            details: self.details,
            custom: self.custom,
        }
    }

    fn fail(&mut self, path: &str, message: String) {
        self.details.push(ValidationDetail::new(label(path), message));
    }

    /// Validates one schema node. Returns the coerced value on success,
    /// `None` on failure (details have been recorded).
    fn check(&mut self, schema: &Schema, value: &Value, path: &str, parent: EffectiveOptions) -> Option<Value> {
        let eff = parent.overridden_by(&schema.options);
        let before = self.details.len();

        let mut out = self.check_kind(schema, value, path, eff);

        // Allowed-values restriction applies to the coerced value.
        if let Some(coerced) = &out {
            if !schema.allowed.is_empty() && !schema.allowed.contains(coerced) {
                self.fail(path, allowed_message(path, &schema.allowed));
                out = None;
            }
        }

        // A custom error configured on this node covers failures anywhere
        // beneath it; the outermost configured node wins.
        if self.details.len() > before {
            if self.custom.is_none() {
                if let Some(err) = &schema.custom_error {
                    self.custom = Some(err.clone());
                }
            }
        }

        out
    }

    fn check_kind(&mut self, schema: &Schema, value: &Value, path: &str, eff: EffectiveOptions) -> Option<Value> {
        match &schema.kind {
            SchemaKind::Any => Some(value.clone()),
            SchemaKind::String {
                pattern,
                min_length,
                max_length,
            } => self.check_string(value, path, pattern, *min_length, *max_length),
            SchemaKind::Number { integer, min, max } => {
                self.check_number(value, path, *integer, *min, *max, eff)
            }
            SchemaKind::Boolean => self.check_boolean(value, path, eff),
            SchemaKind::Object { keys } => self.check_object(value, path, keys, eff),
            SchemaKind::Array {
                items,
                min_items,
                max_items,
            } => self.check_array(value, path, items.as_deref(), *min_items, *max_items, eff),
            SchemaKind::Alternatives { branches } => {
                self.check_alternatives(value, path, branches, eff)
            }
        }
    }

    fn check_string(
        &mut self,
        value: &Value,
        path: &str,
        pattern: &Option<regex::Regex>,
        min_length: Option<usize>,
        max_length: Option<usize>,
    ) -> Option<Value> {
        let s = match value {
            Value::String(s) => s,
            _ => {
                self.fail(path, format!("\"{}\" must be a string", label(path)));
                return None;
            }
        };

        let before = self.details.len();
        if let Some(re) = pattern {
            if !re.is_match(s) {
                self.fail(
                    path,
                    format!(
                        "\"{}\" with value \"{}\" fails to match the required pattern",
                        label(path),
                        s
                    ),
                );
            }
        }
        if let Some(min) = min_length {
            if s.chars().count() < min {
                self.fail(
                    path,
                    format!(
                        "\"{}\" length must be at least {} characters long",
                        label(path),
                        min
                    ),
                );
            }
        }
        if let Some(max) = max_length {
            if s.chars().count() > max {
                self.fail(
                    path,
                    format!(
                        "\"{}\" length must be less than or equal to {} characters long",
                        label(path),
                        max
                    ),
                );
            }
        }

        if self.details.len() > before {
            None
        } else {
            Some(value.clone())
        }
    }

    fn check_number(
        &mut self,
        value: &Value,
        path: &str,
        integer: bool,
        min: Option<f64>,
        max: Option<f64>,
        eff: EffectiveOptions,
    ) -> Option<Value> {
        let coerced = match value {
            Value::Number(_) => value.clone(),
            Value::String(s) if eff.convert => match parse_number(s, integer) {
                Some(n) => Value::Number(n),
                None => {
                    self.fail(path, format!("\"{}\" must be a number", label(path)));
                    return None;
                }
            },
            _ => {
                self.fail(path, format!("\"{}\" must be a number", label(path)));
                return None;
            }
        };

        let n = match &coerced {
            Value::Number(n) => n.clone(),
            _ => unreachable!(),
        };

        if integer && !n.is_i64() && !n.is_u64() {
            self.fail(path, format!("\"{}\" must be an integer", label(path)));
            return None;
        }

        let before = self.details.len();
        let as_f64 = n.as_f64().unwrap_or(f64::NAN);
        if let Some(min) = min {
            if as_f64 < min {
                self.fail(
                    path,
                    format!(
                        "\"{}\" must be greater than or equal to {}",
                        label(path),
                        min
                    ),
                );
            }
        }
        if let Some(max) = max {
            if as_f64 > max {
                self.fail(
                    path,
                    format!("\"{}\" must be less than or equal to {}", label(path), max),
                );
            }
        }

        if self.details.len() > before {
            None
        } else {
            Some(coerced)
        }
    }

    fn check_boolean(&mut self, value: &Value, path: &str, eff: EffectiveOptions) -> Option<Value> {
        match value {
            Value::Bool(_) => Some(value.clone()),
            Value::String(s) if eff.convert && s == "true" => Some(Value::Bool(true)),
            Value::String(s) if eff.convert && s == "false" => Some(Value::Bool(false)),
            _ => {
                self.fail(path, format!("\"{}\" must be a boolean", label(path)));
                None
            }
        }
    }

    fn check_object(
        &mut self,
        value: &Value,
        path: &str,
        keys: &[(String, Schema)],
        eff: EffectiveOptions,
    ) -> Option<Value> {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => {
                self.fail(path, format!("\"{}\" must be of type object", label(path)));
                return None;
            }
        };

        let before = self.details.len();
        let mut out = Map::new();

        for (name, child) in keys {
            let child_path = make_path(path, name);
            match obj.get(name) {
                Some(child_value) => {
                    if let Some(coerced) = self.check(child, child_value, &child_path, eff) {
                        out.insert(name.clone(), coerced);
                    }
                }
                None => {
                    if child.required {
                        self.fail(&child_path, format!("\"{}\" is required", child_path));
                    }
                }
            }
            if eff.abort_early && self.details.len() > before {
                return None;
            }
        }

        for (name, child_value) in obj {
            if keys.iter().any(|(k, _)| k == name) {
                continue;
            }
            if eff.allow_unknown {
                out.insert(name.clone(), child_value.clone());
            } else {
                let child_path = make_path(path, name);
                self.fail(&child_path, format!("\"{}\" is not allowed", child_path));
                if eff.abort_early {
                    return None;
                }
            }
        }

        if self.details.len() > before {
            None
        } else {
            Some(Value::Object(out))
        }
    }

    fn check_array(
        &mut self,
        value: &Value,
        path: &str,
        items: Option<&Schema>,
        min_items: Option<usize>,
        max_items: Option<usize>,
        eff: EffectiveOptions,
    ) -> Option<Value> {
        let arr = match value.as_array() {
            Some(arr) => arr,
            None => {
                self.fail(path, format!("\"{}\" must be an array", label(path)));
                return None;
            }
        };

        let before = self.details.len();
        if let Some(min) = min_items {
            if arr.len() < min {
                self.fail(
                    path,
                    format!("\"{}\" must contain at least {} items", label(path), min),
                );
            }
        }
        if let Some(max) = max_items {
            if arr.len() > max {
                self.fail(
                    path,
                    format!("\"{}\" must contain less than or equal to {} items", label(path), max),
                );
            }
        }

        let mut out = Vec::with_capacity(arr.len());
        for (i, element) in arr.iter().enumerate() {
            let element_path = format!("{}[{}]", path, i);
            match items {
                Some(item_schema) => {
                    if let Some(coerced) = self.check(item_schema, element, &element_path, eff) {
                        out.push(coerced);
                    }
                }
                None => out.push(element.clone()),
            }
            if eff.abort_early && self.details.len() > before {
                return None;
            }
        }

        if self.details.len() > before {
            None
        } else {
            Some(Value::Array(out))
        }
    }

    fn check_alternatives(
        &mut self,
        value: &Value,
        path: &str,
        branches: &[Schema],
        eff: EffectiveOptions,
    ) -> Option<Value> {
        for branch in branches {
            let mut scratch = Walk::default();
            if let Some(coerced) = scratch.check(branch, value, path, eff) {
                if scratch.details.is_empty() {
                    return Some(coerced);
                }
            }
        }
        self.fail(
            path,
            format!("\"{}\" does not match any of the allowed types", label(path)),
        );
        None
    }
}

/// Joins a field path segment onto a prefix.
fn make_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Message label for a path; the payload root is addressed as "value".
fn label(path: &str) -> &str {
    if path.is_empty() {
        "value"
    } else {
        path
    }
}

fn parse_number(s: &str, integer: bool) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    if integer {
        return None;
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn allowed_message(path: &str, allowed: &[Value]) -> String {
    let rendered: Vec<String> = allowed
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    if rendered.len() == 1 {
        format!("\"{}\" must be [{}]", label(path), rendered[0])
    } else {
        format!("\"{}\" must be one of [{}]", label(path), rendered.join(", "))
    }
}
