//! Canonical JSON rendering for fingerprinting.
//!
//! Produces a compact, whitespace-free JSON string in which object keys are
//! sorted, so that two values that are equal as JSON (ignoring key insertion
//! order) always render to the same string.
//!
//! Numbers keep their exact text, except that every spelling of the same
//! floating point value (`1.0`, `1.00`, `10e-1`) renders identically.
//! Integers and floats stay distinct: `1` and `1.0` are different values.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::CanonicalizationError;

/// Default maximum nesting depth accepted by the canonicalizer.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Renders values into their canonical string form.
#[derive(Debug, Clone, Copy)]
pub struct Canonicalizer {
    max_depth: usize,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Canonicalizer {
    /// Creates a canonicalizer that rejects values nested deeper than `max_depth`.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Returns the configured maximum nesting depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Canonicalizes any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::Unserializable`] if the value has no
    /// JSON representation (for example a map with non-string keys), and
    /// [`CanonicalizationError::DepthExceeded`] if it is nested too deeply.
    pub fn canonicalize<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<String, CanonicalizationError> {
        let value = serde_json::to_value(value)?;
        self.canonicalize_value(&value)
    }

    /// Canonicalizes an already-parsed JSON value.
    pub fn canonicalize_value(&self, value: &Value) -> Result<String, CanonicalizationError> {
        let mut out = String::new();
        self.write_value(value, 0, &mut out)?;
        Ok(out)
    }

    fn write_value(
        &self,
        value: &Value,
        depth: usize,
        out: &mut String,
    ) -> Result<(), CanonicalizationError> {
        if depth > self.max_depth {
            return Err(CanonicalizationError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        match value {
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));

                out.push('{');
                for (i, (key, child)) in entries.into_iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&serde_json::to_string(key)?);
                    out.push(':');
                    self.write_value(child, depth + 1, out)?;
                }
                out.push('}');
            }
            Value::Array(items) => {
                out.push('[');
                for (i, child) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write_value(child, depth + 1, out)?;
                }
                out.push(']');
            }
            Value::Number(number) => write_number(number, out)?,
            scalar => out.push_str(&serde_json::to_string(scalar)?),
        }

        Ok(())
    }
}

fn write_number(number: &Number, out: &mut String) -> Result<(), CanonicalizationError> {
    if let Some(n) = number.as_i64() {
        out.push_str(&n.to_string());
        return Ok(());
    }
    if let Some(n) = number.as_u64() {
        out.push_str(&n.to_string());
        return Ok(());
    }

    let text = number.to_string();
    if !text.contains(['.', 'e', 'E']) {
        // Integer beyond 64 bits, kept digit for digit
        out.push_str(&text);
        return Ok(());
    }

    match number.as_f64() {
        Some(float) => out.push_str(&serde_json::to_string(&float)?),
        None => out.push_str(&text),
    }
    Ok(())
}

/// Canonicalizes a value with the default depth limit.
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<String, CanonicalizationError> {
    Canonicalizer::default().canonicalize(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_sorts_object_keys() {
        let value = json!({"b": 1, "a": {"d": true, "c": null}});
        assert_eq!(
            canonicalize(&value).unwrap(),
            r#"{"a":{"c":null,"d":true},"b":1}"#
        );
    }

    #[test]
    fn test_key_order_is_irrelevant() {
        let first: Value = serde_json::from_str(r#"{"x": [1, 2], "y": {"p": "q", "r": "s"}}"#).unwrap();
        let second: Value =
            serde_json::from_str("{\n  \"y\": {\"r\": \"s\", \"p\": \"q\"},\n  \"x\": [1,2]\n}").unwrap();
        assert_eq!(canonicalize(&first).unwrap(), canonicalize(&second).unwrap());
    }

    #[test]
    fn test_array_order_is_significant() {
        let a = canonicalize(&json!([1, 2])).unwrap();
        let b = canonicalize(&json!([2, 1])).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_scalar_types_are_distinguished() {
        let rendered: Vec<String> = [json!(1), json!("1"), json!(true), json!(null), json!(1.5)]
            .iter()
            .map(|v| canonicalize(v).unwrap())
            .collect();
        assert_eq!(rendered, vec!["1", "\"1\"", "true", "null", "1.5"]);
    }

    #[test]
    fn test_large_integers_keep_every_digit() {
        let a: Value = serde_json::from_str("123456789012345678901234567890").unwrap();
        let b: Value = serde_json::from_str("123456789012345678901234567891").unwrap();

        assert_eq!(canonicalize(&a).unwrap(), "123456789012345678901234567890");
        assert_ne!(canonicalize(&a).unwrap(), canonicalize(&b).unwrap());
    }

    #[test]
    fn test_float_spellings_render_identically() {
        let spellings = ["1.0", "1.00", "10e-1", "0.1e1"];
        let rendered: Vec<String> = spellings
            .iter()
            .map(|s| canonicalize(&serde_json::from_str::<Value>(s).unwrap()).unwrap())
            .collect();
        assert!(rendered.iter().all(|r| r == &rendered[0]), "{rendered:?}");

        let integer: Value = serde_json::from_str("1").unwrap();
        assert_ne!(canonicalize(&integer).unwrap(), rendered[0]);
    }

    #[test]
    fn test_negative_zero_integer_matches_zero() {
        let zero: Value = serde_json::from_str("0").unwrap();
        let negative: Value = serde_json::from_str("-0").unwrap();
        assert_eq!(canonicalize(&zero).unwrap(), canonicalize(&negative).unwrap());
    }

    #[test]
    fn test_escapes_strings_and_keys() {
        let value = json!({"quote\"key": "line\nbreak"});
        assert_eq!(
            canonicalize(&value).unwrap(),
            r#"{"quote\"key":"line\nbreak"}"#
        );
    }

    #[test]
    fn test_non_string_map_keys_are_rejected() {
        let mut map: HashMap<(i32, i32), i32> = HashMap::new();
        map.insert((1, 2), 3);
        let result = canonicalize(&map);
        assert!(matches!(
            result,
            Err(CanonicalizationError::Unserializable(_))
        ));
    }

    #[test]
    fn test_depth_limit() {
        let canonicalizer = Canonicalizer::new(2);
        assert!(canonicalizer.canonicalize(&json!([[1]])).is_ok());

        let result = canonicalizer.canonicalize(&json!([[[1]]]));
        assert!(matches!(
            result,
            Err(CanonicalizationError::DepthExceeded { limit: 2 })
        ));
    }
}
