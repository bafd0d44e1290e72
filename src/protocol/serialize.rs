//! Serialization layer - convert deltas to/from the positional NDJSON form

use crate::delta::{Delta, InsertPayload, Op, OpKind, RetainPayload};
use crate::error::{DeltaError, Result};
use serde_json::Value;

/// Tag marking a retain run
const RETAIN_TAG: u64 = 2;

/// Tag marking a delete run
const DELETE_TAG: u64 = 3;

/// Encode a delta, one run per line
///
/// # Example
///
/// ```rust
/// use deltakit_core::{protocol, Delta};
///
/// let delta = Delta::builder().retain(2).insert("x").delete(1).build();
/// assert_eq!(protocol::stringify(&delta), "[2,2]\n[\"x\"]\n[1,3]");
/// ```
pub fn stringify(delta: &Delta) -> String {
    delta
        .ops()
        .iter()
        .map(|op| encode_op(op).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode the line-per-run form; blank lines are skipped
///
/// # Errors
///
/// [`DeltaError::Parse`] naming the 1-based line of the first bad run.
pub fn parse(input: &str) -> Result<Delta> {
    let mut builder = Delta::builder();
    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parse_error = |reason: String| DeltaError::Parse(format!("line {}: {}", index + 1, reason));

        let value: Value = serde_json::from_str(line).map_err(|err| parse_error(err.to_string()))?;
        let op = decode_op(&value).map_err(parse_error)?;
        builder.push(op);
    }
    Ok(builder.build())
}

fn encode_op(op: &Op) -> Value {
    let mut run = Vec::with_capacity(3);
    match &op.kind {
        OpKind::Insert(payload) => {
            run.push(encode_insert(payload));
            if let Some(attributes) = &op.attributes {
                run.push(Value::Object(attributes.clone()));
            }
        }
        OpKind::Retain(payload) => {
            run.push(match payload {
                RetainPayload::Count(count) => Value::from(*count),
                RetainPayload::Delta(delta) => encode_delta(delta),
            });
            if let Some(attributes) = &op.attributes {
                run.push(Value::Object(attributes.clone()));
            }
            run.push(Value::from(RETAIN_TAG));
        }
        OpKind::Delete(length) => {
            run.push(Value::from(*length));
            run.push(Value::from(DELETE_TAG));
        }
    }
    Value::Array(run)
}

fn encode_insert(payload: &InsertPayload) -> Value {
    match payload {
        InsertPayload::Text(text) => Value::from(text.as_str()),
        InsertPayload::Embed(count) => Value::from(*count),
        InsertPayload::Delta(delta) => encode_delta(delta),
    }
}

fn encode_delta(delta: &Delta) -> Value {
    Value::Array(delta.ops().iter().map(encode_op).collect())
}

fn decode_op(value: &Value) -> std::result::Result<Op, String> {
    let run = value
        .as_array()
        .ok_or_else(|| format!("expected a run array, got {}", value))?;

    match run.as_slice() {
        [payload] => Ok(Op::insert(decode_insert(payload)?)),
        [payload, Value::Object(attributes)] => {
            Ok(Op::insert(decode_insert(payload)?).with_attributes(Some(attributes.clone())))
        }
        [payload, tag] if tag.as_u64() == Some(RETAIN_TAG) => Ok(Op::retain(decode_retain(payload)?)),
        [length, tag] if tag.as_u64() == Some(DELETE_TAG) => {
            let length = decode_count(length)?;
            Ok(Op::delete(length))
        }
        [_, tag] => Err(format!("invalid run tag {}", tag)),
        [payload, Value::Object(attributes), tag] if tag.as_u64() == Some(RETAIN_TAG) => {
            Ok(Op::retain(decode_retain(payload)?).with_attributes(Some(attributes.clone())))
        }
        [_, _, tag] => Err(format!("invalid attributed run tag {}", tag)),
        _ => Err(format!("run array of length {}", run.len())),
    }
}

fn decode_insert(payload: &Value) -> std::result::Result<InsertPayload, String> {
    match payload {
        Value::String(text) => Ok(InsertPayload::Text(text.clone())),
        Value::Number(_) => Ok(InsertPayload::Embed(decode_count(payload)?)),
        Value::Array(runs) => Ok(InsertPayload::Delta(decode_nested(runs)?)),
        other => Err(format!("invalid insert payload {}", other)),
    }
}

fn decode_retain(payload: &Value) -> std::result::Result<RetainPayload, String> {
    match payload {
        Value::Number(_) => Ok(RetainPayload::Count(decode_count(payload)?)),
        Value::Array(runs) => Ok(RetainPayload::Delta(decode_nested(runs)?)),
        other => Err(format!("invalid retain payload {}", other)),
    }
}

fn decode_count(value: &Value) -> std::result::Result<usize, String> {
    value
        .as_u64()
        .and_then(|count| usize::try_from(count).ok())
        .ok_or_else(|| format!("expected a non-negative length, got {}", value))
}

fn decode_nested(runs: &[Value]) -> std::result::Result<Delta, String> {
    let mut builder = Delta::builder();
    for run in runs {
        let op = decode_op(run).map_err(|reason| format!("nested run: {}", reason))?;
        builder.push(op);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::AttributeMap;
    use serde_json::json;

    fn attrs(value: Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    fn round_trip(delta: &Delta) -> Delta {
        parse(&stringify(delta)).unwrap()
    }

    #[test]
    fn test_insert_number() {
        let delta = Delta::builder().insert(2).build();
        assert_eq!(stringify(&delta), "[2]");
        assert_eq!(round_trip(&delta), delta);
    }

    #[test]
    fn test_insert_number_with_attributes() {
        let delta = Delta::builder().insert_with(2, attrs(json!({"a": "a"}))).build();
        assert_eq!(stringify(&delta), r#"[2,{"a":"a"}]"#);
        assert_eq!(round_trip(&delta), delta);
    }

    #[test]
    fn test_insert_string() {
        let delta = Delta::builder().insert("abc").build();
        assert_eq!(round_trip(&delta), delta);
    }

    #[test]
    fn test_insert_string_with_attributes() {
        let delta = Delta::builder().insert_with("abc", attrs(json!({"a": "a"}))).build();
        assert_eq!(round_trip(&delta), delta);
    }

    #[test]
    fn test_insert_delta() {
        let delta = Delta::builder().insert(Delta::builder().insert(3).build()).build();
        assert_eq!(stringify(&delta), "[[[3]]]");
        assert_eq!(round_trip(&delta), delta);
    }

    #[test]
    fn test_insert_delta_with_attributes() {
        let delta = Delta::builder()
            .insert_with(Delta::builder().insert(3).build(), attrs(json!({"a": "a"})))
            .build();
        assert_eq!(round_trip(&delta), delta);
    }

    #[test]
    fn test_retain_number_with_attributes() {
        let delta = Delta::builder().retain_with(2, attrs(json!({"a": "a"}))).build();
        assert_eq!(stringify(&delta), r#"[2,{"a":"a"},2]"#);
        assert_eq!(round_trip(&delta), delta);
    }

    #[test]
    fn test_retain_delta() {
        let inner = Delta::builder().retain_with(3, attrs(json!({"b": 1}))).build();
        let delta = Delta::builder().retain(inner.clone()).build();
        assert_eq!(round_trip(&delta), delta);

        let delta = Delta::builder().retain_with(inner, attrs(json!({"a": "a"}))).build();
        assert_eq!(round_trip(&delta), delta);
    }

    #[test]
    fn test_delete_number() {
        let delta = Delta::builder().delete(2).build();
        assert_eq!(stringify(&delta), "[2,3]");
        assert_eq!(round_trip(&delta), delta);
    }

    #[test]
    fn test_empty_delta() {
        assert_eq!(stringify(&Delta::new()), "");
        assert_eq!(parse("").unwrap(), Delta::new());
        assert_eq!(parse("\n\n").unwrap(), Delta::new());
    }

    #[test]
    fn test_keys_are_not_encoded() {
        let delta = Delta::builder().insert_keyed(1, None, 9).build();
        assert_eq!(stringify(&delta), "[1]");
        assert_eq!(round_trip(&delta), Delta::builder().insert(1).build());
    }

    #[test]
    fn test_rejects_unknown_tag() {
        let err = parse("[\"a\"]\n[1,4]").unwrap_err();
        assert!(matches!(err, DeltaError::Parse(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_rejects_bad_attributed_tag() {
        assert!(parse(r#"[1,{"a":1},3]"#).is_err());
        assert!(parse(r#"[1,{"a":1},{"b":2}]"#).is_err());
    }

    #[test]
    fn test_rejects_malformed_nested_payload() {
        assert!(matches!(parse("[[1,2,3,4]]"), Err(DeltaError::Parse(_))));
        assert!(matches!(parse("[[\"not a run\"]]"), Err(DeltaError::Parse(_))));
    }

    #[test]
    fn test_rejects_wrong_shapes() {
        assert!(parse("{}").is_err());
        assert!(parse("[]").is_err());
        assert!(parse("[true]").is_err());
        assert!(parse("[\"text\",2]").is_err());
        assert!(parse("[-1,3]").is_err());
        assert!(parse("not json").is_err());
    }
}
