//! JVM method descriptor parsing
//!
//! `(ILjava/lang/String;[J)V` -> params `[I, Ljava/lang/String, [J]`, return `V`

use super::types::TypeRef;
use crate::errors::{Result, SerializationError};

/// Parsed method descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<TypeRef>,
    pub return_type: TypeRef,
}

pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor> {
    let bytes = descriptor.as_bytes();
    if bytes.first() != Some(&b'(') {
        return Err(SerializationError::descriptor(format!(
            "'{}' does not start with '('",
            descriptor
        )));
    }

    let mut pos = 1;
    let mut params = Vec::new();
    while pos < bytes.len() && bytes[pos] != b')' {
        let (ty, next) = parse_field_type(descriptor, pos)?;
        params.push(ty);
        pos = next;
    }
    if pos >= bytes.len() {
        return Err(SerializationError::descriptor(format!(
            "'{}' has no closing ')'",
            descriptor
        )));
    }
    pos += 1;

    let return_type = if bytes.get(pos) == Some(&b'V') && pos + 1 == bytes.len() {
        TypeRef::new("V")
    } else {
        let (ty, next) = parse_field_type(descriptor, pos)?;
        if next != bytes.len() {
            return Err(SerializationError::descriptor(format!(
                "trailing characters in '{}'",
                descriptor
            )));
        }
        ty
    };

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

/// Parse one field type starting at `pos`; returns the type and the next offset
pub fn parse_field_type(descriptor: &str, pos: usize) -> Result<(TypeRef, usize)> {
    let bytes = descriptor.as_bytes();
    let mut end = pos;
    while end < bytes.len() && bytes[end] == b'[' {
        end += 1;
    }
    match bytes.get(end) {
        Some(b'Z' | b'B' | b'C' | b'S' | b'I' | b'J' | b'F' | b'D') => {
            Ok((TypeRef::new(&descriptor[pos..=end]), end + 1))
        }
        Some(b'L') => {
            let semi = descriptor[end..]
                .find(';')
                .map(|offset| end + offset)
                .ok_or_else(|| {
                    SerializationError::descriptor(format!(
                        "unterminated class type in '{}'",
                        descriptor
                    ))
                })?;
            Ok((TypeRef::new(&descriptor[pos..semi]), semi + 1))
        }
        _ => Err(SerializationError::descriptor(format!(
            "unexpected character at {} in '{}'",
            end, descriptor
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_void_no_args() {
        let d = parse_method_descriptor("()V").unwrap();
        assert!(d.params.is_empty());
        assert!(d.return_type.is_void());
    }

    #[test]
    fn test_parse_mixed() {
        let d = parse_method_descriptor("(ILjava/lang/String;[J[[Lcom/a/B;)Ljava/lang/Object;")
            .unwrap();
        let names: Vec<&str> = d.params.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, vec!["I", "Ljava/lang/String", "[J", "[[Lcom/a/B"]);
        assert_eq!(d.return_type.as_str(), "Ljava/lang/Object");
    }

    // ═══════════════════════════════════════════════════════════════════════
    // EDGE CASES
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_method_descriptor("V").is_err());
        assert!(parse_method_descriptor("(I").is_err());
        assert!(parse_method_descriptor("(Ljava/lang/String)V").is_err());
        assert!(parse_method_descriptor("(Q)V").is_err());
        assert!(parse_method_descriptor("()VV").is_err());
    }

    proptest! {
        #[test]
        fn prop_param_count_matches(prims in proptest::collection::vec(
            prop_oneof![Just("I"), Just("J"), Just("Ljava/lang/Object;"), Just("[Z")], 0..8)) {
            let descriptor = format!("({})V", prims.concat());
            let parsed = parse_method_descriptor(&descriptor).unwrap();
            prop_assert_eq!(parsed.params.len(), prims.len());
        }
    }
}
