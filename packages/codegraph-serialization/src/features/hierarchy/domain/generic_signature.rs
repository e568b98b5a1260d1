//! Field generic signatures
//!
//! Grammar (JVMS 4.7.9.1, field signatures only):
//!
//! ```text
//! FieldTypeSignature := ClassTypeSignature | ArrayTypeSignature | TypeVariableSignature
//! ClassTypeSignature := 'L' Ident ('/' Ident)* TypeArguments? ('.' Ident TypeArguments?)* ';'
//! TypeArguments      := '<' TypeArgument+ '>'
//! TypeArgument       := '*' | ('+' | '-')? FieldTypeSignature
//! ArrayTypeSignature := '[' (BaseType | FieldTypeSignature)
//! ```

use crate::errors::{Result, SerializationError};
use crate::shared::models::TypeRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(TypeRef),
    Class {
        name: TypeRef,
        type_arguments: Vec<TypeArgument>,
    },
    Array(Box<TypeSignature>),
    TypeVariable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    Wildcard,
    Exact(TypeSignature),
    Extends(TypeSignature),
    Super(TypeSignature),
}

impl TypeArgument {
    /// Upper-bounded or exact argument type, erased
    pub fn upper_bound(&self) -> Option<TypeRef> {
        match self {
            TypeArgument::Exact(sig) | TypeArgument::Extends(sig) => sig.erasure(),
            TypeArgument::Wildcard | TypeArgument::Super(_) => None,
        }
    }
}

impl TypeSignature {
    pub fn parse(signature: &str) -> Result<Self> {
        let mut parser = Parser {
            input: signature.as_bytes(),
            source: signature,
            pos: 0,
        };
        let sig = parser.field_type()?;
        if parser.pos != parser.input.len() {
            return Err(parser.error("trailing characters"));
        }
        Ok(sig)
    }

    /// Erased type; None for type variables
    pub fn erasure(&self) -> Option<TypeRef> {
        match self {
            TypeSignature::Base(t) => Some(t.clone()),
            TypeSignature::Class { name, .. } => Some(name.clone()),
            TypeSignature::Array(inner) => inner.erasure().map(|t| t.array_of()),
            TypeSignature::TypeVariable(_) => None,
        }
    }

    pub fn type_arguments(&self) -> &[TypeArgument] {
        match self {
            TypeSignature::Class { type_arguments, .. } => type_arguments,
            _ => &[],
        }
    }
}

struct Parser<'a> {
    input: &'a [u8],
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, what: &str) -> SerializationError {
        SerializationError::GenericSignature(format!(
            "{} at {} in '{}'",
            what, self.pos, self.source
        ))
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    fn field_type(&mut self) -> Result<TypeSignature> {
        match self.peek() {
            Some(b'L') => self.class_type(),
            Some(b'[') => {
                self.pos += 1;
                let inner = match self.peek() {
                    Some(b @ (b'Z' | b'B' | b'C' | b'S' | b'I' | b'J' | b'F' | b'D')) => {
                        self.pos += 1;
                        TypeSignature::Base(TypeRef::new((b as char).to_string()))
                    }
                    _ => self.field_type()?,
                };
                Ok(TypeSignature::Array(Box::new(inner)))
            }
            Some(b'T') => {
                self.pos += 1;
                let name = self.identifier(b";")?;
                self.expect(b';')?;
                Ok(TypeSignature::TypeVariable(name))
            }
            _ => Err(self.error("expected field type signature")),
        }
    }

    fn class_type(&mut self) -> Result<TypeSignature> {
        self.expect(b'L')?;
        let mut name = self.identifier(b"<.;")?;
        let mut type_arguments = self.type_arguments()?;
        // Inner classes: the arguments of the innermost class win
        while self.peek() == Some(b'.') {
            self.pos += 1;
            let inner = self.identifier(b"<.;")?;
            name = format!("{}${}", name, inner);
            type_arguments = self.type_arguments()?;
        }
        self.expect(b';')?;
        Ok(TypeSignature::Class {
            name: TypeRef::class(&name),
            type_arguments,
        })
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        if self.peek() != Some(b'<') {
            return Ok(Vec::new());
        }
        self.pos += 1;
        let mut args = Vec::new();
        while self.peek() != Some(b'>') {
            let arg = match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    TypeArgument::Wildcard
                }
                Some(b'+') => {
                    self.pos += 1;
                    TypeArgument::Extends(self.field_type()?)
                }
                Some(b'-') => {
                    self.pos += 1;
                    TypeArgument::Super(self.field_type()?)
                }
                None => return Err(self.error("unterminated type arguments")),
                _ => TypeArgument::Exact(self.field_type()?),
            };
            args.push(arg);
        }
        self.pos += 1;
        if args.is_empty() {
            return Err(self.error("empty type arguments"));
        }
        Ok(args)
    }

    fn identifier(&mut self, terminators: &[u8]) -> Result<String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if terminators.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("empty identifier"));
        }
        Ok(self.source[start..self.pos].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_of_class() {
        let sig = TypeSignature::parse("Ljava/util/List<Lcom/a/B;>;").unwrap();
        assert_eq!(sig.erasure(), Some(TypeRef::new("Ljava/util/List")));
        assert_eq!(sig.type_arguments().len(), 1);
        assert_eq!(
            sig.type_arguments()[0].upper_bound(),
            Some(TypeRef::new("Lcom/a/B"))
        );
    }

    #[test]
    fn test_parse_map_with_wildcards() {
        let sig =
            TypeSignature::parse("Ljava/util/Map<Ljava/lang/String;+Lcom/a/V;>;").unwrap();
        let args = sig.type_arguments();
        assert_eq!(args.len(), 2);
        assert_eq!(args[1].upper_bound(), Some(TypeRef::new("Lcom/a/V")));

        let sig = TypeSignature::parse("Ljava/util/Set<*>;").unwrap();
        assert_eq!(sig.type_arguments()[0], TypeArgument::Wildcard);
        assert_eq!(sig.type_arguments()[0].upper_bound(), None);
    }

    #[test]
    fn test_parse_nested_and_arrays() {
        let sig = TypeSignature::parse("Ljava/util/List<[Ljava/util/List<TT;>;>;").unwrap();
        let arg = &sig.type_arguments()[0];
        assert_eq!(arg.upper_bound(), Some(TypeRef::new("[Ljava/util/List")));

        let sig = TypeSignature::parse("[I").unwrap();
        assert_eq!(sig.erasure(), Some(TypeRef::new("[I")));
    }

    #[test]
    fn test_type_variable_has_no_erasure() {
        let sig = TypeSignature::parse("TE;").unwrap();
        assert_eq!(sig, TypeSignature::TypeVariable("E".to_string()));
        assert_eq!(sig.erasure(), None);
    }

    #[test]
    fn test_inner_class() {
        let sig = TypeSignature::parse("Lcom/a/Outer<TT;>.Inner<Lcom/a/B;>;").unwrap();
        assert_eq!(sig.erasure(), Some(TypeRef::new("Lcom/a/Outer$Inner")));
        assert_eq!(
            sig.type_arguments()[0].upper_bound(),
            Some(TypeRef::new("Lcom/a/B"))
        );
    }

    // ═══════════════════════════════════════════════════════════════════════
    // EDGE CASES
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_malformed_signatures() {
        assert!(TypeSignature::parse("").is_err());
        assert!(TypeSignature::parse("Ljava/util/List<>;").is_err());
        assert!(TypeSignature::parse("Ljava/util/List<Lcom/a/B;").is_err());
        assert!(TypeSignature::parse("Ljava/util/List").is_err());
        assert!(TypeSignature::parse("Lcom/a/B;x").is_err());
    }
}
