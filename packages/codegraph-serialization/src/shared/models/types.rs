//! JVM-style type, method and field references
//!
//! Types are kept in internal form without the trailing `;`
//! (`Ljava/lang/Object`, `[I`, `[[Lcom/a/B`). Names are shared through
//! `Arc<str>` so references clone cheaply across points-to state.

use super::descriptor::{parse_method_descriptor, MethodDescriptor};
use crate::errors::Result;
use std::fmt;
use std::sync::Arc;

const PRIMITIVES: &[u8] = b"ZBCSIJFD";

/// Type name in JVM internal form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(Arc<str>);

impl TypeRef {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Class type from a slash-separated name (`java/util/List` -> `Ljava/util/List`)
    pub fn class(internal_name: &str) -> Self {
        Self::new(format!("L{}", internal_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_primitive(&self) -> bool {
        self.0.len() == 1 && PRIMITIVES.contains(&self.0.as_bytes()[0])
    }

    pub fn is_void(&self) -> bool {
        &*self.0 == "V"
    }

    pub fn is_array(&self) -> bool {
        self.0.starts_with('[')
    }

    pub fn is_class(&self) -> bool {
        self.0.starts_with('L')
    }

    /// Element type of a one-level array (`[[I` -> `[I`)
    pub fn element_type(&self) -> Option<TypeRef> {
        self.0.strip_prefix('[').map(TypeRef::new)
    }

    /// Element type after stripping all array dimensions
    pub fn innermost_element_type(&self) -> TypeRef {
        TypeRef::new(self.0.trim_start_matches('['))
    }

    pub fn dimensionality(&self) -> usize {
        self.0.bytes().take_while(|b| *b == b'[').count()
    }

    pub fn array_of(&self) -> TypeRef {
        TypeRef::new(format!("[{}", self.0))
    }

    /// Package in slash form (`Lcom/a/B` -> `com/a`); empty for the default package
    pub fn package(&self) -> Option<&str> {
        let body = self.0.strip_prefix('L')?;
        Some(body.rfind('/').map_or("", |idx| &body[..idx]))
    }

    /// Descriptor form (`Ljava/lang/Object` -> `Ljava/lang/Object;`)
    pub fn to_descriptor(&self) -> String {
        if self.is_class() || self.innermost_element_type().is_class() {
            format!("{};", self.0)
        } else {
            self.0.to_string()
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::new(name)
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::new(name)
    }
}

/// Method name plus descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector {
    name: Arc<str>,
    descriptor: Arc<str>,
}

impl Selector {
    pub fn new(name: &str, descriptor: &str) -> Self {
        Self {
            name: Arc::from(name),
            descriptor: Arc::from(descriptor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn parse(&self) -> Result<MethodDescriptor> {
        parse_method_descriptor(&self.descriptor)
    }

    pub fn returns_void(&self) -> bool {
        self.descriptor.ends_with(")V")
    }

    pub fn is_constructor(&self) -> bool {
        &*self.name == "<init>"
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

/// Reference to a method of a declaring class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRef {
    pub declaring_class: TypeRef,
    pub selector: Selector,
}

impl MethodRef {
    pub fn new(declaring_class: TypeRef, selector: Selector) -> Self {
        Self {
            declaring_class,
            selector,
        }
    }

    /// Number of declared parameters, excluding `this`
    pub fn declared_parameter_count(&self) -> Result<usize> {
        Ok(self.selector.parse()?.params.len())
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_class, self.selector)
    }
}

/// Reference to an instance or static field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldRef {
    pub declaring_class: TypeRef,
    pub name: Arc<str>,
    pub field_type: TypeRef,
}

impl FieldRef {
    pub fn new(declaring_class: TypeRef, name: &str, field_type: TypeRef) -> Self {
        Self {
            declaring_class,
            name: Arc::from(name),
            field_type,
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.declaring_class, self.name, self.field_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_shapes() {
        let obj = TypeRef::class("java/lang/Object");
        assert_eq!(obj.as_str(), "Ljava/lang/Object");
        assert!(obj.is_class());
        assert!(!obj.is_primitive());

        let int = TypeRef::new("I");
        assert!(int.is_primitive());
        assert!(!TypeRef::new("V").is_primitive());
        assert!(TypeRef::new("V").is_void());
    }

    #[test]
    fn test_array_navigation() {
        let arr = TypeRef::new("[[Lcom/a/B");
        assert!(arr.is_array());
        assert_eq!(arr.dimensionality(), 2);
        assert_eq!(arr.element_type(), Some(TypeRef::new("[Lcom/a/B")));
        assert_eq!(arr.innermost_element_type(), TypeRef::new("Lcom/a/B"));
        assert_eq!(TypeRef::new("Lcom/a/B").array_of(), TypeRef::new("[Lcom/a/B"));
        assert_eq!(TypeRef::new("Lcom/a/B").element_type(), None);
    }

    #[test]
    fn test_package() {
        assert_eq!(TypeRef::new("Lcom/a/B").package(), Some("com/a"));
        assert_eq!(TypeRef::new("LB").package(), Some(""));
        assert_eq!(TypeRef::new("[Lcom/a/B").package(), None);
    }

    #[test]
    fn test_descriptor_form() {
        assert_eq!(TypeRef::new("Lcom/a/B").to_descriptor(), "Lcom/a/B;");
        assert_eq!(TypeRef::new("[Lcom/a/B").to_descriptor(), "[Lcom/a/B;");
        assert_eq!(TypeRef::new("[I").to_descriptor(), "[I");
    }

    #[test]
    fn test_selector_void() {
        assert!(Selector::new("writeObject", "(Ljava/lang/Object;)V").returns_void());
        assert!(!Selector::new("readObject", "()Ljava/lang/Object;").returns_void());
        assert!(Selector::new("<init>", "()V").is_constructor());
    }
}
