//! Static type classification

use crate::features::hierarchy::ClassHierarchy;
use crate::shared::models::names::{JAVA_UTIL_LIST, JAVA_UTIL_MAP, JAVA_UTIL_SET};
use crate::shared::models::TypeRef;
use std::fmt;

/// Instrumentation strategy for a static type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Primitive,
    Array,
    /// Plain class type; its fields are instrumented recursively
    Object,
    List,
    Set,
    Map,
    /// Not in the class hierarchy
    Ignored,
}

impl TypeCategory {
    /// Classify `ty`; List is checked before Set and Set before Map
    pub fn of(hierarchy: &ClassHierarchy, ty: &TypeRef) -> Self {
        if ty.is_primitive() {
            return TypeCategory::Primitive;
        }
        if ty.is_array() {
            return TypeCategory::Array;
        }
        if !hierarchy.contains(ty) {
            return TypeCategory::Ignored;
        }
        let is_a = |container: &str| hierarchy.is_assignable_from(&TypeRef::new(container), ty);
        if is_a(JAVA_UTIL_LIST) {
            TypeCategory::List
        } else if is_a(JAVA_UTIL_SET) {
            TypeCategory::Set
        } else if is_a(JAVA_UTIL_MAP) {
            TypeCategory::Map
        } else {
            TypeCategory::Object
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            TypeCategory::List | TypeCategory::Set | TypeCategory::Map
        )
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeCategory::Primitive => "primitive",
            TypeCategory::Array => "array",
            TypeCategory::Object => "object",
            TypeCategory::List => "list",
            TypeCategory::Set => "set",
            TypeCategory::Map => "map",
            TypeCategory::Ignored => "ignored",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::hierarchy::ClassInfo;
    use proptest::prelude::*;

    #[test]
    fn test_categories() {
        let mut cha = ClassHierarchy::with_primordial_stubs();
        cha.add_class(ClassInfo::new("Lapp/Bag").implements(JAVA_UTIL_SET));

        let category = |t: &str| TypeCategory::of(&cha, &TypeRef::new(t));
        assert_eq!(category("I"), TypeCategory::Primitive);
        assert_eq!(category("[Lapp/Bag"), TypeCategory::Array);
        assert_eq!(category("Ljava/util/ArrayList"), TypeCategory::List);
        assert_eq!(category("Lapp/Bag"), TypeCategory::Set);
        assert_eq!(category("Ljava/util/HashMap"), TypeCategory::Map);
        assert_eq!(category("Ljava/lang/String"), TypeCategory::Object);
        assert_eq!(category("Lmissing/Type"), TypeCategory::Ignored);
        assert!(TypeCategory::Map.is_collection());
        assert!(!TypeCategory::Array.is_collection());
    }

    proptest! {
        #[test]
        fn prop_primitive_letters_are_primitive(c in prop::sample::select(vec!["Z", "B", "C", "S", "I", "J", "F", "D"])) {
            let cha = ClassHierarchy::new();
            prop_assert_eq!(TypeCategory::of(&cha, &TypeRef::new(c)), TypeCategory::Primitive);
        }

        #[test]
        fn prop_any_array_is_array(depth in 1usize..5, inner in "[a-z]{1,8}") {
            let cha = ClassHierarchy::new();
            let ty = TypeRef::new(format!("{}Lp/{}", "[".repeat(depth), inner));
            prop_assert_eq!(TypeCategory::of(&cha, &ty), TypeCategory::Array);
        }
    }
}
