//! Minimal JDK class universe
//!
//! Just enough of `java.lang`, `java.io` and `java.util` for the stream
//! entry points to resolve and for collection categories to be recognised.

use super::class_hierarchy::ClassHierarchy;
use crate::features::hierarchy::domain::{ClassInfo, MethodInfo};
use crate::features::ir::{Instruction, MethodBody};
use crate::shared::models::names::{
    self, CLASS_CAST_EXCEPTION, JAVA_IO_SERIALIZABLE, JAVA_LANG_OBJECT, JAVA_LANG_STRING,
    JAVA_UTIL_LIST, JAVA_UTIL_MAP, JAVA_UTIL_SET, OBJECT_INPUT_STREAM, OBJECT_OUTPUT_STREAM,
};
use crate::shared::models::TypeRef;

fn empty_constructor(owner: &str) -> MethodInfo {
    MethodInfo::new(&TypeRef::new(owner), names::default_constructor()).with_body(
        MethodBody::new(1).with(Instruction::Return {
            iindex: 0,
            value: None,
        }),
    )
}

fn primordial_class(name: &str) -> ClassInfo {
    ClassInfo::new(name).primordial().method(empty_constructor(name))
}

impl ClassHierarchy {
    /// Hierarchy seeded with the primordial JDK stubs
    pub fn with_primordial_stubs() -> Self {
        let mut cha = ClassHierarchy::new();
        cha.add_class(primordial_class(JAVA_LANG_OBJECT).root());
        cha.add_class(ClassInfo::new(JAVA_IO_SERIALIZABLE).interface().primordial());
        cha.add_class(ClassInfo::new("Ljava/lang/Cloneable").interface().primordial());
        cha.add_class(primordial_class(JAVA_LANG_STRING).implements(JAVA_IO_SERIALIZABLE));
        cha.add_class(primordial_class("Ljava/lang/Throwable").implements(JAVA_IO_SERIALIZABLE));
        cha.add_class(primordial_class(CLASS_CAST_EXCEPTION).extends("Ljava/lang/Throwable"));

        let input = TypeRef::new(OBJECT_INPUT_STREAM);
        cha.add_class(
            primordial_class(OBJECT_INPUT_STREAM)
                .method(MethodInfo::new(&input, names::read_object_entry())),
        );
        let output = TypeRef::new(OBJECT_OUTPUT_STREAM);
        cha.add_class(
            primordial_class(OBJECT_OUTPUT_STREAM)
                .method(MethodInfo::new(&output, names::write_object_entry())),
        );

        cha.add_class(ClassInfo::new("Ljava/util/Collection").interface().primordial());
        for (iface, implementation) in [
            (JAVA_UTIL_LIST, "Ljava/util/ArrayList"),
            (JAVA_UTIL_SET, "Ljava/util/HashSet"),
        ] {
            cha.add_class(
                ClassInfo::new(iface)
                    .interface()
                    .implements("Ljava/util/Collection")
                    .primordial(),
            );
            cha.add_class(
                primordial_class(implementation)
                    .implements(iface)
                    .implements(JAVA_IO_SERIALIZABLE),
            );
        }
        cha.add_class(ClassInfo::new(JAVA_UTIL_MAP).interface().primordial());
        cha.add_class(
            primordial_class("Ljava/util/HashMap")
                .implements(JAVA_UTIL_MAP)
                .implements(JAVA_IO_SERIALIZABLE),
        );
        cha
    }
}
