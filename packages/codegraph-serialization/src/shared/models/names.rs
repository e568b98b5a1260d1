//! Well-known classes and selectors of the Java serialization API

use super::types::{MethodRef, Selector, TypeRef};

pub const JAVA_LANG_OBJECT: &str = "Ljava/lang/Object";
pub const JAVA_LANG_STRING: &str = "Ljava/lang/String";
pub const JAVA_IO_SERIALIZABLE: &str = "Ljava/io/Serializable";
pub const OBJECT_INPUT_STREAM: &str = "Ljava/io/ObjectInputStream";
pub const OBJECT_OUTPUT_STREAM: &str = "Ljava/io/ObjectOutputStream";
pub const JAVA_UTIL_LIST: &str = "Ljava/util/List";
pub const JAVA_UTIL_SET: &str = "Ljava/util/Set";
pub const JAVA_UTIL_MAP: &str = "Ljava/util/Map";
pub const CLASS_CAST_EXCEPTION: &str = "Ljava/lang/ClassCastException";

/// Synthetic stand-ins for the two stream classes
pub const MODEL_INPUT_STREAM: &str = "Lsynthetic/model/java/io/ObjectInputStream";
pub const MODEL_OUTPUT_STREAM: &str = "Lsynthetic/model/java/io/ObjectOutputStream";

/// `ObjectInputStream.readObject()`
pub fn read_object_entry() -> Selector {
    Selector::new("readObject", "()Ljava/lang/Object;")
}

/// `ObjectOutputStream.writeObject(Object)`
pub fn write_object_entry() -> Selector {
    Selector::new("writeObject", "(Ljava/lang/Object;)V")
}

pub fn write_object_callback() -> Selector {
    Selector::new("writeObject", "(Ljava/io/ObjectOutputStream;)V")
}

pub fn write_replace_callback() -> Selector {
    Selector::new("writeReplace", "()Ljava/lang/Object;")
}

pub fn read_object_callback() -> Selector {
    Selector::new("readObject", "(Ljava/io/ObjectInputStream;)V")
}

pub fn read_object_no_data_callback() -> Selector {
    Selector::new("readObjectNoData", "()V")
}

pub fn read_resolve_callback() -> Selector {
    Selector::new("readResolve", "()Ljava/lang/Object;")
}

pub fn validate_object_callback() -> Selector {
    Selector::new("validateObject", "()V")
}

pub fn default_constructor() -> Selector {
    Selector::new("<init>", "()V")
}

pub fn read_object_entry_method() -> MethodRef {
    MethodRef::new(TypeRef::new(OBJECT_INPUT_STREAM), read_object_entry())
}

pub fn write_object_entry_method() -> MethodRef {
    MethodRef::new(TypeRef::new(OBJECT_OUTPUT_STREAM), write_object_entry())
}

/// Whether a resolved call target is `ObjectInputStream.readObject()`
pub fn is_deserialization_entry(method: &MethodRef) -> bool {
    method.declaring_class.as_str() == OBJECT_INPUT_STREAM && method.selector == read_object_entry()
}

/// Whether a resolved call target is `ObjectOutputStream.writeObject(Object)`
pub fn is_serialization_entry(method: &MethodRef) -> bool {
    method.declaring_class.as_str() == OBJECT_OUTPUT_STREAM
        && method.selector == write_object_entry()
}
