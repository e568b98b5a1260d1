use super::synthetic_method::SyntheticMethod;
use crate::errors::{Result, SerializationError};
use crate::features::hierarchy::{Access, ClassHierarchy, ClassInfo, FieldInfo};
use crate::shared::models::names::{
    read_object_entry, write_object_entry, MODEL_INPUT_STREAM, MODEL_OUTPUT_STREAM,
    OBJECT_INPUT_STREAM, OBJECT_OUTPUT_STREAM,
};
use crate::shared::models::{MethodRef, Selector, TypeRef};

/// Fabricated stream class
///
/// Structural queries answer for the real class it models. It has no fields
/// and no class initializer.
#[derive(Debug, Clone)]
pub struct SyntheticClass {
    name: TypeRef,
    modeled: ClassInfo,
    methods: Vec<SyntheticMethod>,
}

impl SyntheticClass {
    /// Model `modeled` under `name`, with one synthetic method for `entry`
    pub fn new(
        hierarchy: &ClassHierarchy,
        name: &str,
        modeled: &str,
        entry: Selector,
    ) -> Result<Self> {
        let real = hierarchy.lookup(&TypeRef::new(modeled)).ok_or_else(|| {
            SerializationError::model(name, format!("{} is not in the class hierarchy", modeled))
        })?;
        let entry_method = real.declared_method(&entry).ok_or_else(|| {
            SerializationError::model(name, format!("{} does not declare {}", modeled, entry))
        })?;
        let method = SyntheticMethod::new(
            MethodRef::new(TypeRef::new(name), entry),
            entry_method.declared_exceptions.clone(),
        )?;
        Ok(Self {
            name: TypeRef::new(name),
            modeled: real.clone(),
            methods: vec![method],
        })
    }

    /// Model of `ObjectInputStream` with `readObject()`
    pub fn input_stream(hierarchy: &ClassHierarchy) -> Result<Self> {
        Self::new(hierarchy, MODEL_INPUT_STREAM, OBJECT_INPUT_STREAM, read_object_entry())
    }

    /// Model of `ObjectOutputStream` with `writeObject(Object)`
    pub fn output_stream(hierarchy: &ClassHierarchy) -> Result<Self> {
        Self::new(hierarchy, MODEL_OUTPUT_STREAM, OBJECT_OUTPUT_STREAM, write_object_entry())
    }

    pub fn name(&self) -> &TypeRef {
        &self.name
    }

    pub fn modeled_class(&self) -> &TypeRef {
        &self.modeled.name
    }

    pub fn access(&self) -> Access {
        self.modeled.access
    }

    pub fn is_public(&self) -> bool {
        self.modeled.is_public()
    }

    pub fn superclass(&self) -> Option<&TypeRef> {
        self.modeled.superclass.as_ref()
    }

    pub fn interfaces(&self) -> &[TypeRef] {
        &self.modeled.interfaces
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &[]
    }

    pub fn class_initializer(&self) -> Option<&SyntheticMethod> {
        None
    }

    pub fn method(&self, selector: &Selector) -> Option<&SyntheticMethod> {
        self.methods
            .iter()
            .find(|m| &m.reference().selector == selector)
    }

    pub fn method_mut(&mut self, selector: &Selector) -> Option<&mut SyntheticMethod> {
        self.methods
            .iter_mut()
            .find(|m| &m.reference().selector == selector)
    }

    pub fn methods(&self) -> impl Iterator<Item = &SyntheticMethod> {
        self.methods.iter()
    }
}
