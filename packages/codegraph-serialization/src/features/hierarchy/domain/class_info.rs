//! Class, field and method descriptions of the class universe

use super::generic_signature::TypeSignature;
use crate::errors::Result;
use crate::features::ir::MethodBody;
use crate::shared::models::{FieldRef, MethodRef, Selector, TypeRef};

/// Visibility of a class or member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

/// Loader scope a class was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClassScope {
    #[default]
    Application,
    Extension,
    Primordial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub reference: FieldRef,
    pub access: Access,
    pub is_static: bool,

    /// Raw generic signature, e.g. `Ljava/util/List<Lcom/a/B;>;`
    pub generic_signature: Option<String>,
}

impl FieldInfo {
    pub fn new(declaring_class: &TypeRef, name: &str, field_type: TypeRef) -> Self {
        Self {
            reference: FieldRef::new(declaring_class.clone(), name, field_type),
            access: Access::Private,
            is_static: false,
            generic_signature: None,
        }
    }

    pub fn with_signature(mut self, signature: &str) -> Self {
        self.generic_signature = Some(signature.to_string());
        self
    }

    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn name(&self) -> &str {
        &self.reference.name
    }

    pub fn field_type(&self) -> &TypeRef {
        &self.reference.field_type
    }

    /// Parsed generic signature, if one is recorded
    pub fn parsed_signature(&self) -> Result<Option<TypeSignature>> {
        self.generic_signature
            .as_deref()
            .map(TypeSignature::parse)
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub reference: MethodRef,
    pub access: Access,
    pub is_static: bool,
    pub is_abstract: bool,
    pub declared_exceptions: Vec<TypeRef>,

    /// None for abstract or native methods
    pub body: Option<MethodBody>,
}

impl MethodInfo {
    pub fn new(declaring_class: &TypeRef, selector: Selector) -> Self {
        Self {
            reference: MethodRef::new(declaring_class.clone(), selector),
            access: Access::Public,
            is_static: false,
            is_abstract: false,
            declared_exceptions: Vec::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: MethodBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn throws(mut self, exception: TypeRef) -> Self {
        self.declared_exceptions.push(exception);
        self
    }

    pub fn selector(&self) -> &Selector {
        &self.reference.selector
    }

    /// Parameter count including `this`
    pub fn parameter_count(&self) -> Result<usize> {
        let declared = self.reference.declared_parameter_count()?;
        Ok(if self.is_static { declared } else { declared + 1 })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub name: TypeRef,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub access: Access,
    pub is_interface: bool,
    pub is_abstract: bool,
    pub scope: ClassScope,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    /// Public application class extending `java.lang.Object`
    pub fn new(name: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            superclass: Some(TypeRef::new(crate::shared::models::names::JAVA_LANG_OBJECT)),
            interfaces: Vec::new(),
            access: Access::Public,
            is_interface: false,
            is_abstract: false,
            scope: ClassScope::Application,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, superclass: impl Into<TypeRef>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Root class with no superclass
    pub fn root(mut self) -> Self {
        self.superclass = None;
        self
    }

    pub fn implements(mut self, interface: impl Into<TypeRef>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self.is_abstract = true;
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn in_scope(mut self, scope: ClassScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn primordial(self) -> Self {
        self.in_scope(ClassScope::Primordial)
    }

    /// Add an instance field declared by this class
    pub fn field(mut self, name: &str, field_type: impl Into<TypeRef>) -> Self {
        let field = FieldInfo::new(&self.name, name, field_type.into());
        self.fields.push(field);
        self
    }

    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn is_public(&self) -> bool {
        self.access == Access::Public
    }

    pub fn is_concrete(&self) -> bool {
        !self.is_abstract && !self.is_interface
    }

    pub fn is_application(&self) -> bool {
        self.scope == ClassScope::Application
    }

    pub fn declared_method(&self, selector: &Selector) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.selector() == selector)
    }

    pub fn declared_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name() == name)
    }
}
