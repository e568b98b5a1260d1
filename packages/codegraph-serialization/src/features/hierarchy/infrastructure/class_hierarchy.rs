//! Class hierarchy over the class universe
//!
//! Answers the structural queries the analysis needs: subtype tests, method
//! resolution by selector, field enumeration, CHA dispatch targets.

use crate::features::hierarchy::domain::{ClassInfo, FieldInfo, MethodInfo};
use crate::shared::models::names::{JAVA_IO_SERIALIZABLE, JAVA_LANG_OBJECT};
use crate::shared::models::{MethodRef, Selector, TypeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeSet, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    classes: FxHashMap<TypeRef, ClassInfo>,

    /// Insertion order, for deterministic iteration
    order: Vec<TypeRef>,

    /// Direct subclasses and direct implementors/sub-interfaces
    subtypes: FxHashMap<TypeRef, BTreeSet<TypeRef>>,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a class
    pub fn add_class(&mut self, class: ClassInfo) {
        let name = class.name.clone();
        if let Some(old) = self.classes.remove(&name) {
            for parent in old.superclass.iter().chain(old.interfaces.iter()) {
                if let Some(children) = self.subtypes.get_mut(parent) {
                    children.remove(&name);
                }
            }
        } else {
            self.order.push(name.clone());
        }
        for parent in class.superclass.iter().chain(class.interfaces.iter()) {
            self.subtypes
                .entry(parent.clone())
                .or_default()
                .insert(name.clone());
        }
        self.classes.insert(name, class);
    }

    pub fn lookup(&self, ty: &TypeRef) -> Option<&ClassInfo> {
        self.classes.get(ty)
    }

    pub fn contains(&self, ty: &TypeRef) -> bool {
        self.classes.contains_key(ty)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes in insertion order
    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.order.iter().filter_map(|name| self.classes.get(name))
    }

    pub fn application_classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes().filter(|c| c.is_application())
    }

    /// The class followed by its superclasses, root last
    pub fn superclass_chain(&self, ty: &TypeRef) -> Vec<&ClassInfo> {
        let mut chain = Vec::new();
        let mut current = self.lookup(ty);
        while let Some(class) = current {
            if chain.iter().any(|c: &&ClassInfo| c.name == class.name) {
                break;
            }
            chain.push(class);
            current = class.superclass.as_ref().and_then(|s| self.lookup(s));
        }
        chain
    }

    /// All interfaces implemented by the type, directly or through supertypes
    pub fn all_interfaces(&self, ty: &TypeRef) -> BTreeSet<TypeRef> {
        let mut result = BTreeSet::new();
        let mut queue: VecDeque<TypeRef> = VecDeque::new();
        for class in self.superclass_chain(ty) {
            queue.extend(class.interfaces.iter().cloned());
        }
        if let Some(class) = self.lookup(ty) {
            if class.is_interface {
                queue.extend(class.interfaces.iter().cloned());
            }
        }
        while let Some(iface) = queue.pop_front() {
            if !result.insert(iface.clone()) {
                continue;
            }
            if let Some(info) = self.lookup(&iface) {
                queue.extend(info.interfaces.iter().cloned());
            }
        }
        result
    }

    /// `sub` equals `sup` or extends it through the superclass chain
    pub fn is_subclass_of(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        self.superclass_chain(sub).iter().any(|c| &c.name == sup)
    }

    pub fn implements_interface(&self, ty: &TypeRef, iface: &TypeRef) -> bool {
        self.all_interfaces(ty).contains(iface)
    }

    /// Whether a value of type `source` may be stored in a `target` slot
    pub fn is_assignable_from(&self, target: &TypeRef, source: &TypeRef) -> bool {
        if target == source {
            return true;
        }
        if target.is_primitive() || source.is_primitive() {
            return false;
        }
        if target.as_str() == JAVA_LANG_OBJECT {
            return true;
        }
        if let Some(source_element) = source.element_type() {
            return match target.element_type() {
                Some(target_element) => {
                    if source_element.is_primitive() || target_element.is_primitive() {
                        source_element == target_element
                    } else {
                        self.is_assignable_from(&target_element, &source_element)
                    }
                }
                None => {
                    target.as_str() == JAVA_IO_SERIALIZABLE
                        || target.as_str() == "Ljava/lang/Cloneable"
                }
            };
        }
        if target.is_array() {
            return false;
        }
        match self.lookup(target) {
            Some(t) if t.is_interface => self.implements_interface(source, target),
            Some(_) => self.is_subclass_of(source, target),
            None => false,
        }
    }

    /// Method declared directly by the class
    pub fn declared_method(&self, ty: &TypeRef, selector: &Selector) -> Option<&MethodInfo> {
        self.lookup(ty)?.declared_method(selector)
    }

    pub fn method(&self, method: &MethodRef) -> Option<&MethodInfo> {
        self.declared_method(&method.declaring_class, &method.selector)
    }

    /// Resolve a selector against the superclass chain, then the interfaces
    pub fn resolve_method(&self, ty: &TypeRef, selector: &Selector) -> Option<&MethodInfo> {
        let lookup_ty = if ty.is_array() {
            TypeRef::new(JAVA_LANG_OBJECT)
        } else {
            ty.clone()
        };
        for class in self.superclass_chain(&lookup_ty) {
            if let Some(m) = class.declared_method(selector) {
                return Some(m);
            }
        }
        self.all_interfaces(&lookup_ty)
            .iter()
            .find_map(|iface| self.declared_method(iface, selector))
    }

    /// Instance fields declared by the class and all its superclasses
    pub fn all_instance_fields(&self, ty: &TypeRef) -> Vec<&FieldInfo> {
        self.superclass_chain(ty)
            .into_iter()
            .flat_map(|class| class.fields.iter())
            .filter(|f| !f.is_static)
            .collect()
    }

    /// The type and every transitive subtype
    pub fn all_subtypes(&self, ty: &TypeRef) -> BTreeSet<TypeRef> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([ty.clone()]);
        while let Some(current) = queue.pop_front() {
            if !self.contains(&current) || !seen.insert(current.clone()) {
                continue;
            }
            if let Some(children) = self.subtypes.get(&current) {
                queue.extend(children.iter().cloned());
            }
        }
        seen
    }

    /// Concrete (instantiable) types among `all_subtypes`
    pub fn concrete_subtypes(&self, ty: &TypeRef) -> BTreeSet<TypeRef> {
        self.all_subtypes(ty)
            .into_iter()
            .filter(|t| self.lookup(t).is_some_and(ClassInfo::is_concrete))
            .collect()
    }

    /// CHA: every implementation a virtual call on `method` may reach
    pub fn possible_targets(&self, method: &MethodRef) -> Vec<MethodRef> {
        let mut seen = FxHashSet::default();
        let mut targets = Vec::new();
        for sub in self.concrete_subtypes(&method.declaring_class) {
            if let Some(resolved) = self.resolve_method(&sub, &method.selector) {
                if !resolved.is_abstract && seen.insert(resolved.reference.clone()) {
                    targets.push(resolved.reference.clone());
                }
            }
        }
        targets
    }

    /// Whether a reference type names a resolvable class or a resolvable array
    pub fn is_resolvable(&self, ty: &TypeRef) -> bool {
        let inner = ty.innermost_element_type();
        inner.is_primitive() || self.contains(&inner)
    }
}
