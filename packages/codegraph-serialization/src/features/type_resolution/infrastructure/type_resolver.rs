//! Possible concrete types of serialized fields

use crate::config::PruningConfig;
use crate::features::hierarchy::{Access, ClassHierarchy, ClassInfo, FieldInfo, TypeSignature};
use crate::features::type_resolution::domain::TypeCategory;
use crate::shared::models::names::JAVA_IO_SERIALIZABLE;
use crate::shared::models::TypeRef;
use std::collections::BTreeSet;
use tracing::debug;

/// Whether `candidate` may be instantiated from code in `from`
///
/// Public classes always are, package-private ones only within the same
/// package. Protected nested classes reachable through an enclosing
/// superclass are not modeled and are reported inaccessible.
pub fn is_accessible(from: &ClassInfo, candidate: &ClassInfo) -> bool {
    match candidate.access {
        Access::Public => true,
        Access::Package => candidate.name.package() == from.name.package(),
        Access::Protected | Access::Private => false,
    }
}

/// Resolver over the serializable classes of one class universe
#[derive(Debug, Clone)]
pub struct TypeResolver {
    serializable: BTreeSet<TypeRef>,
    pruning: PruningConfig,
}

impl TypeResolver {
    /// Collects every class assignable to `java.io.Serializable`
    pub fn new(hierarchy: &ClassHierarchy, pruning: PruningConfig) -> Self {
        let serial = TypeRef::new(JAVA_IO_SERIALIZABLE);
        let serializable: BTreeSet<TypeRef> = hierarchy
            .classes()
            .filter(|c| c.name != serial && hierarchy.is_assignable_from(&serial, &c.name))
            .map(|c| c.name.clone())
            .collect();
        debug!("{} serializable classes", serializable.len());
        Self {
            serializable,
            pruning,
        }
    }

    pub fn serializable_classes(&self) -> &BTreeSet<TypeRef> {
        &self.serializable
    }

    pub fn is_serializable(&self, ty: &TypeRef) -> bool {
        self.serializable.contains(ty)
    }

    pub fn pruning(&self) -> PruningConfig {
        self.pruning
    }

    /// Concrete serializable types a `static_type` slot in `declaring_class` may hold
    ///
    /// Arrays resolve through their innermost element type. Primitive and
    /// unresolvable types have no candidates.
    pub fn possible_types(
        &self,
        hierarchy: &ClassHierarchy,
        declaring_class: &TypeRef,
        static_type: &TypeRef,
    ) -> BTreeSet<TypeRef> {
        let slot_type = match TypeCategory::of(hierarchy, static_type) {
            TypeCategory::Primitive | TypeCategory::Ignored => return BTreeSet::new(),
            TypeCategory::Array => static_type.innermost_element_type(),
            _ => static_type.clone(),
        };
        let (Some(from), true) = (hierarchy.lookup(declaring_class), hierarchy.contains(&slot_type))
        else {
            return BTreeSet::new();
        };

        let candidates: BTreeSet<TypeRef> = self
            .serializable
            .iter()
            .filter_map(|name| hierarchy.lookup(name))
            .filter(|c| c.is_concrete())
            .filter(|c| is_accessible(from, c))
            .filter(|c| hierarchy.is_assignable_from(&slot_type, &c.name))
            .map(|c| c.name.clone())
            .collect();
        self.prune(hierarchy, candidates)
    }

    /// Restrict an oversized candidate set to application classes
    pub fn prune(
        &self,
        hierarchy: &ClassHierarchy,
        candidates: BTreeSet<TypeRef>,
    ) -> BTreeSet<TypeRef> {
        if !self.pruning.enabled || candidates.len() <= self.pruning.threshold {
            return candidates;
        }
        debug!(
            "Pruning {} candidates to application classes (threshold {})",
            candidates.len(),
            self.pruning.threshold
        );
        candidates
            .into_iter()
            .filter(|t| hierarchy.lookup(t).is_some_and(ClassInfo::is_application))
            .collect()
    }

    /// Element type of a collection field, taken from its generic signature
    ///
    /// Lists and sets use their first type argument, maps their second (the
    /// value type). Without usable generic information the declared field
    /// type is returned.
    pub fn extract_generic_type(&self, hierarchy: &ClassHierarchy, field: &FieldInfo) -> TypeRef {
        let declared = field.field_type().clone();
        let category = TypeCategory::of(hierarchy, &declared);
        if !category.is_collection() {
            return declared;
        }
        let signature = match field.parsed_signature() {
            Ok(Some(signature)) => signature,
            Ok(None) => return declared,
            Err(e) => {
                debug!("Ignoring generic signature of {}: {}", field.reference, e);
                return declared;
            }
        };
        let position = if category == TypeCategory::Map { 1 } else { 0 };
        let argument = match &signature {
            TypeSignature::Class { type_arguments, .. } => type_arguments.get(position),
            _ => None,
        };
        argument
            .and_then(|a| a.upper_bound())
            .filter(|t| hierarchy.is_resolvable(t))
            .unwrap_or(declared)
    }

    /// Static type used to resolve a field: generic element type for collections
    pub fn field_static_type(&self, hierarchy: &ClassHierarchy, field: &FieldInfo) -> TypeRef {
        self.extract_generic_type(hierarchy, field)
    }

    /// `possible_types` for a field of `declaring_class`
    pub fn possible_types_for_field(
        &self,
        hierarchy: &ClassHierarchy,
        declaring_class: &TypeRef,
        field: &FieldInfo,
    ) -> BTreeSet<TypeRef> {
        let static_type = self.field_static_type(hierarchy, field);
        self.possible_types(hierarchy, declaring_class, &static_type)
    }
}
