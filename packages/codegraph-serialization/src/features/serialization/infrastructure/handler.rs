//! Serialization/deserialization instrumentation
//!
//! One `handle` call is one round: drain the serialization worklist, then the
//! deserialization worklist, appending instructions to the model node of each
//! entry. Nodes whose bodies were touched are returned so the driver can feed
//! them back into the engine.
//!
//! Model body layout (values of the model method):
//! - `v1`: the stream (`this`)
//! - `v2`: the object being serialized (`writeObject(Object)` only)

use super::hooks::SerializationHooks;
use crate::errors::{Result, SerializationError};
use crate::features::callgraph::domain::{Context, NodeId};
use crate::features::hierarchy::ClassHierarchy;
use crate::features::ir::{Dispatch, ValueId};
use crate::features::points_to::domain::{InstanceKeyId, PointerKey};
use crate::features::points_to::infrastructure::{
    DataDependenceSlicer, PropagationEngine, SliceSeed,
};
use crate::features::points_to::ports::ProgressMonitor;
use crate::features::serialization::domain::{DeserializationWork, SerializationWork};
use crate::features::type_resolution::{TypeCategory, TypeResolver};
use crate::shared::models::names::{
    read_object_callback, read_object_no_data_callback, read_resolve_callback,
    validate_object_callback, write_object_callback, write_replace_callback,
};
use crate::shared::models::{FieldRef, MethodRef, Selector, TypeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Model parameter holding the stream
const STREAM_VALUE: ValueId = 1;

/// Model parameter holding the serialized object
const SERIALIZED_VALUE: ValueId = 2;

/// Outcome of one handler round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerRound {
    pub serialization_entries: usize,
    pub deserialization_entries: usize,

    /// Model nodes to re-visit, in id order
    pub changed: BTreeSet<NodeId>,
}

/// Non-abstract implementation of `selector` visible on `ty`
fn callback(hierarchy: &ClassHierarchy, ty: &TypeRef, selector: &Selector) -> Option<MethodRef> {
    hierarchy
        .resolve_method(ty, selector)
        .filter(|m| !m.is_abstract && !m.is_static)
        .map(|m| m.reference.clone())
}

/// One field of an allocated object and the callback-bearing types it may hold
#[derive(Debug, Clone)]
struct FieldPlan {
    field: FieldRef,
    targets: Vec<(TypeRef, MethodRef)>,
}

/// Where the classes allocated for a `readObject()` call came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpectedOrigin {
    /// Narrowing casts on the call result
    Cast,
    /// The caller's declaring class, for results that are never cast
    CallerClass,
}

impl ExpectedOrigin {
    /// Whether an allocated object of `category` gets its fields instrumented
    fn instruments_fields(self, category: TypeCategory) -> bool {
        match self {
            ExpectedOrigin::Cast => category == TypeCategory::Object,
            ExpectedOrigin::CallerClass => !matches!(
                category,
                TypeCategory::Primitive | TypeCategory::Array | TypeCategory::Ignored
            ),
        }
    }
}

/// Appends stream-model instructions for drained worklist entries
pub struct SerializationHandler {
    resolver: TypeResolver,

    /// Pointers written by modeled deserialization
    deserialized: BTreeSet<PointerKey>,

    /// Pointers read by modeled serialization
    serialized: BTreeSet<PointerKey>,

    /// Cast of the serialized object per (model node, allocated type)
    serialized_casts: FxHashMap<(NodeId, TypeRef), ValueId>,

    /// (model node, allocated type, field, field object type) already instrumented
    serialized_fields: FxHashSet<(NodeId, TypeRef, FieldRef, TypeRef)>,

    /// Allocations per deserialization model node, by type
    allocations: FxHashMap<NodeId, BTreeMap<TypeRef, ValueId>>,
}

impl SerializationHandler {
    pub fn new(resolver: TypeResolver) -> Self {
        Self {
            resolver,
            deserialized: BTreeSet::new(),
            serialized: BTreeSet::new(),
            serialized_casts: FxHashMap::default(),
            serialized_fields: FxHashSet::default(),
            allocations: FxHashMap::default(),
        }
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    pub fn deserialized_pointers(&self) -> &BTreeSet<PointerKey> {
        &self.deserialized
    }

    pub fn serialized_pointers(&self) -> &BTreeSet<PointerKey> {
        &self.serialized
    }

    /// Types allocated so far for a deserialization model node
    pub fn allocated_types(&self, target: NodeId) -> Vec<TypeRef> {
        self.allocations
            .get(&target)
            .map(|types| types.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn into_results(self) -> (BTreeSet<PointerKey>, BTreeSet<PointerKey>) {
        (self.deserialized, self.serialized)
    }

    /// Run one round over both worklists
    ///
    /// Both worklists are empty afterwards. Cancellation is checked between
    /// entries and aborts the round.
    pub fn handle(
        &mut self,
        engine: &mut PropagationEngine,
        hooks: &mut SerializationHooks,
        monitor: &mut dyn ProgressMonitor,
    ) -> Result<HandlerRound> {
        let serialization = hooks.worklists_mut().drain_serialization();
        let deserialization = hooks.worklists_mut().drain_deserialization();
        let mut round = HandlerRound {
            serialization_entries: serialization.len(),
            deserialization_entries: deserialization.len(),
            changed: BTreeSet::new(),
        };

        monitor.sub_task("serialization");
        for work in &serialization {
            if monitor.is_canceled() {
                return Err(SerializationError::Cancelled);
            }
            if self.serialize(engine, hooks, work)? {
                round.changed.insert(work.target);
            }
            monitor.worked(1);
        }

        monitor.sub_task("deserialization");
        for work in &deserialization {
            if monitor.is_canceled() {
                return Err(SerializationError::Cancelled);
            }
            self.deserialize(engine, hooks, work)?;
            round.changed.insert(work.target);
            monitor.worked(1);
        }

        debug!(
            "Handler round: {} serialization, {} deserialization, {} changed",
            round.serialization_entries,
            round.deserialization_entries,
            round.changed.len()
        );
        Ok(round)
    }

    fn model_node(engine: &PropagationEngine, target: NodeId) -> Result<(MethodRef, Context)> {
        let node = engine
            .call_graph()
            .node(target)
            .ok_or(SerializationError::UnknownNode(target))?;
        Ok((node.method.clone(), node.context.clone()))
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Returns whether the model body grew
    fn serialize(
        &mut self,
        engine: &mut PropagationEngine,
        hooks: &mut SerializationHooks,
        work: &SerializationWork,
    ) -> Result<bool> {
        let (method, context) = Self::model_node(engine, work.target)?;
        let Some(&argument) = work.invoke.params.get(1) else {
            return Ok(false);
        };
        let pointer = PointerKey::local(work.caller, argument);
        self.serialized.insert(pointer.clone());

        // Objects with a real allocation site, grouped by allocated type
        let mut by_type: BTreeMap<TypeRef, BTreeSet<InstanceKeyId>> = BTreeMap::new();
        for key in engine.points_to(&pointer) {
            let Some(sites) = engine.creation_sites(key) else {
                continue;
            };
            for site in sites {
                by_type
                    .entry(site.site.declared_type)
                    .or_default()
                    .insert(key);
            }
        }

        let before = hooks
            .models()
            .method(&method)
            .map_or(0, |m| m.statement_count(&context));

        for (ty, keys) in &by_type {
            let cast = self.serialized_cast(engine, hooks, work.target, &method, &context, ty);
            let Some(cast) = cast else {
                continue;
            };
            if TypeCategory::of(engine.hierarchy(), ty) != TypeCategory::Object {
                continue;
            }
            self.serialize_fields(engine, hooks, work.target, &method, &context, ty, keys, cast);
        }

        let after = hooks
            .models()
            .method(&method)
            .map_or(0, |m| m.statement_count(&context));
        if after > before {
            engine.invalidate(&method, &context);
            debug!(
                "Serialization model {:?} grew by {} for {}",
                work.target,
                after - before,
                pointer
            );
            return Ok(true);
        }
        Ok(false)
    }

    /// Cast of `v2` to `ty` plus its `writeReplace`/`writeObject` calls, emitted once
    fn serialized_cast(
        &mut self,
        engine: &PropagationEngine,
        hooks: &mut SerializationHooks,
        target: NodeId,
        method: &MethodRef,
        context: &Context,
        ty: &TypeRef,
    ) -> Option<ValueId> {
        if let Some(cast) = self.serialized_casts.get(&(target, ty.clone())) {
            return Some(*cast);
        }
        let hierarchy = engine.hierarchy();
        let model = hooks.models_mut().method_mut(method)?;
        let cast = model.checkcast(context, vec![ty.clone()], SERIALIZED_VALUE);
        if let Some(replace) = callback(hierarchy, ty, &write_replace_callback()) {
            model.invoke(context, replace, Dispatch::Special, vec![cast]);
        }
        if let Some(write) = callback(hierarchy, ty, &write_object_callback()) {
            model.invoke(context, write, Dispatch::Special, vec![cast, STREAM_VALUE]);
        }
        self.serialized_casts.insert((target, ty.clone()), cast);
        Some(cast)
    }

    /// Field objects of `ty` whose types declare `writeObject`
    #[allow(clippy::too_many_arguments)]
    fn serialize_fields(
        &mut self,
        engine: &PropagationEngine,
        hooks: &mut SerializationHooks,
        target: NodeId,
        method: &MethodRef,
        context: &Context,
        ty: &TypeRef,
        keys: &BTreeSet<InstanceKeyId>,
        cast: ValueId,
    ) {
        let hierarchy = engine.hierarchy();
        let selector = write_object_callback();
        for field in hierarchy.all_instance_fields(ty) {
            if field.field_type().is_primitive() {
                continue;
            }
            let mut inner_types = BTreeSet::new();
            for key in keys {
                let field_pointer = PointerKey::field(*key, field.reference.clone());
                for object in engine.points_to(&field_pointer) {
                    if let Some(instance) = engine.instance_key(object) {
                        inner_types.insert(instance.concrete_type().clone());
                    }
                }
                self.serialized.insert(field_pointer);
            }

            for inner in inner_types {
                let Some(write) = callback(hierarchy, &inner, &selector) else {
                    continue;
                };
                let id = (target, ty.clone(), field.reference.clone(), inner.clone());
                if !self.serialized_fields.insert(id) {
                    continue;
                }
                let Some(model) = hooks.models_mut().method_mut(method) else {
                    return;
                };
                let value = model.get_field(context, field.reference.clone(), cast);
                let narrowed = model.checkcast(context, vec![inner], value);
                model.invoke(context, write, Dispatch::Special, vec![narrowed, STREAM_VALUE]);
            }
        }
    }

    // ========================================================================
    // Deserialization
    // ========================================================================

    fn deserialize(
        &mut self,
        engine: &mut PropagationEngine,
        hooks: &mut SerializationHooks,
        work: &DeserializationWork,
    ) -> Result<()> {
        let (method, context) = Self::model_node(engine, work.target)?;
        let (classes, origin) = self.expected_classes(engine, work)?;

        let mut allocated = false;
        for class in classes {
            if self
                .allocations
                .get(&work.target)
                .is_some_and(|types| types.contains_key(&class))
            {
                continue;
            }
            if let Some(value) =
                self.instantiate(engine, hooks, work.target, &method, &context, &class, origin)
            {
                self.allocations
                    .entry(work.target)
                    .or_default()
                    .insert(class, value);
                self.deserialized
                    .insert(PointerKey::local(work.target, value));
                allocated = true;
            }
        }

        if allocated {
            let values: Vec<ValueId> = self
                .allocations
                .get(&work.target)
                .map(|types| types.values().copied().collect())
                .unwrap_or_default();
            if let Some(model) = hooks.models_mut().method_mut(&method) {
                let result = match values.as_slice() {
                    [single] => *single,
                    _ => model.phi(&context, values),
                };
                model.return_value(&context, Some(result));
            }
        }

        engine.invalidate(&method, &context);
        Ok(())
    }

    /// Classes the caller expects back from `readObject()`
    ///
    /// Concrete subtypes of every cast type found in the forward slice of the
    /// call result. Without casts the caller's own class is used.
    fn expected_classes(
        &self,
        engine: &PropagationEngine,
        work: &DeserializationWork,
    ) -> Result<(BTreeSet<TypeRef>, ExpectedOrigin)> {
        let hierarchy = engine.hierarchy();
        let cast_types: BTreeSet<TypeRef> = match work.invoke.def {
            Some(def) => DataDependenceSlicer::new(engine)
                .forward_slice(SliceSeed {
                    node: work.caller,
                    value: def,
                })
                .iter()
                .filter_map(|statement| statement.instruction.cast_types())
                .flatten()
                .cloned()
                .collect(),
            None => BTreeSet::new(),
        };

        if cast_types.is_empty() {
            let caller = engine
                .call_graph()
                .node(work.caller)
                .ok_or(SerializationError::UnknownNode(work.caller))?;
            let fallback = caller.method.declaring_class.clone();
            debug!(
                "No casts on readObject() result in {}; assuming {}",
                caller, fallback
            );
            let classes = match TypeCategory::of(hierarchy, &fallback) {
                TypeCategory::Primitive | TypeCategory::Array | TypeCategory::Ignored => {
                    BTreeSet::new()
                }
                _ => BTreeSet::from([fallback]),
            };
            return Ok((classes, ExpectedOrigin::CallerClass));
        }

        let mut classes = BTreeSet::new();
        for cast in &cast_types {
            match TypeCategory::of(hierarchy, cast) {
                TypeCategory::Primitive | TypeCategory::Ignored => {}
                TypeCategory::Array => {
                    classes.insert(cast.clone());
                }
                _ => classes.extend(hierarchy.concrete_subtypes(cast)),
            }
        }
        Ok((classes, ExpectedOrigin::Cast))
    }

    /// Allocation, lifecycle callbacks and field instrumentation for one class
    #[allow(clippy::too_many_arguments)]
    fn instantiate(
        &mut self,
        engine: &mut PropagationEngine,
        hooks: &mut SerializationHooks,
        target: NodeId,
        method: &MethodRef,
        context: &Context,
        class: &TypeRef,
        origin: ExpectedOrigin,
    ) -> Option<ValueId> {
        let (callbacks, fields) = {
            let hierarchy = engine.hierarchy();
            let callbacks: Vec<(MethodRef, bool)> = [
                (read_object_callback(), true),
                (read_object_no_data_callback(), false),
                (read_resolve_callback(), false),
                (validate_object_callback(), false),
            ]
            .into_iter()
            .filter_map(|(selector, with_stream)| {
                callback(hierarchy, class, &selector).map(|m| (m, with_stream))
            })
            .collect();
            let fields = if origin.instruments_fields(TypeCategory::of(hierarchy, class)) {
                self.field_plans(hierarchy, class)
            } else {
                Vec::new()
            };
            (callbacks, fields)
        };

        let (value, site) = {
            let model = hooks.models_mut().method_mut(method)?;
            let value = model.allocate(engine.hierarchy(), context, class)?;
            for (callback, with_stream) in callbacks {
                let params = if with_stream {
                    vec![value, STREAM_VALUE]
                } else {
                    vec![value]
                };
                model.invoke(context, callback, Dispatch::Special, params);
            }
            let site = model
                .context_state(context)
                .and_then(|state| state.new_site_of(value))
                .cloned();
            (value, site)
        };
        if fields.is_empty() {
            return Some(value);
        }

        let key = site.and_then(|site| engine.instance_key_for_allocation(target, &site, &*hooks));
        let Some(key) = key else {
            warn!(
                "No abstract object for {} in {:?}; skipping its fields",
                class, target
            );
            return Some(value);
        };

        for plan in fields {
            self.deserialized
                .insert(PointerKey::field(key, plan.field.clone()));
            for (ty, read) in plan.targets {
                let Some(model) = hooks.models_mut().method_mut(method) else {
                    break;
                };
                let loaded = model.get_field(context, plan.field.clone(), value);
                engine.add_concrete_type_fact(PointerKey::local(target, loaded), ty.clone());
                let narrowed = model.checkcast(context, vec![ty], loaded);
                model.invoke(context, read, Dispatch::Special, vec![narrowed, STREAM_VALUE]);
            }
        }
        Some(value)
    }

    /// Non-primitive fields of `class` with at least one type declaring `readObject`
    fn field_plans(&self, hierarchy: &ClassHierarchy, class: &TypeRef) -> Vec<FieldPlan> {
        let selector = read_object_callback();
        hierarchy
            .all_instance_fields(class)
            .into_iter()
            .filter(|field| !field.field_type().is_primitive())
            .filter_map(|field| {
                let targets: Vec<(TypeRef, MethodRef)> = self
                    .resolver
                    .possible_types_for_field(hierarchy, class, field)
                    .into_iter()
                    .filter_map(|ty| callback(hierarchy, &ty, &selector).map(|m| (ty, m)))
                    .collect();
                (!targets.is_empty()).then(|| FieldPlan {
                    field: field.reference.clone(),
                    targets,
                })
            })
            .collect()
    }
}
