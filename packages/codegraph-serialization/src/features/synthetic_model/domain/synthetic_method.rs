//! Synthetic method bodies, one per calling context
//!
//! Every operation appends to the body of one context and returns the value
//! number it produced. Bodies never shrink. Apart from integer constants,
//! nothing is deduplicated: callers must not re-emit what is already there.

use crate::errors::Result;
use crate::features::callgraph::domain::Context;
use crate::features::hierarchy::ClassHierarchy;
use crate::features::ir::{Dispatch, Instruction, InstructionFactory, MethodBody, NewSiteRef, ValueId};
use crate::shared::models::names;
use crate::shared::models::{FieldRef, MethodRef, TypeRef};
use rustc_hash::FxHashMap;
use tracing::warn;

/// Mutable body of one context
#[derive(Debug, Clone)]
pub struct ContextState {
    instructions: Vec<Instruction>,

    /// Constant → value number holding it
    constants: FxHashMap<i64, ValueId>,

    next_local: ValueId,
    factory: InstructionFactory,
}

impl ContextState {
    fn new(first_local: ValueId) -> Self {
        Self {
            instructions: Vec::new(),
            constants: FxHashMap::default(),
            next_local: first_local,
            factory: InstructionFactory,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Next value number that will be handed out
    pub fn next_local(&self) -> ValueId {
        self.next_local
    }

    fn fresh_local(&mut self) -> ValueId {
        let local = self.next_local;
        self.next_local += 1;
        local
    }

    fn next_index(&self) -> usize {
        self.instructions.len()
    }

    /// Allocation site that defines `value`
    pub fn new_site_of(&self, value: ValueId) -> Option<&NewSiteRef> {
        self.instructions.iter().find_map(|inst| match inst {
            Instruction::New { def, site, .. } if *def == value => Some(site),
            _ => None,
        })
    }

    /// Value number holding `value`, materialized on first use
    pub fn int_constant(&mut self, value: i64) -> ValueId {
        if let Some(local) = self.constants.get(&value) {
            return *local;
        }
        let local = self.fresh_local();
        self.constants.insert(value, local);
        local
    }

    /// `new T`, or `new T[1]..[1]` with element objects stored at index 0
    ///
    /// Returns None (and appends nothing) when `ty` is not in the hierarchy.
    pub fn allocate(&mut self, hierarchy: &ClassHierarchy, ty: &TypeRef) -> Option<ValueId> {
        if ty.is_primitive() || !hierarchy.is_resolvable(ty) {
            warn!("Skipping allocation of unresolvable type {}", ty);
            return None;
        }
        if ty.is_array() {
            return Some(self.allocate_array(ty));
        }

        let def = self.fresh_local();
        let index = self.next_index();
        self.instructions.push(self.factory.new_object(
            index,
            def,
            NewSiteRef::new(index as u32, ty.clone()),
        ));
        self.construct(hierarchy, ty, def);
        Some(def)
    }

    fn allocate_array(&mut self, ty: &TypeRef) -> ValueId {
        let outer = self.new_array_level(ty);
        let mut array = outer;
        let mut element = ty.element_type();
        while let Some(current) = element.filter(|e| !e.is_primitive()) {
            let value = if current.is_array() {
                self.new_array_level(&current)
            } else {
                let def = self.fresh_local();
                let index = self.next_index();
                self.instructions.push(self.factory.new_object(
                    index,
                    def,
                    NewSiteRef::new(index as u32, current.clone()),
                ));
                def
            };
            let zero = self.int_constant(0);
            let index = self.next_index();
            self.instructions.push(self.factory.array_store(
                index,
                array,
                zero,
                value,
                current.clone(),
            ));
            array = value;
            element = current.element_type();
        }
        outer
    }

    fn new_array_level(&mut self, ty: &TypeRef) -> ValueId {
        let length = self.int_constant(1);
        let def = self.fresh_local();
        let index = self.next_index();
        self.instructions.push(self.factory.new_array(
            index,
            def,
            NewSiteRef::new(index as u32, ty.clone()),
            vec![length; ty.dimensionality()],
        ));
        def
    }

    /// Special call to the nearest no-argument constructor, else the first declared one
    fn construct(&mut self, hierarchy: &ClassHierarchy, ty: &TypeRef, instance: ValueId) {
        let default = names::default_constructor();
        let constructor = hierarchy
            .resolve_method(ty, &default)
            .map(|m| m.reference.clone())
            .or_else(|| {
                hierarchy.lookup(ty).and_then(|class| {
                    class
                        .methods
                        .iter()
                        .find(|m| m.selector().is_constructor())
                        .map(|m| m.reference.clone())
                })
            });
        if let Some(constructor) = constructor {
            self.invoke(constructor, Dispatch::Special, vec![instance]);
        }
    }

    /// Call `target`; returns the result value for non-void targets
    pub fn invoke(
        &mut self,
        target: MethodRef,
        dispatch: Dispatch,
        params: Vec<ValueId>,
    ) -> Option<ValueId> {
        let def = if target.selector.returns_void() {
            None
        } else {
            Some(self.fresh_local())
        };
        let exception = self.fresh_local();
        let index = self.next_index();
        self.instructions.push(
            self.factory
                .invoke(index, def, params, exception, target, dispatch),
        );
        def
    }

    /// `(T1|..|Tn) value`; may raise ClassCastException
    pub fn checkcast(&mut self, types: Vec<TypeRef>, value: ValueId) -> ValueId {
        let def = self.fresh_local();
        let index = self.next_index();
        self.instructions
            .push(self.factory.check_cast(index, def, value, types));
        def
    }

    pub fn get_field(&mut self, field: FieldRef, object: ValueId) -> ValueId {
        let def = self.fresh_local();
        let index = self.next_index();
        self.instructions
            .push(self.factory.get_field(index, def, object, field));
        def
    }

    pub fn phi(&mut self, values: Vec<ValueId>) -> ValueId {
        let def = self.fresh_local();
        let index = self.next_index();
        self.instructions.push(self.factory.phi(index, def, values));
        def
    }

    /// Terminal return; returns the instruction index
    pub fn return_value(&mut self, value: Option<ValueId>) -> usize {
        let index = self.next_index();
        self.instructions
            .push(self.factory.return_value(index, value));
        index
    }

    fn body(&self, parameter_count: usize) -> MethodBody {
        MethodBody {
            instructions: self.instructions.clone(),
            constants: self
                .constants
                .iter()
                .map(|(constant, local)| (*local, *constant))
                .collect(),
            parameter_count,
        }
    }
}

/// Synthetic stand-in for one stream entry point
#[derive(Debug, Clone)]
pub struct SyntheticMethod {
    reference: MethodRef,
    declared_exceptions: Vec<TypeRef>,

    /// Including `this`
    parameter_count: usize,

    initial_next_local: ValueId,
    states: FxHashMap<Context, ContextState>,
}

impl SyntheticMethod {
    /// Instance method `reference` throwing `declared_exceptions`
    pub fn new(reference: MethodRef, declared_exceptions: Vec<TypeRef>) -> Result<Self> {
        let parameter_count = reference.declared_parameter_count()? + 1;
        let initial_next_local = (parameter_count + declared_exceptions.len() + 1) as ValueId;
        Ok(Self {
            reference,
            declared_exceptions,
            parameter_count,
            initial_next_local,
            states: FxHashMap::default(),
        })
    }

    pub fn reference(&self) -> &MethodRef {
        &self.reference
    }

    pub fn declared_exceptions(&self) -> &[TypeRef] {
        &self.declared_exceptions
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    /// First local handed out in a fresh context
    pub fn initial_next_local(&self) -> ValueId {
        self.initial_next_local
    }

    /// Body of `context`, created empty on first access
    pub fn context_state_mut(&mut self, context: &Context) -> &mut ContextState {
        let first_local = self.initial_next_local;
        self.states
            .entry(context.clone())
            .or_insert_with(|| ContextState::new(first_local))
    }

    pub fn context_state(&self, context: &Context) -> Option<&ContextState> {
        self.states.get(context)
    }

    /// Whether anything was ever emitted for `context`
    pub fn is_model_computed(&self, context: &Context) -> bool {
        self.states.contains_key(context)
    }

    pub fn statement_count(&self, context: &Context) -> usize {
        self.states.get(context).map_or(0, ContextState::len)
    }

    /// Current body of `context`; empty for untouched contexts
    pub fn body(&self, context: &Context) -> MethodBody {
        match self.states.get(context) {
            Some(state) => state.body(self.parameter_count),
            None => MethodBody::new(self.parameter_count),
        }
    }

    pub fn allocate(
        &mut self,
        hierarchy: &ClassHierarchy,
        context: &Context,
        ty: &TypeRef,
    ) -> Option<ValueId> {
        if ty.is_primitive() || !hierarchy.is_resolvable(ty) {
            warn!("{}: cannot allocate unresolvable type {}", self.reference, ty);
            return None;
        }
        self.context_state_mut(context).allocate(hierarchy, ty)
    }

    pub fn invoke(
        &mut self,
        context: &Context,
        target: MethodRef,
        dispatch: Dispatch,
        params: Vec<ValueId>,
    ) -> Option<ValueId> {
        self.context_state_mut(context)
            .invoke(target, dispatch, params)
    }

    pub fn checkcast(&mut self, context: &Context, types: Vec<TypeRef>, value: ValueId) -> ValueId {
        self.context_state_mut(context).checkcast(types, value)
    }

    pub fn get_field(&mut self, context: &Context, field: FieldRef, object: ValueId) -> ValueId {
        self.context_state_mut(context).get_field(field, object)
    }

    pub fn phi(&mut self, context: &Context, values: Vec<ValueId>) -> ValueId {
        self.context_state_mut(context).phi(values)
    }

    pub fn return_value(&mut self, context: &Context, value: Option<ValueId>) -> usize {
        self.context_state_mut(context).return_value(value)
    }

    pub fn int_constant(&mut self, context: &Context, value: i64) -> ValueId {
        self.context_state_mut(context).int_constant(value)
    }
}
