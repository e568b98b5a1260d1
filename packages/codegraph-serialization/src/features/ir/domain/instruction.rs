//! SSA-like instruction set
//!
//! Every instruction carries its 0-based index (`iindex`) and explicit value
//! numbers. Value numbers start at 1; for instance methods `v1` is `this`.

use crate::shared::models::{FieldRef, MethodRef, TypeRef};
use std::fmt;

/// Value number of a local
pub type ValueId = u32;

/// Allocation site within a method body
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NewSiteRef {
    pub pc: u32,
    pub declared_type: TypeRef,
}

impl NewSiteRef {
    pub fn new(pc: u32, declared_type: TypeRef) -> Self {
        Self { pc, declared_type }
    }
}

/// Dispatch kind of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dispatch {
    Virtual,
    Interface,
    Special,
    Static,
}

impl Dispatch {
    /// Whether the target depends on the receiver's runtime type
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Dispatch::Virtual | Dispatch::Interface)
    }

    pub fn has_receiver(&self) -> bool {
        !matches!(self, Dispatch::Static)
    }
}

/// Call site within a method body
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallSiteRef {
    pub pc: u32,
    pub target: MethodRef,
    pub dispatch: Dispatch,
}

impl CallSiteRef {
    pub fn new(pc: u32, target: MethodRef, dispatch: Dispatch) -> Self {
        Self {
            pc,
            target,
            dispatch,
        }
    }
}

impl fmt::Display for CallSiteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{} {}", self.dispatch, self.pc, self.target)
    }
}

/// Call instruction; `params[0]` is the receiver unless the call is static
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvokeInstruction {
    pub iindex: usize,
    pub def: Option<ValueId>,
    pub exception: ValueId,
    pub params: Vec<ValueId>,
    pub site: CallSiteRef,
}

impl InvokeInstruction {
    pub fn receiver(&self) -> Option<ValueId> {
        if self.site.dispatch.has_receiver() {
            self.params.first().copied()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// `def = new T` or `def = new T[d0]..[dn]`
    New {
        iindex: usize,
        def: ValueId,
        site: NewSiteRef,
        dimensions: Vec<ValueId>,
    },
    /// `array[index] = value`
    ArrayStore {
        iindex: usize,
        array: ValueId,
        index: ValueId,
        value: ValueId,
        element_type: TypeRef,
    },
    /// `def = array[index]`
    ArrayLoad {
        iindex: usize,
        def: ValueId,
        array: ValueId,
        index: ValueId,
        element_type: TypeRef,
    },
    /// `def = object.field`
    GetField {
        iindex: usize,
        def: ValueId,
        object: ValueId,
        field: FieldRef,
    },
    /// `object.field = value`
    PutField {
        iindex: usize,
        object: ValueId,
        value: ValueId,
        field: FieldRef,
    },
    /// `def = (T1|..|Tn) value`; may raise ClassCastException
    CheckCast {
        iindex: usize,
        def: ValueId,
        value: ValueId,
        types: Vec<TypeRef>,
    },
    Invoke(InvokeInstruction),
    Phi {
        iindex: usize,
        def: ValueId,
        values: Vec<ValueId>,
    },
    Return {
        iindex: usize,
        value: Option<ValueId>,
    },
    /// `def = value`
    Assign {
        iindex: usize,
        def: ValueId,
        value: ValueId,
    },
}

impl Instruction {
    pub fn iindex(&self) -> usize {
        match self {
            Instruction::New { iindex, .. }
            | Instruction::ArrayStore { iindex, .. }
            | Instruction::ArrayLoad { iindex, .. }
            | Instruction::GetField { iindex, .. }
            | Instruction::PutField { iindex, .. }
            | Instruction::CheckCast { iindex, .. }
            | Instruction::Phi { iindex, .. }
            | Instruction::Return { iindex, .. }
            | Instruction::Assign { iindex, .. } => *iindex,
            Instruction::Invoke(invoke) => invoke.iindex,
        }
    }

    /// Value defined by this instruction
    pub fn def(&self) -> Option<ValueId> {
        match self {
            Instruction::New { def, .. }
            | Instruction::ArrayLoad { def, .. }
            | Instruction::GetField { def, .. }
            | Instruction::CheckCast { def, .. }
            | Instruction::Phi { def, .. }
            | Instruction::Assign { def, .. } => Some(*def),
            Instruction::Invoke(invoke) => invoke.def,
            Instruction::ArrayStore { .. }
            | Instruction::PutField { .. }
            | Instruction::Return { .. } => None,
        }
    }

    /// Values read by this instruction
    pub fn uses(&self) -> Vec<ValueId> {
        match self {
            Instruction::New { dimensions, .. } => dimensions.clone(),
            Instruction::ArrayStore {
                array,
                index,
                value,
                ..
            } => vec![*array, *index, *value],
            Instruction::ArrayLoad { array, index, .. } => vec![*array, *index],
            Instruction::GetField { object, .. } => vec![*object],
            Instruction::PutField { object, value, .. } => vec![*object, *value],
            Instruction::CheckCast { value, .. } => vec![*value],
            Instruction::Invoke(invoke) => invoke.params.clone(),
            Instruction::Phi { values, .. } => values.clone(),
            Instruction::Return { value, .. } => value.iter().copied().collect(),
            Instruction::Assign { value, .. } => vec![*value],
        }
    }

    /// Potentially exception-raising instruction
    pub fn is_pei(&self) -> bool {
        matches!(self, Instruction::CheckCast { .. } | Instruction::Invoke(_))
    }

    pub fn as_invoke(&self) -> Option<&InvokeInstruction> {
        match self {
            Instruction::Invoke(invoke) => Some(invoke),
            _ => None,
        }
    }

    pub fn as_new_site(&self) -> Option<&NewSiteRef> {
        match self {
            Instruction::New { site, .. } => Some(site),
            _ => None,
        }
    }

    pub fn cast_types(&self) -> Option<&[TypeRef]> {
        match self {
            Instruction::CheckCast { types, .. } => Some(types),
            _ => None,
        }
    }
}
