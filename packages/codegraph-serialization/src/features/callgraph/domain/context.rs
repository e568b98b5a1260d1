//! Calling contexts

use crate::features::callgraph::domain::NodeId;
use crate::features::points_to::domain::InstanceKeyId;
use crate::shared::models::MethodRef;
use std::fmt;

/// One call-string element: the calling method and the call-site pc
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallStringElement {
    pub method: MethodRef,
    pub pc: u32,
}

/// Calling context of a call-graph node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Context {
    /// Context-insensitive
    Everywhere,

    /// Most recent call sites, oldest first
    CallString(Vec<CallStringElement>),

    /// One node per calling node and call-site pc
    CallerSite { caller: NodeId, pc: u32 },

    /// Receiver-object sensitivity
    Receiver(InstanceKeyId),
}

impl Default for Context {
    fn default() -> Self {
        Context::Everywhere
    }
}

impl Context {
    pub fn call_string(&self) -> &[CallStringElement] {
        match self {
            Context::CallString(elements) => elements,
            _ => &[],
        }
    }

    /// Push a call site (with k-limiting)
    pub fn push_call_site(&self, method: &MethodRef, pc: u32, limit: usize) -> Context {
        if limit == 0 {
            return Context::Everywhere;
        }
        let mut elements = self.call_string().to_vec();
        elements.push(CallStringElement {
            method: method.clone(),
            pc,
        });

        // Keep only the last k elements
        if elements.len() > limit {
            let excess = elements.len() - limit;
            elements.drain(..excess);
        }
        Context::CallString(elements)
    }

    pub fn depth(&self) -> usize {
        match self {
            Context::Everywhere => 0,
            Context::CallString(elements) => elements.len(),
            Context::CallerSite { .. } | Context::Receiver(_) => 1,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Everywhere => write!(f, "Everywhere"),
            Context::CallString(elements) => {
                let parts: Vec<String> = elements
                    .iter()
                    .map(|e| format!("{}@{}", e.method, e.pc))
                    .collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Context::CallerSite { caller, pc } => write!(f, "caller={}@{}", caller.0, pc),
            Context::Receiver(key) => write!(f, "receiver={}", key.0),
        }
    }
}
