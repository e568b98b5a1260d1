//! Instance-key factories

use crate::features::callgraph::domain::CallGraphNode;
use crate::features::ir::NewSiteRef;
use crate::features::points_to::domain::InstanceKey;
use crate::features::points_to::ports::{ContextInterpreter, InstanceKeyFactory, ProgramView};
use crate::shared::models::TypeRef;
use std::sync::Arc;

fn pei_key(node: &CallGraphNode, pc: u32, exception: &TypeRef) -> InstanceKey {
    InstanceKey::Pei {
        node: node.id,
        pc,
        concrete_type: exception.clone(),
    }
}

/// One abstract object per (node, allocation site)
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationSiteInstanceKeys;

impl InstanceKeyFactory for AllocationSiteInstanceKeys {
    fn describe(&self) -> String {
        "allocation-in-node".to_string()
    }

    fn for_allocation(
        &self,
        node: &CallGraphNode,
        site: &NewSiteRef,
        _program: &ProgramView<'_>,
    ) -> Option<InstanceKey> {
        Some(InstanceKey::AllocationInNode {
            node: node.id,
            site: site.clone(),
        })
    }

    fn for_pei(&self, node: &CallGraphNode, pc: u32, exception: &TypeRef) -> Option<InstanceKey> {
        Some(pei_key(node, pc, exception))
    }
}

/// One abstract object per concrete type
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassBasedInstanceKeys;

impl InstanceKeyFactory for ClassBasedInstanceKeys {
    fn describe(&self) -> String {
        "class-based".to_string()
    }

    fn for_allocation(
        &self,
        _node: &CallGraphNode,
        site: &NewSiteRef,
        _program: &ProgramView<'_>,
    ) -> Option<InstanceKey> {
        Some(InstanceKey::ClassBased {
            concrete_type: site.declared_type.clone(),
        })
    }

    fn for_pei(&self, _node: &CallGraphNode, _pc: u32, exception: &TypeRef) -> Option<InstanceKey> {
        Some(InstanceKey::ClassBased {
            concrete_type: exception.clone(),
        })
    }
}

/// Allocation-site keys, smushed into one class-based key per type once a
/// node allocates more than `bound` sites of that type
pub struct ZeroXInstanceKeys {
    bound: u32,
    interpreter: Arc<dyn ContextInterpreter>,
}

impl ZeroXInstanceKeys {
    pub fn new(bound: u32, interpreter: Arc<dyn ContextInterpreter>) -> Self {
        Self { bound, interpreter }
    }

    pub fn bound(&self) -> u32 {
        self.bound
    }

    /// Whether `key` stands for a single allocation site
    pub fn distinguishes(&self, key: &InstanceKey) -> bool {
        key.is_allocation()
    }

    pub(crate) fn describe_bound(&self) -> String {
        format!("0-{}", self.bound)
    }
}

impl InstanceKeyFactory for ZeroXInstanceKeys {
    fn describe(&self) -> String {
        format!(
            "zero-x({}, via {})",
            self.bound,
            self.interpreter.describe()
        )
    }

    fn for_allocation(
        &self,
        node: &CallGraphNode,
        site: &NewSiteRef,
        program: &ProgramView<'_>,
    ) -> Option<InstanceKey> {
        let same_type = self
            .interpreter
            .new_sites(node, program)
            .iter()
            .filter(|s| s.declared_type == site.declared_type)
            .count();
        if same_type > self.bound as usize {
            return Some(InstanceKey::ClassBased {
                concrete_type: site.declared_type.clone(),
            });
        }
        Some(InstanceKey::AllocationSite {
            method: node.method.clone(),
            site: site.clone(),
        })
    }

    fn for_pei(&self, node: &CallGraphNode, pc: u32, exception: &TypeRef) -> Option<InstanceKey> {
        Some(pei_key(node, pc, exception))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::callgraph::domain::{Context, NodeId, NodeKind};
    use crate::features::hierarchy::{ClassHierarchy, ClassInfo, MethodInfo};
    use crate::features::ir::{InstructionFactory, MethodBody};
    use crate::features::points_to::infrastructure::DefaultContextInterpreter;
    use crate::features::points_to::ports::NoSyntheticBodies;
    use crate::shared::models::{MethodRef, Selector};

    fn hierarchy_with_sites(count: usize) -> (ClassHierarchy, CallGraphNode) {
        let owner = TypeRef::new("Lapp/Factory");
        let factory = InstructionFactory;
        let mut body = MethodBody::new(1);
        for i in 0..count {
            body = body.with(factory.new_object(
                i,
                10 + i as u32,
                NewSiteRef::new(i as u32, TypeRef::new("Lapp/Item")),
            ));
        }
        let selector = Selector::new("make", "()V");
        let mut cha = ClassHierarchy::with_primordial_stubs();
        cha.add_class(
            ClassInfo::new(owner.clone())
                .method(MethodInfo::new(&owner, selector.clone()).with_body(body)),
        );
        cha.add_class(ClassInfo::new("Lapp/Item"));
        let node = CallGraphNode {
            id: NodeId(0),
            method: MethodRef::new(owner, selector),
            context: Context::Everywhere,
            kind: NodeKind::Ordinary,
        };
        (cha, node)
    }

    #[test]
    fn test_zero_x_keeps_sites_under_bound() {
        let (cha, node) = hierarchy_with_sites(2);
        let program = ProgramView {
            hierarchy: &cha,
            synthetic: &NoSyntheticBodies,
        };
        let keys = ZeroXInstanceKeys::new(2, Arc::new(DefaultContextInterpreter));
        let key = keys
            .for_allocation(&node, &NewSiteRef::new(1, TypeRef::new("Lapp/Item")), &program)
            .unwrap();
        assert!(matches!(key, InstanceKey::AllocationSite { .. }));
        assert!(keys.distinguishes(&key));
    }

    #[test]
    fn test_zero_x_smushes_over_bound() {
        let (cha, node) = hierarchy_with_sites(3);
        let program = ProgramView {
            hierarchy: &cha,
            synthetic: &NoSyntheticBodies,
        };
        let keys = ZeroXInstanceKeys::new(2, Arc::new(DefaultContextInterpreter));
        let key = keys
            .for_allocation(&node, &NewSiteRef::new(0, TypeRef::new("Lapp/Item")), &program)
            .unwrap();
        assert_eq!(
            key,
            InstanceKey::ClassBased {
                concrete_type: TypeRef::new("Lapp/Item")
            }
        );
        assert!(!keys.distinguishes(&key));
    }

    #[test]
    fn test_constant_and_metadata_defaults() {
        let ty = TypeRef::new("Ljava/lang/String");
        let keys = ClassBasedInstanceKeys;
        assert!(matches!(
            keys.for_constant(&ty),
            Some(InstanceKey::Constant { .. })
        ));
        assert!(matches!(
            keys.for_metadata(&ty),
            Some(InstanceKey::Metadata { .. })
        ));
    }

    // ============================================================
    // EDGE CASES
    // ============================================================

    #[test]
    fn test_zero_bound_smushes_everything() {
        let (cha, node) = hierarchy_with_sites(1);
        let program = ProgramView {
            hierarchy: &cha,
            synthetic: &NoSyntheticBodies,
        };
        let keys = ZeroXInstanceKeys::new(0, Arc::new(DefaultContextInterpreter));
        let key = keys
            .for_allocation(&node, &NewSiteRef::new(0, TypeRef::new("Lapp/Item")), &program)
            .unwrap();
        assert!(matches!(key, InstanceKey::ClassBased { .. }));
    }
}
