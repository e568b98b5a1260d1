use crate::errors::Result;
use crate::features::callgraph::domain::Context;
use crate::features::hierarchy::ClassHierarchy;
use crate::features::ir::MethodBody;
use crate::features::points_to::ports::SyntheticBodies;
use crate::features::synthetic_model::domain::{SyntheticClass, SyntheticMethod};
use crate::shared::models::names::{read_object_entry, write_object_entry};
use crate::shared::models::MethodRef;

/// The two stream models of one analysis run
#[derive(Debug, Clone)]
pub struct StreamModels {
    input: SyntheticClass,
    output: SyntheticClass,
}

impl StreamModels {
    /// Fails when either stream class or its entry point is missing
    pub fn new(hierarchy: &ClassHierarchy) -> Result<Self> {
        Ok(Self {
            input: SyntheticClass::input_stream(hierarchy)?,
            output: SyntheticClass::output_stream(hierarchy)?,
        })
    }

    pub fn input(&self) -> &SyntheticClass {
        &self.input
    }

    pub fn output(&self) -> &SyntheticClass {
        &self.output
    }

    /// Synthetic `readObject()`
    pub fn deserialization_model(&self) -> MethodRef {
        MethodRef::new(self.input.name().clone(), read_object_entry())
    }

    /// Synthetic `writeObject(Object)`
    pub fn serialization_model(&self) -> MethodRef {
        MethodRef::new(self.output.name().clone(), write_object_entry())
    }

    fn class_for(&self, method: &MethodRef) -> Option<&SyntheticClass> {
        [&self.input, &self.output]
            .into_iter()
            .find(|class| class.name() == &method.declaring_class)
    }

    pub fn method(&self, method: &MethodRef) -> Option<&SyntheticMethod> {
        self.class_for(method)?.method(&method.selector)
    }

    pub fn method_mut(&mut self, method: &MethodRef) -> Option<&mut SyntheticMethod> {
        let class = if self.input.name() == &method.declaring_class {
            &mut self.input
        } else if self.output.name() == &method.declaring_class {
            &mut self.output
        } else {
            return None;
        };
        class.method_mut(&method.selector)
    }
}

impl SyntheticBodies for StreamModels {
    fn defines(&self, method: &MethodRef) -> bool {
        self.method(method).is_some()
    }

    fn body(&self, method: &MethodRef, context: &Context) -> Option<MethodBody> {
        self.method(method).map(|m| m.body(context))
    }
}
