pub mod class_hierarchy;
mod primordial;

pub use class_hierarchy::ClassHierarchy;
