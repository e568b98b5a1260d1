pub mod builder;
pub mod facades;

pub use builder::{
    DelegatingPolicies, DelegationBuilder, NeedsContextSelectors, NeedsInstanceKeys,
    NeedsInterpreters,
};
pub use facades::{
    DelegatingContextInterpreter, DelegatingContextSelector, DelegatingInstanceKeyFactory,
};
