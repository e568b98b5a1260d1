//! Dual-policy delegation
//!
//! Every precision-sensitive query the engine asks (callee context,
//! abstract object, node body) is answered by the primary policy for
//! ordinary nodes and by the secondary policy for model nodes. The three
//! facades are assembled by a staged builder: interpreters, then instance
//! keys, then context selectors.

pub mod domain;
pub mod infrastructure;

pub use domain::PolicySide;
pub use infrastructure::{
    DelegatingContextInterpreter, DelegatingContextSelector, DelegatingInstanceKeyFactory,
    DelegatingPolicies, DelegationBuilder,
};
