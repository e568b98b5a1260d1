use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Family of context-sensitivity policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// k-limited call strings (k-CFA)
    BoundedCallStrings,

    /// Context-insensitive calls with allocation-site objects,
    /// smushed when a method allocates more than `bound` sites of one type
    ZeroXObjectSensitive,

    /// ZeroX objects plus receiver contexts for container methods
    ZeroXContainerSensitive,
}

/// Immutable policy value, written as `2-CFA`, `0-1-CFA` or `0-1-Container-CFA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Policy {
    kind: PolicyKind,
    bound: u32,
}

impl Policy {
    pub const fn new(kind: PolicyKind, bound: u32) -> Self {
        Self { kind, bound }
    }

    pub const fn call_strings(length: u32) -> Self {
        Self::new(PolicyKind::BoundedCallStrings, length)
    }

    pub const fn zero_x(bound: u32) -> Self {
        Self::new(PolicyKind::ZeroXObjectSensitive, bound)
    }

    pub const fn zero_x_container(bound: u32) -> Self {
        Self::new(PolicyKind::ZeroXContainerSensitive, bound)
    }

    pub fn kind(&self) -> PolicyKind {
        self.kind
    }

    pub fn bound(&self) -> u32 {
        self.bound
    }

    /// Whether the policy distinguishes abstract objects per allocation site
    pub fn uses_zero_x_objects(&self) -> bool {
        matches!(
            self.kind,
            PolicyKind::ZeroXObjectSensitive | PolicyKind::ZeroXContainerSensitive
        )
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PolicyKind::BoundedCallStrings => write!(f, "{}-CFA", self.bound),
            PolicyKind::ZeroXObjectSensitive => write!(f, "0-{}-CFA", self.bound),
            PolicyKind::ZeroXContainerSensitive => write!(f, "0-{}-Container-CFA", self.bound),
        }
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let parts: Vec<&str> = lower.split('-').collect();
        let number = |p: &str| {
            p.parse::<u32>()
                .map_err(|_| format!("'{}' is not a valid policy bound in '{}'", p, s))
        };
        match parts.as_slice() {
            [k, "cfa"] => Ok(Policy::call_strings(number(k)?)),
            ["0", x, "cfa"] => Ok(Policy::zero_x(number(x)?)),
            ["0", x, "container", "cfa"] => Ok(Policy::zero_x_container(number(x)?)),
            _ => Err(format!(
                "Unknown policy '{}'. Expected 'k-CFA', '0-x-CFA' or '0-x-Container-CFA'",
                s
            )),
        }
    }
}

impl TryFrom<String> for Policy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Policy> for String {
    fn from(policy: Policy) -> Self {
        policy.to_string()
    }
}
