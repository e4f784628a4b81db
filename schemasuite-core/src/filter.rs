//! Skip/only resolution for every level of registration.

use serde::{Deserialize, Serialize};

use crate::registration::Variant;

/// A skip or only directive from configuration: either blanket (`true`) or a
/// list of item names.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Selector {
    /// Applies to everything at the top-level scope when `true`.
    All(bool),
    /// Applies to the named items only.
    Named(Vec<String>),
}

impl Default for Selector {
    fn default() -> Self {
        Self::All(false)
    }
}

impl Selector {
    /// Returns whether this selector is the blanket `true`.
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All(true))
    }

    /// Returns whether this selector names `name`.
    pub fn names(&self, name: &str) -> bool {
        match self {
            Self::All(_) => false,
            Self::Named(names) => names.iter().any(|n| n == name),
        }
    }
}

/// A resolved `{skip, only}` pair for one registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    /// Skip the item.
    pub skip: bool,
    /// Restrict execution to the item.
    pub only: bool,
}

impl Filter {
    /// Creates a filter from explicit flags.
    pub const fn new(skip: bool, only: bool) -> Self {
        Self { skip, only }
    }

    /// Filter for the top-level registration: only blanket selectors apply.
    pub const fn blanket(skip: &Selector, only: &Selector) -> Self {
        Self::new(skip.is_all(), only.is_all())
    }

    /// Filter for a named item: membership in name-list selectors applies.
    pub fn for_name(skip: &Selector, only: &Selector, name: &str) -> Self {
        Self::new(skip.names(name), only.names(name))
    }

    /// Selects the registration variant. `only` wins over `skip`.
    pub const fn variant(self) -> Variant {
        if self.only {
            Variant::Only
        } else if self.skip {
            Variant::Skip
        } else {
            Variant::Normal
        }
    }
}
