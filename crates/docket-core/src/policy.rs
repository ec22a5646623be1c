use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Permanent asset inventory. Imports here always crawl further, so
    /// `recursive` is forced on and cannot be toggled per record.
    #[default]
    Inventory,
    /// Transient working session; `recursive` stays caller-controlled.
    Session,
}

impl Destination {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Session => "session",
        }
    }

    #[must_use]
    pub fn forces_recursive(&self) -> bool {
        matches!(self, Self::Inventory)
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Destination {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inventory" => Ok(Self::Inventory),
            "session" => Ok(Self::Session),
            _ => Err(crate::Error::InvalidDestination(s.to_string())),
        }
    }
}

/// Caller-supplied staging configuration: where commits will land and what
/// `recursive` defaults to when the destination leaves it open.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ImportPolicy {
    pub destination: Destination,
    pub default_recursive: bool,
}

impl ImportPolicy {
    #[must_use]
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            default_recursive: false,
        }
    }

    #[must_use]
    pub fn with_default_recursive(mut self, recursive: bool) -> Self {
        self.default_recursive = recursive;
        self
    }

    #[must_use]
    pub fn effective_recursive(&self) -> bool {
        if self.destination.forces_recursive() {
            true
        } else {
            self.default_recursive
        }
    }
}
