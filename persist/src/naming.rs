//! Naming strategies for wire names and lookup aliases.

/// Derives the wire name and the lookup aliases of a component type from
/// its bare type name.
pub trait NamingStrategy: Send + Sync {
    /// The name written to the wire when no id is assigned.
    fn canonical_name(&self, type_name: &str) -> String;

    /// Every name the type answers to. Lookup compares case-insensitively.
    fn names_for(&self, type_name: &str) -> Vec<String> {
        let canonical = self.canonical_name(type_name);
        if canonical == type_name {
            vec![canonical]
        } else {
            vec![type_name.to_owned(), canonical]
        }
    }
}

/// Strips a well-known prefix and/or suffix from the type name.
///
/// The default strips the `Component` suffix, so `HealthComponent` is
/// written as `Health` and found under both names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffixNaming {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl AffixNaming {
    /// No stripping: the canonical name is the bare type name.
    pub fn verbatim() -> Self {
        Self {
            prefix: None,
            suffix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

impl Default for AffixNaming {
    fn default() -> Self {
        Self::verbatim().with_suffix("Component")
    }
}

impl NamingStrategy for AffixNaming {
    fn canonical_name(&self, type_name: &str) -> String {
        let mut name = type_name;
        if let Some(prefix) = self.prefix.as_deref() {
            name = name
                .strip_prefix(prefix)
                .filter(|rest| !rest.is_empty())
                .unwrap_or(name);
        }
        if let Some(suffix) = self.suffix.as_deref() {
            name = name
                .strip_suffix(suffix)
                .filter(|rest| !rest.is_empty())
                .unwrap_or(name);
        }
        name.to_owned()
    }
}
