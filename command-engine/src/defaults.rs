//! Registration table for global default triggers.

use std::collections::BTreeMap;

use crate::capability::CapabilityId;

/// What a default trigger stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultTarget {
    Capability(CapabilityId),
    /// Resolve as if this other default trigger was invoked.
    Alias(String),
}

/// Scope-independent trigger table. Keys are lower-case triggers.
#[derive(Debug, Clone, Default)]
pub struct DefaultCommandTable {
    entries: BTreeMap<String, DefaultTarget>,
}

const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("!command", "!commands"),
    ("!regular", "!regulars"),
    ("!songs", "!songlist"),
    ("!sl", "!songlist"),
    ("!cache", "!songcache"),
    ("!song", "!currentsong"),
    ("!cs", "!currentsong"),
    ("!removesongs", "!removesong"),
    ("!sr", "!songrequest"),
    ("!pr", "!playlistrequest"),
];

impl DefaultCommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every capability under its canonical trigger plus the usual short forms.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for id in CapabilityId::ALL {
            table = table.with_capability(id.trigger(), id);
        }
        for (alias, target) in BUILTIN_ALIASES {
            table = table.with_alias(*alias, *target);
        }
        table
    }

    pub fn with_capability(mut self, trigger: impl AsRef<str>, id: CapabilityId) -> Self {
        self.entries
            .insert(trigger.as_ref().to_lowercase(), DefaultTarget::Capability(id));
        self
    }

    pub fn with_alias(mut self, trigger: impl AsRef<str>, target: impl AsRef<str>) -> Self {
        self.entries.insert(
            trigger.as_ref().to_lowercase(),
            DefaultTarget::Alias(target.as_ref().to_lowercase()),
        );
        self
    }

    pub fn get(&self, trigger: &str) -> Option<&DefaultTarget> {
        self.entries.get(&trigger.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_every_capability() {
        let table = DefaultCommandTable::builtin();
        for id in CapabilityId::ALL {
            assert_eq!(table.get(&id.trigger()), Some(&DefaultTarget::Capability(id)));
        }
        assert_eq!(table.len(), CapabilityId::ALL.len() + BUILTIN_ALIASES.len());
    }

    #[test]
    fn test_builtin_aliases_point_at_capabilities() {
        let table = DefaultCommandTable::builtin();
        for (alias, target) in BUILTIN_ALIASES {
            assert_eq!(table.get(alias), Some(&DefaultTarget::Alias(target.to_string())));
            assert!(matches!(table.get(target), Some(DefaultTarget::Capability(_))));
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = DefaultCommandTable::new().with_capability("!Uptime", CapabilityId::Uptime);
        assert_eq!(
            table.get("!UPTIME"),
            Some(&DefaultTarget::Capability(CapabilityId::Uptime))
        );
        assert_eq!(table.len(), 1);
    }
}
