//! Active profile selection.
//!
//! A definition may be restricted to one or more profile expressions. An
//! expression is either a profile name (`dev`) or a negated name (`!prod`).
//! The definition is active when any of its expressions matches.

use crate::config::PropertySource;

/// Property consulted for the active profile list when none is given explicitly.
pub const ACTIVE_PROFILES_KEY: &str = "papersheet.profiles.active";

/// Profile active when nothing else is configured.
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profiles {
    active: Vec<String>,
}

impl Profiles {
    pub fn new<I, S>(active: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let active: Vec<String> = active
            .into_iter()
            .map(Into::into)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if active.is_empty() {
            return Self::default();
        }
        Self { active }
    }

    /// Read the comma separated list under [`ACTIVE_PROFILES_KEY`].
    pub fn from_source(source: &dyn PropertySource) -> Self {
        match source.lookup(ACTIVE_PROFILES_KEY) {
            Some(list) => Self::new(list.split(',')),
            None => Self::default(),
        }
    }

    pub fn is_active(&self, profile: &str) -> bool {
        self.active.iter().any(|p| p == profile)
    }

    /// Whether a definition guarded by `expressions` should be registered.
    ///
    /// An empty expression list always matches.
    pub fn accepts(&self, expressions: &[String]) -> bool {
        if expressions.is_empty() {
            return true;
        }
        expressions
            .iter()
            .any(|expr| match expr.strip_prefix('!') {
                Some(negated) => !self.is_active(negated.trim()),
                None => self.is_active(expr.trim()),
            })
    }

    pub fn as_slice(&self) -> &[String] {
        &self.active
    }
}

impl Default for Profiles {
    fn default() -> Self {
        Self {
            active: vec![DEFAULT_PROFILE.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn exprs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_profile() {
        let profiles = Profiles::default();
        assert!(profiles.is_active("default"));
        assert!(profiles.accepts(&[]));
        assert!(profiles.accepts(&exprs(&["default"])));
        assert!(!profiles.accepts(&exprs(&["dev"])));
    }

    #[test]
    fn test_blank_list_falls_back_to_default() {
        assert_eq!(Profiles::new([" ", ""]), Profiles::default());
    }

    #[test]
    fn test_from_source() {
        let mut map = HashMap::new();
        map.insert(ACTIVE_PROFILES_KEY.to_string(), "dev, local".to_string());
        let profiles = Profiles::from_source(&map);

        assert_eq!(profiles.as_slice(), &["dev".to_string(), "local".to_string()]);
        assert!(!profiles.is_active("default"));
    }

    #[test]
    fn test_negation() {
        let profiles = Profiles::new(["dev"]);
        assert!(profiles.accepts(&exprs(&["!prod"])));
        assert!(!profiles.accepts(&exprs(&["!dev"])));
        assert!(profiles.accepts(&exprs(&["prod", "dev"])));
    }
}
