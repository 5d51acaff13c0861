use crate::config::{ConfigService, PropertySource};
use crate::di::definition::Definition;
use crate::di::{ObjectDefinition, Registry};
use crate::error::Result;
use crate::profile::Profiles;
use std::sync::Arc;

/// Builder for constructing a registry
///
/// Collects the configuration source, the active profiles and the definitions,
/// then registers everything at once. Duplicate definitions surface from
/// [`RegistryBuilder::build`].
///
/// # Example
/// ```
/// use papersheet::di::{ObjectDefinition, RegistryBuilder};
/// use std::collections::HashMap;
///
/// struct Greeter;
///
/// let registry = RegistryBuilder::new()
///     .properties(HashMap::<String, String>::new())
///     .active_profiles(["dev"])
///     .register(ObjectDefinition::new(|_| Ok(Greeter)))
///     .build()
///     .unwrap();
///
/// assert!(registry.contains::<Greeter>());
/// ```
pub struct RegistryBuilder {
    properties: Option<Arc<dyn PropertySource>>,
    profiles: Option<Profiles>,
    definitions: Vec<Arc<dyn Definition>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            properties: None,
            profiles: None,
            definitions: Vec::new(),
        }
    }

    /// Set the configuration source used for property injection
    pub fn properties(mut self, source: impl PropertySource + 'static) -> Self {
        self.properties = Some(Arc::new(source));
        self
    }

    /// Override the active profiles
    ///
    /// Without this, they are read from the configuration source.
    pub fn active_profiles<I, S>(mut self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profiles = Some(Profiles::new(profiles));
        self
    }

    /// Queue a definition for registration
    pub fn register<T: Send + Sync + 'static>(mut self, definition: ObjectDefinition<T>) -> Self {
        self.definitions.push(Arc::new(definition));
        self
    }

    /// Build the registry
    pub fn build(self) -> Result<Registry> {
        let properties = self
            .properties
            .unwrap_or_else(|| Arc::new(ConfigService::new()));
        let profiles = self
            .profiles
            .unwrap_or_else(|| Profiles::from_source(properties.as_ref()));

        tracing::debug!("Active profiles: {:?}", profiles.as_slice());

        let mut registry = Registry::with_profiles(properties, profiles);
        for definition in self.definitions {
            registry.insert(definition)?;
        }
        Ok(registry)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PapersheetError;
    use crate::profile::ACTIVE_PROFILES_KEY;
    use std::collections::HashMap;

    struct ProfileDemo(&'static str);

    fn profile_demos(builder: RegistryBuilder) -> RegistryBuilder {
        builder
            .register(ObjectDefinition::new(|_| Ok(ProfileDemo("dev"))).profile("dev"))
            .register(ObjectDefinition::new(|_| Ok(ProfileDemo("prod"))).profile("prod"))
    }

    #[test]
    fn test_profiles_from_properties() {
        let mut properties = HashMap::new();
        properties.insert(ACTIVE_PROFILES_KEY.to_string(), "prod".to_string());

        let registry = profile_demos(RegistryBuilder::new().properties(properties))
            .build()
            .unwrap();

        assert_eq!(registry.get::<ProfileDemo>().unwrap().0, "prod");
    }

    #[test]
    fn test_explicit_profiles_win() {
        let mut properties = HashMap::new();
        properties.insert(ACTIVE_PROFILES_KEY.to_string(), "prod".to_string());

        let registry = profile_demos(
            RegistryBuilder::new()
                .properties(properties)
                .active_profiles(["dev"]),
        )
        .build()
        .unwrap();

        assert_eq!(registry.get::<ProfileDemo>().unwrap().0, "dev");
    }

    #[test]
    fn test_no_matching_profile() {
        let registry = profile_demos(RegistryBuilder::new()).build().unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_surfaces_from_build() {
        let result = RegistryBuilder::new()
            .register(ObjectDefinition::new(|_| Ok(ProfileDemo("a"))))
            .register(ObjectDefinition::new(|_| Ok(ProfileDemo("b"))))
            .build();

        assert!(matches!(
            result,
            Err(PapersheetError::DuplicateDefinition { .. })
        ));
    }
}
