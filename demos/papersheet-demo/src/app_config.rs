use crate::beans::{CustomPropertyDemo, ExamplePrototypeBean, ProfileDemo, WelcomeController};
use crate::cache::CacheableService;
use crate::greeting::GreetingService;
use papersheet::prelude::*;

/// Every definition of the demo application.
pub fn configure(builder: ApplicationBuilder) -> ApplicationBuilder {
    let [dev, prod] = ProfileDemo::definitions();
    builder
        .register(GreetingService::definition())
        .register(ExamplePrototypeBean::definition())
        .register(CustomPropertyDemo::definition())
        .register(dev)
        .register(prod)
        .register(CacheableService::definition())
        .register(WelcomeController::definition())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn start(pairs: &[(&str, &str)]) -> papersheet::Result<Application> {
        let properties: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        configure(Application::builder().properties(properties)).start()
    }

    fn base_config() -> Vec<(&'static str, &'static str)> {
        vec![
            ("custom.property", "demo value"),
            ("cache.simulated-delay-ms", "1"),
            ("papersheet.profiles.active", "prod"),
        ]
    }

    #[test]
    fn test_greeting_lifecycle_order() {
        let app = start(&base_config()).unwrap();
        let greeting = app.get::<GreetingService>().unwrap();
        assert_eq!(greeting.greet(), "Hello from PaperSheet application!");
        assert_eq!(
            greeting.events(),
            vec![
                "constructor",
                "post_construct",
                "after_properties_set",
                "custom_init"
            ]
        );

        app.shutdown();
        assert_eq!(
            &greeting.events()[4..],
            &["pre_destroy", "destroy", "custom_destroy"]
        );
    }

    #[test]
    fn test_prototype_beans_differ() {
        let app = start(&base_config()).unwrap();
        let first = app.get::<ExamplePrototypeBean>().unwrap();
        let second = app.get::<ExamplePrototypeBean>().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_profile_and_property() {
        let app = start(&base_config()).unwrap();
        assert_eq!(app.get::<ProfileDemo>().unwrap().profile(), "prod");
        assert_eq!(
            app.get::<CustomPropertyDemo>().unwrap().custom_property(),
            "demo value"
        );
    }

    #[test]
    fn test_missing_custom_property_fails_startup() {
        let result = start(&[("papersheet.profiles.active", "dev")]);
        assert!(matches!(
            result,
            Err(PapersheetError::MissingProperty { .. })
        ));
    }

    #[test]
    fn test_cache_computes_once() {
        let app = start(&base_config()).unwrap();
        let cache = app.get::<CacheableService>().unwrap();
        assert_eq!(cache.cached_data(), "Cached Data");
        assert_eq!(cache.cached_data(), "Cached Data");
        assert_eq!(cache.computations(), 1);
    }

    #[test]
    fn test_derived_controller_is_lazy() {
        let app = start(&base_config()).unwrap();
        let before = app.registry().singleton_count();

        let controller = app.get::<WelcomeController>().unwrap();
        assert_eq!(app.registry().singleton_count(), before + 1);
        assert_eq!(
            controller.welcome(),
            "Hello from PaperSheet application! (demo value) [visit #1]"
        );
        assert!(controller.welcome().ends_with("[visit #2]"));
    }
}
