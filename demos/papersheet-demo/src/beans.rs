use crate::greeting::GreetingService;
use papersheet::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Prototype-scoped bean: every request yields a new id.
pub struct ExamplePrototypeBean {
    pub id: Uuid,
}

impl ExamplePrototypeBean {
    pub fn definition() -> ObjectDefinition<Self> {
        ObjectDefinition::new(|_| Ok(Self { id: Uuid::new_v4() })).prototype()
    }
}

#[derive(Default)]
pub struct CustomPropertyDemo {
    custom_property: String,
}

impl CustomPropertyDemo {
    pub fn custom_property(&self) -> &str {
        &self.custom_property
    }

    pub fn definition() -> ObjectDefinition<Self> {
        ObjectDefinition::new(|_| Ok(Self::default())).property(
            "custom.property",
            |demo: &mut CustomPropertyDemo, value: String| demo.custom_property = value,
        )
    }
}

/// Registered once per profile; only the active one survives registration.
pub struct ProfileDemo {
    profile: &'static str,
}

impl ProfileDemo {
    pub fn profile(&self) -> &str {
        self.profile
    }

    pub fn definitions() -> [ObjectDefinition<Self>; 2] {
        [
            ObjectDefinition::new(|_| Ok(Self { profile: "dev" })).profile("dev"),
            ObjectDefinition::new(|_| Ok(Self { profile: "prod" })).profile("prod"),
        ]
    }
}

/// Built through the derive: `Arc` fields come from the registry.
#[derive(Injectable)]
pub struct WelcomeController {
    greeting: Arc<GreetingService>,
    properties: Arc<CustomPropertyDemo>,
    visits: AtomicU64,
}

impl WelcomeController {
    pub fn definition() -> ObjectDefinition<Self> {
        ObjectDefinition::injectable().lazy()
    }

    pub fn welcome(&self) -> String {
        let visit = self.visits.fetch_add(1, Ordering::Relaxed) + 1;
        format!(
            "{} ({}) [visit #{}]",
            self.greeting.greet(),
            self.properties.custom_property(),
            visit
        )
    }
}
