use papersheet::prelude::*;
use std::sync::Mutex;

/// Service whose every lifecycle step is logged and recorded.
///
/// Three post-construct hooks and three pre-destroy hooks, declared in this
/// order on the definition:
///
/// ```text
/// constructor, post_construct, after_properties_set (OnInit), custom_init
/// pre_destroy, destroy (OnDestroy), custom_destroy
/// ```
#[derive(Default)]
pub struct GreetingService {
    message: String,
    events: Mutex<Vec<&'static str>>,
}

impl GreetingService {
    pub fn new() -> Self {
        let service = Self::default();
        service.record("constructor", 1);
        service
    }

    pub fn greet(&self) -> &str {
        &self.message
    }

    /// Lifecycle steps seen so far.
    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn record(&self, event: &'static str, step: u8) {
        tracing::info!("{}. GreetingService: {}", step, event);
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    pub fn definition() -> ObjectDefinition<Self> {
        ObjectDefinition::new(|_| Ok(GreetingService::new()))
            .property_or(
                "greeting.message",
                "Hello from PaperSheet application!".to_string(),
                |service: &mut GreetingService, message| service.message = message,
            )
            .post_construct("post_construct", |service, _| {
                service.record("post_construct", 3);
                Ok(())
            })
            .on_init()
            .post_construct("custom_init", |service, _| {
                service.record("custom_init", 5);
                Ok(())
            })
            .pre_destroy("pre_destroy", |service| {
                service.record("pre_destroy", 6);
                Ok(())
            })
            .on_destroy()
            .pre_destroy("custom_destroy", |service| {
                service.record("custom_destroy", 8);
                Ok(())
            })
    }
}

impl OnInit for GreetingService {
    fn on_init(&mut self) -> anyhow::Result<()> {
        self.record("after_properties_set", 4);
        Ok(())
    }
}

impl OnDestroy for GreetingService {
    fn on_destroy(&self) -> anyhow::Result<()> {
        self.record("destroy", 7);
        Ok(())
    }
}
