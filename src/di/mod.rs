mod builder;
mod creation;
mod definition;
mod injectable;
mod registry;
mod resolver;

pub use builder::RegistryBuilder;
pub use definition::{Identity, ObjectDefinition, Scope};
pub use injectable::Injectable;
pub use registry::Registry;
pub use resolver::Resolver;
