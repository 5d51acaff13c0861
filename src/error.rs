use thiserror::Error;

pub type Result<T> = std::result::Result<T, PapersheetError>;

#[derive(Debug, Error)]
pub enum PapersheetError {
    #[error("Duplicate definition: {type_name} is already registered")]
    DuplicateDefinition { type_name: String },

    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    #[error("Missing property '{key}' required by {type_name}")]
    MissingProperty { type_name: String, key: String },

    #[error("Invalid value '{value}' for property '{key}' on {type_name}: {message}")]
    InvalidProperty {
        type_name: String,
        key: String,
        value: String,
        message: String,
    },

    #[error("Failed to construct {type_name} during {phase}: {source}")]
    Construction {
        type_name: String,
        phase: String,
        source: anyhow::Error,
    },

    #[error("Pre-destroy hook '{hook}' failed for {type_name}: {source}")]
    Teardown {
        type_name: String,
        hook: String,
        source: anyhow::Error,
    },

    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Registry has been shut down")]
    RegistryClosed,

    #[error("Invalid configuration at line {line}: {message}")]
    InvalidConfig { line: usize, message: String },

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl PapersheetError {
    /// Wrap an error raised by user code during construction.
    ///
    /// Errors that already belong to this taxonomy (a nested resolution failure
    /// surfaced through `?`) are passed through unchanged.
    pub(crate) fn construction(
        type_name: &str,
        phase: impl Into<String>,
        error: anyhow::Error,
    ) -> Self {
        match error.downcast::<PapersheetError>() {
            Ok(inner) => inner,
            Err(source) => Self::Construction {
                type_name: type_name.to_string(),
                phase: phase.into(),
                source,
            },
        }
    }

    pub(crate) fn teardown(type_name: &str, hook: &str, source: anyhow::Error) -> Self {
        Self::Teardown {
            type_name: type_name.to_string(),
            hook: hook.to_string(),
            source,
        }
    }
}
