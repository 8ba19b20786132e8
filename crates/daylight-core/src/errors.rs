use thiserror::Error;

/// Result type alias using DaylightError
pub type Result<T> = std::result::Result<T, DaylightError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Descriptor/Validation
    InvalidReference,
    TypeMismatch,
    NotFound,
    AlreadyExists,

    // Load/Commit
    MissingIdentity,
    InvalidPayload,

    // Configuration
    InvalidConfig,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidReference => "ERR_INVALID_REFERENCE",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::MissingIdentity => "ERR_MISSING_IDENTITY",
            ExErrorKind::InvalidPayload => "ERR_INVALID_PAYLOAD",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    resource_type: Option<String>,
    entity_id: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            resource_type: None,
            entity_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add resource type context
    pub fn with_resource_type(mut self, type_name: impl Into<String>) -> Self {
        self.resource_type = Some(type_name.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(resource_type) = &self.resource_type {
            write!(f, " (resource_type: {})", resource_type)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for the descriptor layer and the load/commit collaborator
///
/// The change-tracking engine itself never fails; every variant here is a
/// precondition violation caught before a graph reaches the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DaylightError {
    // ===== Descriptor Errors =====
    /// Resource type is not registered in the schema
    #[error("Unknown resource type: {type_name}")]
    UnknownType { type_name: String },

    /// Resource type registered twice
    #[error("Resource type already registered: {type_name}")]
    AlreadyRegistered { type_name: String },

    /// Attribute name not declared on the resource type
    #[error("Attribute '{attribute}' is not declared on {type_name}")]
    InvalidAttribute {
        type_name: String,
        attribute: String,
    },

    /// Association name not declared on the resource type
    #[error("Association '{association}' is not declared on {type_name}")]
    InvalidAssociation {
        type_name: String,
        association: String,
    },

    /// Singular operation used on a collection slot or vice versa
    #[error("Association '{association}' on {type_name} is {actual}, not {expected}")]
    WrongAssociationKind {
        type_name: String,
        association: String,
        expected: String,
        actual: String,
    },

    /// Association or reference points at a resource of the wrong type
    #[error("Type mismatch on {type_name}.{slot}: expected {expected}, got {actual}")]
    TypeMismatch {
        type_name: String,
        slot: String,
        expected: String,
        actual: String,
    },

    // ===== Graph Errors =====
    /// Resource key does not belong to this graph
    #[error("Resource not found: {key}")]
    ResourceNotFound { key: usize },

    // ===== Load/Commit Errors =====
    /// Loaded data carries no usable id
    #[error("Loaded {type_name} data has no valid id")]
    MissingIdentity { type_name: String },

    /// Decoded server data has the wrong shape
    #[error("Invalid payload for {type_name}: {reason}")]
    InvalidPayload { type_name: String, reason: String },

    // ===== Configuration Errors =====
    /// Engine configuration failed to parse
    #[error("Invalid engine configuration: {message}")]
    InvalidConfig { message: String },
}

/// Conversion from DaylightError to ExError
impl From<DaylightError> for ExError {
    fn from(err: DaylightError) -> Self {
        match err {
            DaylightError::UnknownType { type_name } => ExError::new(ExErrorKind::NotFound)
                .with_resource_type(type_name)
                .with_message("Resource type not registered"),

            DaylightError::AlreadyRegistered { type_name } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_resource_type(type_name)
                    .with_op("register")
                    .with_message("Resource type already registered")
            }

            DaylightError::InvalidAttribute {
                type_name,
                attribute,
            } => ExError::new(ExErrorKind::InvalidReference)
                .with_resource_type(type_name)
                .with_message(format!("Undeclared attribute '{}'", attribute)),

            DaylightError::InvalidAssociation {
                type_name,
                association,
            } => ExError::new(ExErrorKind::InvalidReference)
                .with_resource_type(type_name)
                .with_message(format!("Undeclared association '{}'", association)),

            DaylightError::WrongAssociationKind {
                type_name,
                association,
                expected,
                actual,
            } => ExError::new(ExErrorKind::TypeMismatch)
                .with_resource_type(type_name)
                .with_message(format!(
                    "Association '{}' is {}, expected {}",
                    association, actual, expected
                )),

            DaylightError::TypeMismatch {
                type_name,
                slot,
                expected,
                actual,
            } => ExError::new(ExErrorKind::TypeMismatch)
                .with_resource_type(type_name)
                .with_message(format!(
                    "Slot '{}' expects {}, got {}",
                    slot, expected, actual
                )),

            DaylightError::ResourceNotFound { key } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(key.to_string())
                .with_message("Resource key not present in graph"),

            DaylightError::MissingIdentity { type_name } => {
                ExError::new(ExErrorKind::MissingIdentity)
                    .with_resource_type(type_name)
                    .with_op("load")
                    .with_message("Loaded data has no valid id")
            }

            DaylightError::InvalidPayload { type_name, reason } => {
                ExError::new(ExErrorKind::InvalidPayload)
                    .with_resource_type(type_name)
                    .with_message(reason)
            }

            DaylightError::InvalidConfig { message } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }
        }
    }
}

impl From<toml::de::Error> for DaylightError {
    fn from(err: toml::de::Error) -> Self {
        DaylightError::InvalidConfig {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::InvalidReference, "ERR_INVALID_REFERENCE"),
            (ExErrorKind::TypeMismatch, "ERR_TYPE_MISMATCH"),
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
            (ExErrorKind::MissingIdentity, "ERR_MISSING_IDENTITY"),
            (ExErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_invalid_names_map_to_invalid_reference() {
        let attr: ExError = DaylightError::InvalidAttribute {
            type_name: "post".to_string(),
            attribute: "nope".to_string(),
        }
        .into();
        let assoc: ExError = DaylightError::InvalidAssociation {
            type_name: "post".to_string(),
            association: "nope".to_string(),
        }
        .into();

        assert_eq!(attr.kind(), ExErrorKind::InvalidReference);
        assert_eq!(assoc.kind(), ExErrorKind::InvalidReference);
        assert_eq!(attr.resource_type(), Some("post"));
    }

    #[test]
    fn test_wrong_types_map_to_type_mismatch() {
        let err: ExError = DaylightError::TypeMismatch {
            type_name: "post".to_string(),
            slot: "author".to_string(),
            expected: "user".to_string(),
            actual: "comment".to_string(),
        }
        .into();

        assert_eq!(err.code(), "ERR_TYPE_MISMATCH");
        assert!(err.message().contains("author"));
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("resource")
            .with_entity_id("9")
            .with_message("Resource key not present in graph");
        let rendered = err.to_string();

        assert!(rendered.starts_with("[ERR_NOT_FOUND]"));
        assert!(rendered.contains("'resource'"));
        assert!(rendered.contains("entity_id: 9"));
    }
}
