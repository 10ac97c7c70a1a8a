//! Model gate - decides which model identifier is forwarded upstream.
//!
//! Only free-tier identifiers chosen by the caller are trusted. Anything else
//! falls back to the server's default so a caller can never route a request
//! to a metered model.

/// Marker that identifies a free-tier model.
pub const FREE_TIER_SUFFIX: &str = ":free";

/// Outcome of gating a requested model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelection {
    /// The caller's free-tier model is used as requested.
    Requested(String),
    /// The default is used because nothing usable was requested.
    Default(String),
    /// The caller asked for a model that is not free; the default is used.
    Downgraded { requested: String, model: String },
}

impl ModelSelection {
    /// The model identifier to send upstream.
    pub fn model(&self) -> &str {
        match self {
            ModelSelection::Requested(model) => model,
            ModelSelection::Default(model) => model,
            ModelSelection::Downgraded { model, .. } => model,
        }
    }

    /// Consumes the selection, returning the model identifier.
    pub fn into_model(self) -> String {
        match self {
            ModelSelection::Requested(model) => model,
            ModelSelection::Default(model) => model,
            ModelSelection::Downgraded { model, .. } => model,
        }
    }

    pub fn is_downgraded(&self) -> bool {
        matches!(self, ModelSelection::Downgraded { .. })
    }
}

/// Validates client-requested models against the free-tier policy.
#[derive(Debug, Clone)]
pub struct ModelGate {
    default_model: String,
}

impl ModelGate {
    /// Creates a gate that falls back to `default_model`.
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            default_model: default_model.into(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Resolves the model to use for a request.
    ///
    /// A non-empty identifier ending in [`FREE_TIER_SUFFIX`] is returned as-is;
    /// everything else resolves to the default.
    pub fn resolve(&self, requested: Option<&str>) -> ModelSelection {
        match requested {
            Some(model) if !model.is_empty() && model.ends_with(FREE_TIER_SUFFIX) => {
                ModelSelection::Requested(model.to_string())
            }
            Some(model) if !model.is_empty() => ModelSelection::Downgraded {
                requested: model.to_string(),
                model: self.default_model.clone(),
            },
            _ => ModelSelection::Default(self.default_model.clone()),
        }
    }
}
