//! Version parts and their configuration

use std::fmt;

use crate::version::error::ConfigError;
use crate::version::kind::{IdentifierRules, NumberRules, PartKind, PartValue};

/// Configuration of a single version part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSpec {
    key: String,
    kind: PartKind,
    prefix: String,
    requires: Option<String>,
}

impl PartSpec {
    pub fn new(key: impl Into<String>, kind: PartKind) -> Self {
        Self {
            key: key.into(),
            kind,
            prefix: String::new(),
            requires: None,
        }
    }

    pub fn number(key: impl Into<String>, rules: NumberRules) -> Self {
        Self::new(key, PartKind::Number(rules))
    }

    pub fn identifier(key: impl Into<String>, rules: IdentifierRules) -> Self {
        Self::new(key, PartKind::Identifier(rules))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Name another part that must carry a value whenever this part is set
    pub fn with_requires(mut self, requires: impl Into<String>) -> Self {
        self.requires = Some(requires.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> &PartKind {
        &self.kind
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn requires(&self) -> Option<&str> {
        self.requires.as_deref()
    }
}

/// A part bound to its current value inside a [`VersionChain`](crate::version::chain::VersionChain)
///
/// `parent` and `child` are indices into the owning chain. They are assigned
/// together by the chain, so `parts[p].child == Some(c)` always implies
/// `parts[c].parent == Some(p)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    spec: PartSpec,
    value: Option<PartValue>,
    pub(crate) parent: Option<usize>,
    pub(crate) child: Option<usize>,
}

impl Part {
    /// Create an unset part
    pub fn new(spec: PartSpec) -> Self {
        Self {
            spec,
            value: None,
            parent: None,
            child: None,
        }
    }

    /// Create a part holding `value`, which must be legal for the part's kind
    pub fn with_value(spec: PartSpec, value: Option<PartValue>) -> Result<Self, ConfigError> {
        if let Some(value) = &value
            && !spec.kind.accepts(value)
        {
            return Err(ConfigError::InvalidValue {
                key: spec.key.clone(),
                value: value.to_string(),
            });
        }

        Ok(Self {
            value,
            ..Self::new(spec)
        })
    }

    pub fn key(&self) -> &str {
        self.spec.key()
    }

    pub fn spec(&self) -> &PartSpec {
        &self.spec
    }

    pub fn value(&self) -> Option<&PartValue> {
        self.value.as_ref()
    }

    pub fn requires(&self) -> Option<&str> {
        self.spec.requires()
    }

    /// Index of the previous part in the chain
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Index of the next part in the chain
    pub fn child(&self) -> Option<usize> {
        self.child
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn start(&self) -> PartValue {
        self.spec.kind.start()
    }

    pub fn next_value(&self) -> Option<PartValue> {
        self.spec.kind.next_value(self.value.as_ref())
    }

    pub(crate) fn set_value(&mut self, value: Option<PartValue>) {
        self.value = value;
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => self.spec.kind.render(f, &self.spec.prefix, value),
            None => Ok(()),
        }
    }
}
