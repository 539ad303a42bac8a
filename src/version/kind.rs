//! Kind-specific value rules for version parts
//!
//! A part is either a counter ([`NumberRules`]) or an enumerated identifier
//! ([`IdentifierRules`]). Both are reached through [`PartKind`], which provides
//! the start value, the successor of a value, and the rendered form.

use std::collections::HashSet;
use std::fmt;

use crate::version::error::ConfigError;

/// Current value of a part
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartValue {
    Number(u64),
    Identifier(String),
}

impl fmt::Display for PartValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartValue::Number(n) => write!(f, "{}", n),
            PartValue::Identifier(s) => f.write_str(s),
        }
    }
}

/// Rules for a numeric part such as `major` or a build number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberRules {
    label: String,
    label_suffix: String,
    start: u64,
    show_start: bool,
}

impl Default for NumberRules {
    fn default() -> Self {
        Self {
            label: String::new(),
            label_suffix: String::new(),
            start: 0,
            show_start: true,
        }
    }
}

impl NumberRules {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Separator rendered between the label and the number
    pub fn with_label_suffix(mut self, label_suffix: impl Into<String>) -> Self {
        self.label_suffix = label_suffix.into();
        self
    }

    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    /// When false, a part sitting on its start value renders only its label
    pub fn with_show_start(mut self, show_start: bool) -> Self {
        self.show_start = show_start;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn label_suffix(&self) -> &str {
        &self.label_suffix
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn show_start(&self) -> bool {
        self.show_start
    }
}

/// Rules for an identifier part that steps through a fixed list of strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierRules {
    strings: Vec<String>,
    start: String,
}

impl IdentifierRules {
    /// Build identifier rules for the part `key`.
    ///
    /// `start` defaults to the first string. Fails when `strings` is empty,
    /// holds duplicates, or does not contain `start`.
    pub fn new(key: &str, strings: Vec<String>, start: Option<String>) -> Result<Self, ConfigError> {
        let Some(first) = strings.first() else {
            return Err(ConfigError::EmptyStrings {
                key: key.to_string(),
            });
        };

        let mut seen = HashSet::new();
        if let Some(duplicate) = strings.iter().find(|s| !seen.insert(s.as_str())) {
            return Err(ConfigError::DuplicateString {
                key: key.to_string(),
                string: duplicate.clone(),
            });
        }

        let start = start.unwrap_or_else(|| first.clone());
        if !strings.contains(&start) {
            return Err(ConfigError::StartNotInStrings {
                key: key.to_string(),
                start,
            });
        }

        Ok(Self { strings, start })
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn start(&self) -> &str {
        &self.start
    }
}

/// Kind of a version part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartKind {
    Number(NumberRules),
    Identifier(IdentifierRules),
}

impl Default for PartKind {
    fn default() -> Self {
        PartKind::Number(NumberRules::default())
    }
}

impl PartKind {
    /// Value a part takes when it leaves the unset state or is reset while required
    pub fn start(&self) -> PartValue {
        match self {
            PartKind::Number(rules) => PartValue::Number(rules.start),
            PartKind::Identifier(rules) => PartValue::Identifier(rules.start.clone()),
        }
    }

    /// Successor of `current`.
    ///
    /// Unset parts move to the start value. An identifier on its last string
    /// is exhausted and yields `None` instead of wrapping around. A number
    /// at `u64::MAX` saturates and stays there.
    pub fn next_value(&self, current: Option<&PartValue>) -> Option<PartValue> {
        match (self, current) {
            (PartKind::Number(_), Some(PartValue::Number(n))) => {
                Some(PartValue::Number(n.saturating_add(1)))
            }
            (PartKind::Identifier(rules), Some(PartValue::Identifier(current))) => rules
                .strings
                .iter()
                .position(|s| s == current)
                .and_then(|index| rules.strings.get(index + 1))
                .map(|next| PartValue::Identifier(next.clone())),
            _ => Some(self.start()),
        }
    }

    /// Whether `value` is a legal value for this kind
    pub fn accepts(&self, value: &PartValue) -> bool {
        match (self, value) {
            (PartKind::Number(_), PartValue::Number(_)) => true,
            (PartKind::Identifier(rules), PartValue::Identifier(s)) => rules.strings.contains(s),
            _ => false,
        }
    }

    pub(crate) fn render(
        &self,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        value: &PartValue,
    ) -> fmt::Result {
        match (self, value) {
            (PartKind::Number(rules), PartValue::Number(n))
                if *n == rules.start && !rules.show_start =>
            {
                write!(f, "{}{}", prefix, rules.label)
            }
            (PartKind::Number(rules), _) => {
                write!(f, "{}{}{}{}", prefix, rules.label, rules.label_suffix, value)
            }
            (PartKind::Identifier(_), _) => write!(f, "{}{}", prefix, value),
        }
    }
}
