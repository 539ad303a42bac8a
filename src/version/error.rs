use thiserror::Error;

/// Invalid part or chain configuration, raised while building a chain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "Part `{key}` cannot be an identifier and number at the same time, configure either `number` or `identifier`"
    )]
    AmbiguousKind { key: String },

    #[error("Part `{key}` has an empty `identifier.strings` list")]
    EmptyStrings { key: String },

    #[error("Part `{key}` lists `{string}` more than once in `identifier.strings`")]
    DuplicateString { key: String, string: String },

    #[error("Part `{key}` has an `identifier.start` value `{start}` that is not in `identifier.strings`")]
    StartNotInStrings { key: String, start: String },

    #[error("Part `{key}` has an invalid `number.start` value `{start}`, it must be an integer")]
    InvalidNumberStart { key: String, start: String },

    #[error("Part `{key}` has a negative `number.start` value `{start}`, it must be positive")]
    NegativeNumberStart { key: String, start: i64 },

    #[error("Part `{key}` has a value `{value}` that is not valid for its type")]
    InvalidValue { key: String, value: String },

    #[error("Another part has the same key `{key}`")]
    DuplicateKey { key: String },

    #[error("Part `{key}` has a `requires` value that references itself")]
    SelfRequires { key: String },

    #[error("Part `{key}` requires `{requires}`, which is not a key of another part")]
    UnknownRequires { key: String, requires: String },

    #[error("Part `{key}` is not declared in the configuration")]
    UndeclaredPart { key: String },

    #[error("Part `{key}` is declared in the configuration but missing from the version")]
    MissingPart { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Part not found: {0}")]
    NotFound(String),
}
