use std::fmt;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    /// One or more user supplied relation patterns are malformed
    #[error(transparent)]
    InvalidRelations(#[from] InvalidRelations),
    /// A canonical-name lookup against the live catalog failed
    #[error("looking up canonical name of {relation}: {source}")]
    Catalog {
        relation: String,
        #[source]
        source: BoxError,
    },
    #[error("connecting to the catalog: {0}")]
    Connect(#[source] tokio_postgres::Error),
    /// A language references a function missing from the function table
    #[error("procedural language {language} references {role} function {oid}, which is not in the function table")]
    MissingFunction {
        language: String,
        role: &'static str,
        oid: u32,
    },
    #[error("unknown constraint type {0:?}")]
    InvalidConstraintKind(String),
    #[error("reading catalog snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("generated definitions do not parse: {0}")]
    Verify(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Every malformed pattern of a batch, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InvalidRelations(pub(crate) Vec<InvalidRelation>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InvalidRelation {
    pub(crate) raw: String,
    pub(crate) reason: Reason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reason {
    NoSeparator,
    EmbeddedDot,
    EmptySchema,
    EmptyTable,
    EmptySchemaAndTable,
    ControlCharacter,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reason::NoSeparator => "no dot separates SchemaName from TableName",
            Reason::EmbeddedDot => "more than one dot, cannot tell SchemaName from TableName",
            Reason::EmptySchema => "SchemaName is empty",
            Reason::EmptyTable => "TableName is empty",
            Reason::EmptySchemaAndTable => "SchemaName and TableName are empty",
            Reason::ControlCharacter => "contains a control character",
        })
    }
}

impl fmt::Display for InvalidRelations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} relation pattern(s) are not of the form \"schema.table\":",
            self.0.len()
        )?;
        for invalid in &self.0 {
            write!(f, "\n  \"{}\": {}", invalid.raw, invalid.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for InvalidRelations {}
