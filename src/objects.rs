use std::collections::HashMap;
use std::str::FromStr;

use enum_kinds::EnumKind;
use serde::Deserialize;

use crate::error::Error;

pub(crate) type MetadataMap = HashMap<u32, ObjectMetadata>;
pub(crate) type FunctionInfoMap = HashMap<u32, FunctionInfo>;

/// `pg_constraint.contype`, resolved once when the row is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub(crate) enum ConstraintKind {
    Primary,
    Unique,
    Check,
    Exclusion,
    Foreign,
}

impl FromStr for ConstraintKind {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "p" => Ok(Self::Primary),
            "u" => Ok(Self::Unique),
            "c" => Ok(Self::Check),
            "x" => Ok(Self::Exclusion),
            "f" => Ok(Self::Foreign),
            other => Err(Error::InvalidConstraintKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for ConstraintKind {
    type Error = Error;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ConstraintRow {
    pub(crate) oid: u32,
    pub(crate) name: String,
    pub(crate) kind: ConstraintKind,
    /// Already quoted and schema qualified
    pub(crate) owning_table: String,
    /// Output of `pg_get_constraintdef()`
    pub(crate) definition: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SchemaRow {
    pub(crate) oid: u32,
    pub(crate) name: String,
}

/// Function oids are zero when the language has no such function.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProceduralLanguageRow {
    pub(crate) oid: u32,
    pub(crate) name: String,
    pub(crate) owner: String,
    #[serde(default)]
    pub(crate) trusted: bool,
    #[serde(default)]
    pub(crate) handler: u32,
    #[serde(default)]
    pub(crate) inline: u32,
    #[serde(default)]
    pub(crate) validator: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FunctionInfo {
    pub(crate) qualified_name: String,
    pub(crate) arguments: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ObjectMetadata {
    pub(crate) owner: Option<String>,
    pub(crate) privileges: Vec<Acl>,
    pub(crate) comment: Option<String>,
}

/// One `aclitem`: what a grantee holds, and which of those it may pass on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Acl {
    /// `None` is PUBLIC
    pub(crate) grantee: Option<String>,
    pub(crate) privileges: Vec<Privilege>,
    pub(crate) grantable: Vec<Privilege>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum Privilege {
    Usage,
    Create,
}

impl Privilege {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Privilege::Usage => "USAGE",
            Privilege::Create => "CREATE",
        }
    }
}

/// The object a metadata annotation is addressed to.
#[derive(Debug, EnumKind)]
#[enum_kind(ObjectType)]
pub(crate) enum Target {
    Constraint { name: String, table: String },
    Schema { name: String },
    Language { name: String },
}

impl Target {
    pub(crate) fn kind(&self) -> ObjectType {
        ObjectType::from(self)
    }

    /// The quoted object name.
    pub(crate) fn name(&self) -> &str {
        match self {
            Target::Constraint { name, .. } | Target::Schema { name } | Target::Language { name } => name,
        }
    }

    /// Constraints are addressed through their table.
    pub(crate) fn owning_table(&self) -> Option<&str> {
        match self {
            Target::Constraint { table, .. } => Some(table.as_str()),
            _ => None,
        }
    }
}

impl ObjectType {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            ObjectType::Constraint => "CONSTRAINT",
            ObjectType::Schema => "SCHEMA",
            ObjectType::Language => "LANGUAGE",
        }
    }

    /// Constraints belong to their table and carry no owner of their own.
    pub(crate) fn has_owner(self) -> bool {
        !matches!(self, ObjectType::Constraint)
    }

    /// Everything `GRANT ALL` covers for this kind of object.
    pub(crate) fn privileges(self) -> &'static [Privilege] {
        match self {
            ObjectType::Constraint => &[],
            ObjectType::Schema => &[Privilege::Usage, Privilege::Create],
            ObjectType::Language => &[Privilege::Usage],
        }
    }
}
