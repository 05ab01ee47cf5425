use std::fmt;

use indexmap::IndexSet;

use crate::error::{InvalidRelation, InvalidRelations, Reason};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub(crate) struct QualifiedName {
    pub(crate) schema: String,
    pub(crate) table: String,
}

impl QualifiedName {
    pub(crate) fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Splits a raw `schema.table` pattern at its only dot.
    pub(crate) fn parse(raw: &str) -> Result<Self, Reason> {
        if raw.chars().any(char::is_control) {
            return Err(Reason::ControlCharacter);
        }
        let Some((schema, table)) = raw.split_once('.') else {
            return Err(Reason::NoSeparator);
        };
        // TODO: agree on an escape for literal dots so names containing them can be selected
        if table.contains('.') {
            return Err(Reason::EmbeddedDot);
        }
        match (schema.is_empty(), table.is_empty()) {
            (true, true) => Err(Reason::EmptySchemaAndTable),
            (true, false) => Err(Reason::EmptySchema),
            (false, true) => Err(Reason::EmptyTable),
            (false, false) => Ok(Self::new(schema, table)),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Resolves raw patterns into qualified names, keeping input order. The result
/// is a set: a repeated pattern yields one name, at its first position, so
/// distinct patterns map one to one onto names. Every pattern is checked
/// before failing so that all malformed entries are reported together.
pub(crate) fn resolve<I, S>(patterns: I) -> Result<IndexSet<QualifiedName>, InvalidRelations>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names = IndexSet::new();
    let mut invalid = Vec::new();

    for pattern in patterns {
        let raw = pattern.as_ref();
        match QualifiedName::parse(raw) {
            Ok(name) => {
                tracing::debug!(schema = %name.schema, table = %name.table, "resolved relation");
                names.insert(name);
            }
            Err(reason) => invalid.push(InvalidRelation {
                raw: raw.to_string(),
                reason,
            }),
        }
    }

    if invalid.is_empty() {
        Ok(names)
    } else {
        Err(InvalidRelations(invalid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(patterns: &[&str]) -> Vec<QualifiedName> {
        resolve(patterns).unwrap().into_iter().collect()
    }

    fn message(patterns: &[&str]) -> String {
        resolve(patterns).unwrap_err().to_string()
    }

    #[test]
    fn splits_in_input_order() {
        assert_eq!(
            resolved(&["foo.Bar", "FOO.Bar", "FO!@#.BAR"]),
            vec![
                QualifiedName::new("foo", "Bar"),
                QualifiedName::new("FOO", "Bar"),
                QualifiedName::new("FO!@#", "BAR"),
            ]
        );
    }

    #[test]
    fn two_flags_resolve_in_order() {
        assert_eq!(
            resolved(&["foo.bar", "bar.baz"]),
            vec![QualifiedName::new("foo", "bar"), QualifiedName::new("bar", "baz")]
        );
    }

    #[test]
    fn accepts_special_characters_verbatim() {
        let raw = r"foo '~#$%^&*()_-+[]{}><\|;:/?!\t\n.bar";
        let names = resolved(&[raw]);
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].to_string(), raw);
        assert_eq!(names[0].schema, r"foo '~#$%^&*()_-+[]{}><\|;:/?!\t\n");
    }

    #[test]
    fn duplicates_keep_first_position() {
        assert_eq!(
            resolved(&["a.b", "c.d", "a.b"]),
            vec![QualifiedName::new("a", "b"), QualifiedName::new("c", "d")]
        );
    }

    #[test]
    fn empty_input_is_empty_set() {
        assert!(resolved(&[]).is_empty());
    }

    #[test]
    fn rejects_missing_dot() {
        assert_eq!(QualifiedName::parse("foobar"), Err(Reason::NoSeparator));
        assert!(message(&["foobar"]).contains("\"foobar\""));
    }

    #[test]
    fn rejects_empty_sides() {
        assert_eq!(QualifiedName::parse("foo."), Err(Reason::EmptyTable));
        assert_eq!(QualifiedName::parse(".bar"), Err(Reason::EmptySchema));
        assert_eq!(QualifiedName::parse("."), Err(Reason::EmptySchemaAndTable));
        assert!(message(&["foo."]).contains("\"foo.\": TableName is empty"));
        assert!(message(&[".bar"]).contains("\".bar\": SchemaName is empty"));
    }

    #[test]
    fn rejects_more_than_one_dot() {
        assert_eq!(QualifiedName::parse("foobar.baz.bam"), Err(Reason::EmbeddedDot));
        assert!(message(&["foobar.baz.bam"]).contains("foobar.baz.bam"));
    }

    #[test]
    fn rejects_dots_at_any_position() {
        assert_eq!(QualifiedName::parse(".bar.baz"), Err(Reason::EmbeddedDot));
        assert_eq!(QualifiedName::parse("foo.bar."), Err(Reason::EmbeddedDot));
        assert_eq!(QualifiedName::parse(".."), Err(Reason::EmbeddedDot));
        assert_eq!(QualifiedName::parse(""), Err(Reason::NoSeparator));
        let err = resolve(["foobar", ".x", "ok.t"]).unwrap_err();
        let raws: Vec<_> = err.0.iter().map(|invalid| invalid.raw.as_str()).collect();
        assert_eq!(raws, ["foobar", ".x"]);
    }

    #[test]
    fn rejects_control_characters() {
        assert_eq!(QualifiedName::parse("foo.b\tar"), Err(Reason::ControlCharacter));
    }

    #[test]
    fn one_bad_entry_fails_the_batch() {
        let err = resolve(["foobar", "foo.bar"]).unwrap_err();
        assert_eq!(err.0.len(), 1);
        assert_eq!(err.0[0].raw, "foobar");
        assert!(err.to_string().contains("foobar"));
    }

    #[test]
    fn reports_every_bad_entry_in_order() {
        let err = resolve(["foo.", "ok.table", ".bar", "a.b.c"]).unwrap_err();
        let raws: Vec<_> = err.0.iter().map(|invalid| invalid.raw.as_str()).collect();
        assert_eq!(raws, ["foo.", ".bar", "a.b.c"]);
        pretty_assertions::assert_eq!(
            err.to_string(),
            "3 relation pattern(s) are not of the form \"schema.table\":\n  \
             \"foo.\": TableName is empty\n  \
             \".bar\": SchemaName is empty\n  \
             \"a.b.c\": more than one dot, cannot tell SchemaName from TableName"
        );
    }
}
