use pg_query::ast::Node;

use crate::error::{Error, Result};

/// What a generated script contains, by statement kind.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct StatementCounts {
    pub(crate) schemas: usize,
    pub(crate) languages: usize,
    pub(crate) constraints: usize,
    pub(crate) owners: usize,
    pub(crate) comments: usize,
    pub(crate) grants: usize,
    pub(crate) other: usize,
}

/// Runs generated definitions through the server's own parser.
pub(crate) fn verify(script: &str) -> Result<StatementCounts> {
    let ast = pg_query::parse(script).map_err(|err| Error::Verify(format!("{err:?}")))?;

    let mut counts = StatementCounts::default();
    for node in &ast {
        counts.count(node);
    }
    tracing::info!(?counts, "generated definitions parse");
    Ok(counts)
}

impl StatementCounts {
    fn count(&mut self, node: &Node) {
        match node {
            Node::CreateSchemaStmt(..) => self.schemas += 1,
            Node::CreatePLangStmt(..) => self.languages += 1,
            // ADD CONSTRAINT
            Node::AlterTableStmt(..) => self.constraints += 1,
            // ALTER SCHEMA/LANGUAGE/FUNCTION ... OWNER TO
            Node::AlterOwnerStmt(..) => self.owners += 1,
            Node::CommentStmt(..) => self.comments += 1,
            // GRANT and REVOKE
            Node::GrantStmt(..) => self.grants += 1,
            other => {
                tracing::debug!("unexpected statement in generated definitions: {other:?}");
                self.other += 1;
            }
        }
    }
}
