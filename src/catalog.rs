use tokio_postgres::{Client, NoTls};

use crate::error::{BoxError, Error, Result};
use crate::relations::QualifiedName;

const QUOTE_RELATION: &str = "SELECT quote_ident($1) AS schemaname, quote_ident($2) AS tablename";

/// Source of the server's canonical quoting for relation names.
pub(crate) trait Catalog {
    async fn quote_relation(&self, name: &QualifiedName) -> Result<QualifiedName, BoxError>;
}

pub(crate) struct PgCatalog {
    client: Client,
}

impl PgCatalog {
    pub(crate) async fn connect(conninfo: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(conninfo, NoTls)
            .await
            .map_err(Error::Connect)?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                tracing::error!("catalog connection closed: {err}");
            }
        });
        Ok(Self { client })
    }
}

impl Catalog for PgCatalog {
    async fn quote_relation(&self, name: &QualifiedName) -> Result<QualifiedName, BoxError> {
        // bound parameters, so quotes and commas in the pattern reach quote_ident() untouched
        let row = self
            .client
            .query_one(QUOTE_RELATION, &[&name.schema, &name.table])
            .await?;
        Ok(QualifiedName::new(
            row.try_get::<_, String>("schemaname")?,
            row.try_get::<_, String>("tablename")?,
        ))
    }
}

/// Rewrites each name with the catalog's own quoting, one lookup per name and
/// in input order. The first failed lookup aborts the whole batch.
pub(crate) async fn canonicalize<'a, C, I>(catalog: &C, names: I) -> Result<Vec<String>>
where
    C: Catalog,
    I: IntoIterator<Item = &'a QualifiedName>,
{
    let mut quoted = Vec::new();
    for name in names {
        let canonical = catalog
            .quote_relation(name)
            .await
            .map_err(|source| Error::Catalog {
                relation: name.to_string(),
                source,
            })?;
        tracing::debug!(relation = %name, canonical = %canonical, "canonicalized relation");
        quoted.push(canonical.to_string());
    }
    Ok(quoted)
}
