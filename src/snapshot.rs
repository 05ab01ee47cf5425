use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::objects::*;
use crate::predata;

/// Catalog rows extracted for one backup run, as JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CatalogSnapshot {
    pub(crate) schemas: Vec<SchemaRow>,
    pub(crate) languages: Vec<ProceduralLanguageRow>,
    pub(crate) constraints: Vec<ConstraintRow>,
    /// Support functions of the languages, by oid
    pub(crate) functions: FunctionInfoMap,
    pub(crate) metadata: SnapshotMetadata,
}

/// Oids are only unique within one catalog, hence one map per object class.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SnapshotMetadata {
    pub(crate) schemas: MetadataMap,
    pub(crate) languages: MetadataMap,
    pub(crate) constraints: MetadataMap,
}

impl CatalogSnapshot {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Schemas, then languages, then constraints.
    pub(crate) fn write_predata<W: Write>(&self, out: &mut W) -> Result<()> {
        predata::emit_schemas(out, &self.schemas, &self.metadata.schemas)?;
        predata::emit_languages(out, &self.languages, &self.functions, &self.metadata.languages)?;
        predata::emit_constraints(out, &self.constraints, &self.metadata.constraints)?;
        tracing::info!(
            schemas = self.schemas.len(),
            languages = self.languages.len(),
            constraints = self.constraints.len(),
            "wrote predata definitions"
        );
        Ok(())
    }
}
