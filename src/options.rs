use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::error::{InvalidRelations, Result};
use crate::relations::{self, QualifiedName};

/// Relation patterns given individually plus an optional list file.
#[derive(Debug, Default, Clone)]
pub(crate) struct RelationPatterns {
    pub(crate) patterns: Vec<String>,
    pub(crate) file: Option<PathBuf>,
}

impl RelationPatterns {
    /// Individual patterns first, then the list file entries in file order.
    pub(crate) fn collect(&self) -> Result<Vec<String>> {
        let mut all = self.patterns.clone();
        if let Some(path) = &self.file {
            all.extend(read_list_file(path)?);
        }
        Ok(all)
    }
}

/// The resolved relation selection for one run.
#[derive(Debug, Default)]
pub(crate) struct Options {
    included: IndexSet<QualifiedName>,
    excluded: IndexSet<QualifiedName>,
}

impl Options {
    pub(crate) fn new(include: &RelationPatterns, exclude: &RelationPatterns) -> Result<Self> {
        let included = relations::resolve(include.collect()?);
        let excluded = relations::resolve(exclude.collect()?);

        match (included, excluded) {
            (Ok(included), Ok(excluded)) => {
                tracing::info!(
                    included = included.len(),
                    excluded = excluded.len(),
                    "resolved relation filters"
                );
                Ok(Self { included, excluded })
            }
            (included, excluded) => {
                // report the malformed entries of both lists at once
                let mut invalid = Vec::new();
                for result in [included, excluded] {
                    if let Err(InvalidRelations(mut entries)) = result {
                        invalid.append(&mut entries);
                    }
                }
                Err(InvalidRelations(invalid).into())
            }
        }
    }

    pub(crate) fn included_tables(&self) -> &IndexSet<QualifiedName> {
        &self.included
    }

    pub(crate) fn excluded_tables(&self) -> &IndexSet<QualifiedName> {
        &self.excluded
    }

    /// The list a run acts on: inclusions when there are any, else exclusions.
    pub(crate) fn selected_tables(&self) -> (Selection, &IndexSet<QualifiedName>) {
        if self.included.is_empty() && !self.excluded.is_empty() {
            (Selection::Exclude, &self.excluded)
        } else {
            (Selection::Include, &self.included)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selection {
    Include,
    Exclude,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Selection::Include => "included",
            Selection::Exclude => "excluded",
        })
    }
}

/// Reads a newline-delimited relation list, skipping blank lines.
pub(crate) fn read_list_file(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}
