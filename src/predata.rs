//! Definitions that must be replayed before any data is loaded.
//!
//! Every statement block starts with blank-line padding so that the output of
//! consecutive emitters concatenates into a stable, diffable script.

use std::io::Write;

use crate::error::{Error, Result};
use crate::ident::quote_ident;
use crate::metadata::print_object_metadata;
use crate::objects::*;

/// Present in every database, so never created explicitly.
const DEFAULT_SCHEMA: &str = "public";

/// Writes `ALTER TABLE ... ADD CONSTRAINT` for every row, foreign keys last
/// since they need the referenced primary or unique key to exist. Order is
/// otherwise kept as given.
pub(crate) fn emit_constraints<W: Write>(
    out: &mut W,
    constraints: &[ConstraintRow],
    metadata: &MetadataMap,
) -> Result<()> {
    let (foreign, others): (Vec<&ConstraintRow>, Vec<&ConstraintRow>) = constraints
        .iter()
        .partition(|constraint| constraint.kind == ConstraintKind::Foreign);

    for constraint in others.into_iter().chain(foreign) {
        let name = quote_ident(&constraint.name);
        tracing::debug!(constraint = %name, table = %constraint.owning_table, kind = ?constraint.kind, "emitting constraint");
        write!(
            out,
            "\n\nALTER TABLE ONLY {} ADD CONSTRAINT {} {};\n",
            constraint.owning_table, name, constraint.definition
        )?;
        let target = Target::Constraint {
            name,
            table: constraint.owning_table.clone(),
        };
        print_object_metadata(out, metadata.get(&constraint.oid), &target)?;
    }
    Ok(())
}

pub(crate) fn emit_schemas<W: Write>(out: &mut W, schemas: &[SchemaRow], metadata: &MetadataMap) -> Result<()> {
    for schema in schemas {
        let name = quote_ident(&schema.name);
        writeln!(out)?;
        if schema.name != DEFAULT_SCHEMA {
            tracing::debug!(schema = %name, "emitting schema");
            write!(out, "\nCREATE SCHEMA {name};")?;
        }
        print_object_metadata(out, metadata.get(&schema.oid), &Target::Schema { name })?;
    }
    Ok(())
}

/// Writes `CREATE PROCEDURAL LANGUAGE` and hands the language's support
/// functions to the language owner. Every referenced function must be in
/// `functions`; nothing is written for a language whose functions are missing.
pub(crate) fn emit_languages<W: Write>(
    out: &mut W,
    languages: &[ProceduralLanguageRow],
    functions: &FunctionInfoMap,
    metadata: &MetadataMap,
) -> Result<()> {
    for language in languages {
        let support = support_functions(language, functions)?;
        let name = quote_ident(&language.name);
        let owner = quote_ident(&language.owner);
        tracing::debug!(language = %name, functions = support.len(), "emitting procedural language");

        write!(out, "\n\nCREATE ")?;
        if language.trusted {
            write!(out, "TRUSTED ")?;
        }
        write!(out, "PROCEDURAL LANGUAGE {name};")?;
        for function in support {
            write!(
                out,
                "\nALTER FUNCTION {}({}) OWNER TO {owner};",
                function.qualified_name, function.arguments
            )?;
        }
        print_object_metadata(out, metadata.get(&language.oid), &Target::Language { name })?;
        writeln!(out)?;
    }
    Ok(())
}

/// Handler, inline and validator functions, skipping the zero oids.
fn support_functions<'a>(language: &ProceduralLanguageRow, functions: &'a FunctionInfoMap) -> Result<Vec<&'a FunctionInfo>> {
    [
        ("handler", language.handler),
        ("inline", language.inline),
        ("validator", language.validator),
    ]
    .into_iter()
    .filter(|&(_, oid)| oid != 0)
    .map(|(role, oid)| {
        functions.get(&oid).ok_or_else(|| Error::MissingFunction {
            language: language.name.clone(),
            role,
            oid,
        })
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn constraint(oid: u32, name: &str, kind: ConstraintKind, definition: &str) -> ConstraintRow {
        ConstraintRow {
            oid,
            name: name.to_string(),
            kind,
            owning_table: "public.orders".to_string(),
            definition: definition.to_string(),
        }
    }

    fn language(handler: u32, inline: u32, validator: u32) -> ProceduralLanguageRow {
        ProceduralLanguageRow {
            oid: 1,
            name: "plperl".to_string(),
            owner: "admin".to_string(),
            trusted: false,
            handler,
            inline,
            validator,
        }
    }

    fn functions() -> FunctionInfoMap {
        FunctionInfoMap::from([
            (10, FunctionInfo { qualified_name: "pg_catalog.plperl_call_handler".to_string(), arguments: "".to_string() }),
            (11, FunctionInfo { qualified_name: "pg_catalog.plperl_inline_handler".to_string(), arguments: "internal".to_string() }),
            (12, FunctionInfo { qualified_name: "pg_catalog.plperl_validator".to_string(), arguments: "oid".to_string() }),
        ])
    }

    fn render(emit: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        emit(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn foreign_keys_after_other_constraints() {
        let rows = [
            constraint(1, "orders_customer_fkey", ConstraintKind::Foreign, "FOREIGN KEY (customer_id) REFERENCES public.customers(id)"),
            constraint(2, "orders_pkey", ConstraintKind::Primary, "PRIMARY KEY (id)"),
            constraint(3, "orders_total_check", ConstraintKind::Check, "CHECK ((total >= 0))"),
        ];
        let output = render(|out| emit_constraints(out, &rows, &MetadataMap::new()));
        assert_eq!(
            output,
            "\n\nALTER TABLE ONLY public.orders ADD CONSTRAINT orders_pkey PRIMARY KEY (id);\n\
             \n\nALTER TABLE ONLY public.orders ADD CONSTRAINT orders_total_check CHECK ((total >= 0));\n\
             \n\nALTER TABLE ONLY public.orders ADD CONSTRAINT orders_customer_fkey FOREIGN KEY (customer_id) REFERENCES public.customers(id);\n"
        );
    }

    #[test]
    fn foreign_keys_keep_relative_order() {
        let rows = [
            constraint(1, "b_fkey", ConstraintKind::Foreign, "FOREIGN KEY (b) REFERENCES public.b(id)"),
            constraint(2, "u", ConstraintKind::Unique, "UNIQUE (x)"),
            constraint(3, "a_fkey", ConstraintKind::Foreign, "FOREIGN KEY (a) REFERENCES public.a(id)"),
            constraint(4, "ex", ConstraintKind::Exclusion, "EXCLUDE USING gist (r WITH &&)"),
        ];
        let output = render(|out| emit_constraints(out, &rows, &MetadataMap::new()));
        let order: Vec<_> = output
            .lines()
            .filter_map(|line| line.split_whitespace().nth(6))
            .collect();
        assert_eq!(order, ["u", "ex", "b_fkey", "a_fkey"]);
    }

    #[test]
    fn constraint_names_are_quoted_and_commented() {
        let rows = [constraint(7, "Orders PK", ConstraintKind::Primary, "PRIMARY KEY (id)")];
        let metadata = MetadataMap::from([(
            7,
            ObjectMetadata {
                comment: Some("main key".to_string()),
                ..Default::default()
            },
        )]);
        let output = render(|out| emit_constraints(out, &rows, &metadata));
        assert_eq!(
            output,
            "\n\nALTER TABLE ONLY public.orders ADD CONSTRAINT \"Orders PK\" PRIMARY KEY (id);\n\
             \n\nCOMMENT ON CONSTRAINT \"Orders PK\" ON public.orders IS 'main key';\n"
        );
    }

    #[test]
    fn public_schema_gets_metadata_but_no_create() {
        let rows = [
            SchemaRow { oid: 2200, name: "public".to_string() },
            SchemaRow { oid: 16384, name: "reporting".to_string() },
        ];
        let metadata = MetadataMap::from([
            (2200, ObjectMetadata { owner: Some("postgres".to_string()), ..Default::default() }),
            (16384, ObjectMetadata { owner: Some("analyst".to_string()), ..Default::default() }),
        ]);
        let output = render(|out| emit_schemas(out, &rows, &metadata));
        assert_eq!(
            output,
            "\n\n\nALTER SCHEMA public OWNER TO postgres;\n\
             \n\nCREATE SCHEMA reporting;\n\nALTER SCHEMA reporting OWNER TO analyst;\n"
        );
    }

    #[test]
    fn schema_names_are_quoted() {
        let rows = [SchemaRow { oid: 1, name: "Sales".to_string() }];
        let output = render(|out| emit_schemas(out, &rows, &MetadataMap::new()));
        assert_eq!(output, "\n\nCREATE SCHEMA \"Sales\";");
    }

    #[test]
    fn language_with_all_support_functions() {
        let mut row = language(10, 11, 12);
        row.trusted = true;
        let output = render(|out| emit_languages(out, &[row], &functions(), &MetadataMap::new()));
        assert_eq!(
            output,
            "\n\nCREATE TRUSTED PROCEDURAL LANGUAGE plperl;\
             \nALTER FUNCTION pg_catalog.plperl_call_handler() OWNER TO admin;\
             \nALTER FUNCTION pg_catalog.plperl_inline_handler(internal) OWNER TO admin;\
             \nALTER FUNCTION pg_catalog.plperl_validator(oid) OWNER TO admin;\n"
        );
    }

    #[test]
    fn language_with_only_inline_function() {
        let output = render(|out| emit_languages(out, &[language(0, 11, 0)], &functions(), &MetadataMap::new()));
        assert_eq!(output.matches("ALTER FUNCTION").count(), 1);
        assert_eq!(
            output,
            "\n\nCREATE PROCEDURAL LANGUAGE plperl;\
             \nALTER FUNCTION pg_catalog.plperl_inline_handler(internal) OWNER TO admin;\n"
        );
    }

    #[test]
    fn language_metadata_follows_ownership() {
        let metadata = MetadataMap::from([(
            1,
            ObjectMetadata {
                owner: Some("admin".to_string()),
                comment: Some("perl".to_string()),
                ..Default::default()
            },
        )]);
        let output = render(|out| emit_languages(out, &[language(10, 0, 0)], &functions(), &metadata));
        assert_eq!(
            output,
            "\n\nCREATE PROCEDURAL LANGUAGE plperl;\
             \nALTER FUNCTION pg_catalog.plperl_call_handler() OWNER TO admin;\
             \n\nCOMMENT ON LANGUAGE plperl IS 'perl';\n\
             \n\nALTER LANGUAGE plperl OWNER TO admin;\n\n"
        );
    }

    #[test]
    fn missing_function_is_a_consistency_error() {
        let mut out = Vec::new();
        let err = emit_languages(&mut out, &[language(10, 0, 99)], &functions(), &MetadataMap::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingFunction { ref language, role: "validator", oid: 99 } if language == "plperl"
        ));
        assert!(out.is_empty());
    }
}
