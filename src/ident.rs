use std::sync::OnceLock;

use regex::Regex;

// Keywords that PostgreSQL's own quote_ident() refuses to leave bare: every
// keyword category except the unreserved one. Kept sorted for binary search.
const QUOTED_KEYWORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "between", "bigint", "binary", "bit", "boolean", "both", "case", "cast",
    "char", "character", "check", "coalesce", "collate", "collation", "column", "concurrently",
    "constraint", "create", "cross", "current_catalog", "current_date", "current_role",
    "current_schema", "current_time", "current_timestamp", "current_user", "dec", "decimal",
    "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "exists",
    "extract", "false", "fetch", "float", "for", "foreign", "freeze", "from", "full", "grant",
    "greatest", "group", "grouping", "having", "ilike", "in", "initially", "inner", "inout",
    "int", "integer", "intersect", "interval", "into", "is", "isnull", "join", "json",
    "json_array", "json_arrayagg", "json_exists", "json_object", "json_objectagg",
    "json_query", "json_scalar", "json_serialize", "json_table", "json_value", "lateral",
    "leading", "least", "left", "like", "limit", "localtime", "localtimestamp",
    "merge_action", "national", "natural", "nchar", "none", "normalize", "not", "notnull",
    "null", "nullif", "numeric", "offset", "on", "only", "or", "order", "out", "outer",
    "overlaps", "overlay", "placing", "position", "precision", "primary", "real", "references",
    "returning", "right", "row", "select", "session_user", "setof", "similar", "smallint",
    "some", "substring", "symmetric", "system_user", "table", "tablesample", "then", "time",
    "timestamp", "to", "trailing", "treat", "trim", "true", "union", "unique", "user", "using",
    "values", "varchar", "variadic", "verbose", "when", "where", "window", "with",
    "xmlattributes", "xmlconcat", "xmlelement", "xmlexists", "xmlforest", "xmlnamespaces",
    "xmlparse", "xmlpi", "xmlroot", "xmlserialize", "xmltable",
];

fn bare_identifier() -> &'static Regex {
    static BARE: OnceLock<Regex> = OnceLock::new();
    // Lowercase only: anything else folds to lowercase when left unquoted
    BARE.get_or_init(|| Regex::new("^[a-z_][a-z0-9_]*$").expect("valid identifier pattern"))
}

/// Quotes `ident` the way the server's `quote_ident()` does: identifiers that
/// would survive case folding and are not keywords are returned as is,
/// everything else is wrapped in double quotes with embedded quotes doubled.
pub(crate) fn quote_ident(ident: &str) -> String {
    if bare_identifier().is_match(ident) && QUOTED_KEYWORDS.binary_search(&ident).is_err() {
        return ident.to_string();
    }
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Escapes text for use inside a single-quoted string literal.
pub(crate) fn escape_literal(text: &str) -> String {
    text.replace('\'', "''")
}
