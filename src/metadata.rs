use std::io::{self, Write};

use crate::ident::{escape_literal, quote_ident};
use crate::objects::{Acl, ObjectMetadata, ObjectType, Privilege, Target};

/// Writes the comment, owner and privilege statements for one object. Each
/// block is padded with a leading blank line; missing metadata writes nothing.
pub(crate) fn print_object_metadata<W: Write>(
    out: &mut W,
    metadata: Option<&ObjectMetadata>,
    target: &Target,
) -> io::Result<()> {
    let Some(metadata) = metadata else {
        return Ok(());
    };
    if let Some(comment) = comment_statement(metadata, target) {
        writeln!(out, "{comment}")?;
    }
    if let Some(owner) = owner_statement(metadata, target) {
        writeln!(out, "{owner}")?;
    }
    if let Some(privileges) = privileges_statements(metadata, target) {
        writeln!(out, "{privileges}")?;
    }
    Ok(())
}

fn comment_statement(metadata: &ObjectMetadata, target: &Target) -> Option<String> {
    let comment = metadata.comment.as_deref().filter(|c| !c.is_empty())?;
    let on_table = target
        .owning_table()
        .map(|table| format!(" ON {table}"))
        .unwrap_or_default();
    Some(format!(
        "\n\nCOMMENT ON {} {}{on_table} IS '{}';",
        target.kind().keyword(),
        target.name(),
        escape_literal(comment)
    ))
}

fn owner_statement(metadata: &ObjectMetadata, target: &Target) -> Option<String> {
    let kind = target.kind();
    if !kind.has_owner() {
        return None;
    }
    let owner = metadata.owner.as_deref().filter(|o| !o.is_empty())?;
    Some(format!(
        "\n\nALTER {} {} OWNER TO {};",
        kind.keyword(),
        target.name(),
        quote_ident(owner)
    ))
}

fn privileges_statements(metadata: &ObjectMetadata, target: &Target) -> Option<String> {
    let kind = target.kind();
    if metadata.privileges.is_empty() || kind.privileges().is_empty() {
        return None;
    }
    let on = format!("{} {}", kind.keyword(), target.name());

    let mut statements = vec![format!("REVOKE ALL ON {on} FROM PUBLIC;")];
    if let Some(owner) = metadata.owner.as_deref().filter(|o| !o.is_empty()) {
        statements.push(format!("REVOKE ALL ON {on} FROM {};", quote_ident(owner)));
    }
    for acl in &metadata.privileges {
        grant_statements(&mut statements, acl, kind, &on);
    }
    Some(format!("\n\n{}", statements.join("\n")))
}

fn grant_statements(statements: &mut Vec<String>, acl: &Acl, kind: ObjectType, on: &str) {
    let grantee = match acl.grantee.as_deref() {
        None | Some("") => "PUBLIC".to_string(),
        Some(role) => quote_ident(role),
    };
    let all = kind.privileges();
    let plain: Vec<Privilege> = all
        .iter()
        .copied()
        .filter(|p| acl.privileges.contains(p) && !acl.grantable.contains(p))
        .collect();
    let grantable: Vec<Privilege> = all.iter().copied().filter(|p| acl.grantable.contains(p)).collect();

    for (privileges, suffix) in [(plain, ""), (grantable, " WITH GRANT OPTION")] {
        if privileges.is_empty() {
            continue;
        }
        if privileges.len() == all.len() {
            statements.push(format!("GRANT ALL ON {on} TO {grantee}{suffix};"));
        } else {
            for privilege in privileges {
                statements.push(format!("GRANT {} ON {on} TO {grantee}{suffix};", privilege.keyword()));
            }
        }
    }
}
