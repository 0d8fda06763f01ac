//! Line/identifier heuristics behind the refactoring and code-assist
//! operations.
//!
//! The planner works on whole source buffers: it locates identifiers by
//! offset, rewrites the buffer, and packages the result as a full-content
//! edit whose description is a unified diff. Definitions are recognized from
//! `def`/`class` headers and top-of-line assignments.

use crate::diff::unified_diff;
use once_cell::sync::Lazy;
use regex::Regex;
use strand_foundation::{
    ChangeSet, CompletionCandidate, DefinitionLocation, EditPayload, ResourceChange, StrandError,
    StrandResult,
};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap()
});

static DEF: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?m)^([ \t]*)def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap()
});

static CLASS: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?m)^([ \t]*)class\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?m)^([ \t]*)([A-Za-z_][A-Za-z0-9_]*)\s*=(?:[^=]|$)").unwrap()
});

/// One recognized definition in a source buffer.
struct Definition {
    name: String,
    kind: &'static str,
    /// Byte offset of the name within the buffer
    name_start: usize,
    /// Leading whitespace of the defining line
    indent: String,
    doc: Option<String>,
}

// ---------------------------------------------------------------------------
// Refactoring planners
// ---------------------------------------------------------------------------

/// Plan extraction of `[start, end)` into a new method named `name`.
///
/// The region is replaced by a call and the helper definition is appended at
/// module level. Single-line regions become a `return` expression; multi-line
/// regions are reindented into the helper body.
pub(crate) fn plan_extract_method(
    source: &str,
    path: &str,
    name: &str,
    start: usize,
    end: usize,
) -> StrandResult<ChangeSet> {
    validate_identifier(name)?;
    let snippet = region(source, start, end)?;

    let mut rewritten = String::with_capacity(source.len() + snippet.len() + 64);
    rewritten.push_str(&source[..start]);
    rewritten.push_str(name);
    rewritten.push_str("()");
    rewritten.push_str(&source[end..]);
    if !rewritten.ends_with('\n') {
        rewritten.push('\n');
    }
    rewritten.push_str("\n\ndef ");
    rewritten.push_str(name);
    rewritten.push_str("():\n");
    rewritten.push_str(&helper_body(snippet));

    Ok(full_content_edit(
        format!("Extract method {name}"),
        path,
        source,
        rewritten,
    ))
}

/// Plan extraction of the single-line expression `[start, end)` into a new
/// variable named `name`, assigned just above the statement it came from.
pub(crate) fn plan_extract_variable(
    source: &str,
    path: &str,
    name: &str,
    start: usize,
    end: usize,
) -> StrandResult<ChangeSet> {
    validate_identifier(name)?;
    let snippet = region(source, start, end)?;
    if snippet.contains('\n') {
        return Err(StrandError::analysis(
            "extract variable requires a single-line expression",
        ));
    }

    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let indent: String = source[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();

    let mut rewritten = String::with_capacity(source.len() + snippet.len() + 32);
    rewritten.push_str(&source[..line_start]);
    rewritten.push_str(&indent);
    rewritten.push_str(name);
    rewritten.push_str(" = ");
    rewritten.push_str(snippet);
    rewritten.push('\n');
    rewritten.push_str(&source[line_start..start]);
    rewritten.push_str(name);
    rewritten.push_str(&source[end..]);

    Ok(full_content_edit(
        format!("Extract variable {name}"),
        path,
        source,
        rewritten,
    ))
}

/// Plan renaming the identifier at `offset` to `new_name`, across the whole
/// buffer at word boundaries.
pub(crate) fn plan_rename_symbol(
    source: &str,
    path: &str,
    new_name: &str,
    offset: usize,
) -> StrandResult<ChangeSet> {
    validate_identifier(new_name)?;
    let (old_name, _, _) = identifier_at(source, offset)?;

    let occurrence = Regex::new(&format!(r"\b{}\b", regex::escape(&old_name)))
        .map_err(|e| StrandError::internal(format!("rename pattern: {e}")))?;
    let rewritten = occurrence.replace_all(source, new_name).into_owned();

    Ok(full_content_edit(
        format!("Rename {old_name} to {new_name}"),
        path,
        source,
        rewritten,
    ))
}

/// Plan renaming the resource itself (no offset): a move within its parent
/// folder, keeping the file extension when the new name does not carry one.
pub(crate) fn plan_rename_resource(path: &str, new_name: &str) -> StrandResult<ChangeSet> {
    let (parent, file_name) = match path.rfind('/') {
        Some(idx) => (&path[..idx + 1], &path[idx + 1..]),
        None => ("", path),
    };
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext);
    let target_name = match extension {
        Some(ext) if !new_name.contains('.') => format!("{new_name}.{ext}"),
        _ => new_name.to_string(),
    };
    let to = format!("{parent}{target_name}");
    if to == path {
        return Err(StrandError::analysis(format!(
            "'{path}' already has that name"
        )));
    }

    Ok(ChangeSet::new(
        format!("Rename {path} to {to}"),
        vec![ResourceChange {
            path: path.to_string(),
            description: format!("Move {path} to {to}"),
            payload: EditPayload::Move { to },
        }],
    ))
}

// ---------------------------------------------------------------------------
// Code intelligence
// ---------------------------------------------------------------------------

/// Completion candidates for the point `offset` in `code`: every recognized
/// definition whose name starts with the identifier prefix ending at the
/// offset.
pub(crate) fn complete(code: &str, offset: usize) -> StrandResult<Vec<CompletionCandidate>> {
    check_offset(code, offset)?;
    let prefix = prefix_at(code, offset);

    let mut seen = std::collections::HashSet::new();
    let mut candidates: Vec<CompletionCandidate> = definitions(code)
        .into_iter()
        .filter(|d| d.name.starts_with(prefix))
        .filter(|d| seen.insert(d.name.clone()))
        .map(|d| CompletionCandidate {
            scope: if d.indent.is_empty() { "global" } else { "local" }.to_string(),
            kind: d.kind.to_string(),
            name: d.name,
            doc: d.doc,
        })
        .collect();
    candidates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(candidates)
}

/// Documentation for the object at `offset`: the docstring of its `def` or
/// `class` definition, if one exists in the buffer.
pub(crate) fn doc(code: &str, offset: usize) -> StrandResult<Option<String>> {
    let (name, _, _) = identifier_at(code, offset)?;
    Ok(definitions(code)
        .into_iter()
        .find(|d| d.name == name)
        .and_then(|d| d.doc))
}

/// Location of the definition of the symbol at `offset`, within the provided
/// buffer. A hit reports no path (same-resource); the session substitutes the
/// queried path.
pub(crate) fn definition_location(code: &str, offset: usize) -> StrandResult<DefinitionLocation> {
    let (name, _, _) = identifier_at(code, offset)?;
    Ok(definitions(code)
        .into_iter()
        .find(|d| d.name == name)
        .map(|d| DefinitionLocation::same_resource(line_of(code, d.name_start)))
        .unwrap_or_else(DefinitionLocation::none))
}

// ---------------------------------------------------------------------------
// Buffer helpers
// ---------------------------------------------------------------------------

fn full_content_edit(
    description: String,
    path: &str,
    old_text: &str,
    new_text: String,
) -> ChangeSet {
    ChangeSet::new(
        description,
        vec![ResourceChange {
            path: path.to_string(),
            description: unified_diff(path, old_text, &new_text),
            payload: EditPayload::Edit {
                old_text: old_text.to_string(),
                new_text,
            },
        }],
    )
}

fn validate_identifier(name: &str) -> StrandResult<()> {
    let valid = IDENTIFIER
        .find(name)
        .is_some_and(|m| m.start() == 0 && m.end() == name.len());
    if valid {
        Ok(())
    } else {
        Err(StrandError::analysis(format!(
            "'{name}' is not a valid identifier"
        )))
    }
}

fn check_offset(code: &str, offset: usize) -> StrandResult<()> {
    if offset > code.len() || !code.is_char_boundary(offset) {
        return Err(StrandError::analysis(format!(
            "offset {offset} is not within the source"
        )));
    }
    Ok(())
}

/// The extraction region `[start, end)`, trimmed; half-open and validated.
fn region(source: &str, start: usize, end: usize) -> StrandResult<&str> {
    if start > end {
        return Err(StrandError::analysis(format!(
            "extraction range {start}..{end} is inverted"
        )));
    }
    check_offset(source, start)?;
    check_offset(source, end)?;
    let snippet = source[start..end].trim();
    if snippet.is_empty() {
        return Err(StrandError::analysis(format!(
            "extraction range {start}..{end} selects no code"
        )));
    }
    Ok(snippet)
}

/// The identifier covering (or ending exactly at) `offset`.
fn identifier_at(code: &str, offset: usize) -> StrandResult<(String, usize, usize)> {
    check_offset(code, offset)?;
    IDENTIFIER
        .find_iter(code)
        .find(|m| m.start() <= offset && offset <= m.end())
        .map(|m| (m.as_str().to_string(), m.start(), m.end()))
        .ok_or_else(|| StrandError::analysis(format!("no identifier at offset {offset}")))
}

/// Identifier prefix ending at `offset` (possibly empty).
fn prefix_at(code: &str, offset: usize) -> &str {
    let bytes = code.as_bytes();
    let mut start = offset;
    while start > 0 && (bytes[start - 1].is_ascii_alphanumeric() || bytes[start - 1] == b'_') {
        start -= 1;
    }
    &code[start..offset]
}

fn line_of(code: &str, byte_offset: usize) -> u32 {
    code[..byte_offset].matches('\n').count() as u32 + 1
}

fn helper_body(snippet: &str) -> String {
    if !snippet.contains('\n') {
        return format!("    return {snippet}\n");
    }
    let margin = snippet
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    snippet
        .lines()
        .map(|l| {
            if l.trim().is_empty() {
                "\n".to_string()
            } else {
                format!("    {}\n", &l[margin..])
            }
        })
        .collect()
}

fn definitions(code: &str) -> Vec<Definition> {
    let mut found = Vec::new();
    for captures in DEF.captures_iter(code) {
        if let (Some(indent), Some(name)) = (captures.get(1), captures.get(2)) {
            found.push(Definition {
                name: name.as_str().to_string(),
                kind: "function",
                name_start: name.start(),
                indent: indent.as_str().to_string(),
                doc: docstring_after(code, captures.get(0).map_or(0, |m| m.end())),
            });
        }
    }
    for captures in CLASS.captures_iter(code) {
        if let (Some(indent), Some(name)) = (captures.get(1), captures.get(2)) {
            found.push(Definition {
                name: name.as_str().to_string(),
                kind: "class",
                name_start: name.start(),
                indent: indent.as_str().to_string(),
                doc: docstring_after(code, captures.get(0).map_or(0, |m| m.end())),
            });
        }
    }
    for captures in ASSIGNMENT.captures_iter(code) {
        if let (Some(indent), Some(name)) = (captures.get(1), captures.get(2)) {
            found.push(Definition {
                name: name.as_str().to_string(),
                kind: "variable",
                name_start: name.start(),
                indent: indent.as_str().to_string(),
                doc: None,
            });
        }
    }
    found.sort_by_key(|d| d.name_start);
    found
}

/// Single-line docstring on the line following a definition header.
fn docstring_after(code: &str, header_offset: usize) -> Option<String> {
    let rest = &code[header_offset..];
    let line_end = rest.find('\n')?;
    let next_line = rest[line_end + 1..].lines().next()?.trim();
    for quote in ["\"\"\"", "'''"] {
        if let Some(inner) = next_line
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            if !inner.is_empty() {
                return Some(inner.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SNIPPET: &str = "def f():\n    x = 1 + 2\n    return x\n";

    fn only_edit(change_set: &ChangeSet) -> (&str, &str) {
        assert_eq!(change_set.changes.len(), 1);
        match &change_set.changes[0].payload {
            EditPayload::Edit { old_text, new_text } => (old_text, new_text),
            other => panic!("expected an edit payload, got {other:?}"),
        }
    }

    #[test]
    fn extract_method_rewrites_and_appends_a_helper() {
        let start = SNIPPET.find("1 + 2").unwrap();
        let change_set =
            plan_extract_method(SNIPPET, "mod.py", "_aux", start, start + "1 + 2".len()).unwrap();

        assert_eq!(change_set.description, "Extract method _aux");
        let (old, new) = only_edit(&change_set);
        assert_eq!(old, SNIPPET);
        assert_eq!(
            new,
            "def f():\n    x = _aux()\n    return x\n\n\ndef _aux():\n    return 1 + 2\n"
        );
    }

    #[test]
    fn extract_variable_inserts_an_assignment_above() {
        let start = SNIPPET.find("1 + 2").unwrap();
        let change_set =
            plan_extract_variable(SNIPPET, "mod.py", "total", start, start + "1 + 2".len())
                .unwrap();

        let (_, new) = only_edit(&change_set);
        assert_eq!(
            new,
            "def f():\n    total = 1 + 2\n    x = total\n    return x\n"
        );
    }

    #[test]
    fn extraction_rejects_empty_and_inverted_ranges() {
        assert!(plan_extract_method(SNIPPET, "mod.py", "_aux", 9, 9).is_err());
        assert!(plan_extract_method(SNIPPET, "mod.py", "_aux", 9, 4).is_err());
        assert!(plan_extract_method(SNIPPET, "mod.py", "not valid!", 0, 3).is_err());
    }

    #[test]
    fn rename_replaces_word_boundary_occurrences_only() {
        let source = "val = 1\nvalue = val + val\n";
        let offset = source.find("val").unwrap();
        let change_set = plan_rename_symbol(source, "mod.py", "count", offset).unwrap();

        assert_eq!(change_set.description, "Rename val to count");
        let (_, new) = only_edit(&change_set);
        assert_eq!(new, "count = 1\nvalue = count + count\n");
    }

    #[test]
    fn resource_rename_keeps_the_extension() {
        let change_set = plan_rename_resource("pkg/old_mod.py", "new_mod").unwrap();
        assert_eq!(
            change_set.changes[0].payload,
            EditPayload::Move {
                to: "pkg/new_mod.py".to_string()
            }
        );
    }

    #[test]
    fn completion_matches_the_prefix_before_the_offset() {
        let code = "def parse(source):\n    \"\"\"Parse a module.\"\"\"\n    pass\n\ndef print_tree():\n    pass\n\npar";
        let candidates = complete(code, code.len()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "parse");
        assert_eq!(candidates[0].kind, "function");
        assert_eq!(candidates[0].scope, "global");
        assert_eq!(candidates[0].doc.as_deref(), Some("Parse a module."));
    }

    #[test]
    fn doc_finds_the_docstring_of_the_named_definition() {
        let code = "def greet():\n    '''Say hello.'''\n    pass\n\ngreet()\n";
        let offset = code.rfind("greet").unwrap();
        assert_eq!(doc(code, offset).unwrap().as_deref(), Some("Say hello."));
    }

    #[test]
    fn definition_location_reports_one_based_lines() {
        let code = "top = 1\n\ndef f():\n    return top\n";
        let offset = code.rfind("top").unwrap();
        let location = definition_location(code, offset).unwrap();
        assert_eq!(location.path, None);
        assert_eq!(location.line, Some(1));
    }

    #[test]
    fn unresolved_symbols_have_no_definition_location() {
        let code = "print(mystery)\n";
        let offset = code.find("mystery").unwrap();
        assert_eq!(
            definition_location(code, offset).unwrap(),
            DefinitionLocation::none()
        );
    }
}
