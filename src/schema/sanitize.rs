use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::error::LoadError;

/// Placeholder used when a header has no usable characters at all.
pub const EMPTY_PLACEHOLDER: &str = "col";

static NON_IDENT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static VALID_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap());

/// Map a raw header to a candidate identifier.
///
///  - trim + lowercase
///  - collapse every run outside `[a-z0-9]` into one `_`
///  - strip `_` from both ends
///  - prefix `_` if it starts with a digit
///  - fall back to `col` if nothing is left
///
/// The result is not unique against sibling headers; see [`resolve_identifiers`].
pub fn sanitize_identifier(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let replaced = NON_IDENT_RUN.replace_all(&lowered, "_");
    let mut ident = replaced.trim_matches('_').to_string();

    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if ident.is_empty() {
        ident = EMPTY_PLACEHOLDER.to_string();
    }
    ident
}

/// True if `s` is non-empty, does not start with a digit and only holds `[a-z0-9_]`.
pub fn is_valid_identifier(s: &str) -> bool {
    VALID_IDENT.is_match(s)
}

/// A header's base identifier together with its collision-free final name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub base: String,
    pub name: String,
}

/// Sanitize every header and make the results pairwise distinct.
///
/// Headers are processed in order; a base already taken gets `_2`, `_3`, ...
/// (first free suffix wins). Only suffixes up to `headers.len() + 1` are ever
/// needed, so running past that is an invariant violation.
pub fn resolve_identifiers<S: AsRef<str>>(headers: &[S]) -> Result<Vec<ResolvedName>, LoadError> {
    let mut used: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut out = Vec::with_capacity(headers.len());

    for header in headers {
        let header = header.as_ref();
        let base = sanitize_identifier(header);

        let name = if used.contains(&base) {
            (2..=headers.len() + 1)
                .map(|suffix| format!("{}_{}", base, suffix))
                .find(|candidate| !used.contains(candidate))
                .ok_or_else(|| LoadError::SchemaCollisionUnresolved {
                    header: header.to_string(),
                })?
        } else {
            base.clone()
        };

        used.insert(name.clone());
        out.push(ResolvedName { base, name });
    }

    Ok(out)
}
