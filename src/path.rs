use itertools::Either;
use tracing::debug;

use crate::errors::{AdsError, Result};
use crate::tokenizer::Tokenizer;

/// Prefix used for domain components in a distinguished name.
pub const DC_PREFIX: &str = "dc=";

/// Builds a comma separated LDAP path from `name`.
///
/// `name` is tokenized on any character of `separators`; each token gets
/// `field_prefix` prepended. With `reverse` false the segments keep input
/// order (`"example.com"` -> `"dc=example,dc=com"`), with `reverse` true the
/// last token comes first.
///
/// An empty name, or one made only of separators, builds an empty path.
pub fn build_path(name: &str, separators: &str, field_prefix: &str, reverse: bool) -> Result<String> {
    let tokenizer = Tokenizer::new(name, separators);
    // one segment per separator plus one, each with its prefix and a comma
    let capacity = tokenizer
        .separator_count()
        .checked_add(1)
        .and_then(|segments| segments.checked_mul(field_prefix.len() + 1))
        .and_then(|n| n.checked_add(name.len() + 1))
        .ok_or_else(|| AdsError::Truncation(name.to_string()))?;

    let tokens: Vec<&str> = tokenizer.collect();
    if tokens.is_empty() {
        return Ok(String::new());
    }

    let mut out = String::new();
    out.try_reserve_exact(capacity)
        .map_err(|e| AdsError::Allocation(format!("{capacity} bytes for path: {e}")))?;

    let ordered = if reverse {
        Either::Left(tokens.iter().rev())
    } else {
        Either::Right(tokens.iter())
    };
    for (i, token) in ordered.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(field_prefix);
        out.push_str(token);
    }

    debug!(input = name, path = %out, reverse, "built ldap path");
    Ok(out)
}

/// Builds `dc=AA,dc=BB,dc=CC` from a realm of the form `AA.BB.CC`.
pub fn build_dn(realm: &str) -> Result<String> {
    build_path(realm, ".", DC_PREFIX, false)
}

/// Builds a DNS name `aa.bb.cc` from `dc=AA,dc=BB,dc=CC`.
///
/// This is a textual rewrite, not a DN parser: the input is lower-cased, every
/// `dc=` is removed and every comma becomes a period. A DN carrying other
/// attribute types, or a `dc=` inside a value, gives a meaningless domain.
pub fn build_domain(dn: &str) -> String {
    dn.to_lowercase().replace(DC_PREFIX, "").replace(',', ".")
}
