//! NAPTR substitution expressions (RFC 2915 section 3).
//!
//! A `regexp` field has the form `<d>ERE<d>replacement<d>flags`, where `<d>`
//! is the delimiter taken from the first character. The only flag is `i`
//! for case-insensitive matching. Back-references `\0`..`\9` in the
//! replacement insert the matching capture group.

use regex::RegexBuilder;
use thiserror::Error;

/// Shortest `regexp` value that can hold three delimiters and a body.
pub const MIN_REGEXP_LEN: usize = 4;

/// Why a substitution expression could not be applied.
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Fewer or more than three delimiter separated parts
    #[error("substitution expression '{0}' is not of the form <d>ERE<d>replacement<d>flags")]
    Malformed(String),

    /// The ERE does not compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The ERE did not match the input
    #[error("pattern '{pattern}' does not match '{input}'")]
    NoMatch {
        /// Pattern that was tried
        pattern: String,
        /// String it was applied to
        input: String,
    },
}

/// The three parts of a substitution expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionExpr<'a> {
    pub pattern: &'a str,
    pub replacement: &'a str,
    pub flags: &'a str,
}

impl<'a> SubstitutionExpr<'a> {
    /// Split a `regexp` field on its delimiter.
    pub fn parse(regexp: &'a str) -> Result<Self, RewriteError> {
        let mut chars = regexp.chars();
        let delim = chars
            .next()
            .ok_or_else(|| RewriteError::Malformed(regexp.to_string()))?;
        let body = &regexp[delim.len_utf8()..];

        let mut parts = body.splitn(3, delim);
        let (Some(pattern), Some(replacement), Some(flags)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(RewriteError::Malformed(regexp.to_string()));
        };
        if flags.contains(delim) {
            return Err(RewriteError::Malformed(regexp.to_string()));
        }

        Ok(Self {
            pattern,
            replacement,
            flags,
        })
    }

    #[must_use]
    pub fn case_insensitive(&self) -> bool {
        self.flags.eq_ignore_ascii_case("i")
    }

    /// Apply the expression to `input`.
    pub fn apply(&self, input: &str) -> Result<String, RewriteError> {
        let re = RegexBuilder::new(self.pattern)
            .case_insensitive(self.case_insensitive())
            .build()?;

        if !re.is_match(input) {
            return Err(RewriteError::NoMatch {
                pattern: self.pattern.to_string(),
                input: input.to_string(),
            });
        }

        let replacement = translate_replacement(self.replacement);
        Ok(re.replace(input, replacement.as_str()).into_owned())
    }
}

/// Parse and apply a `regexp` field in one go.
pub fn apply_substitution(regexp: &str, input: &str) -> Result<String, RewriteError> {
    SubstitutionExpr::parse(regexp)?.apply(input)
}

/// Turn an RFC 2915 replacement into `regex` replacement syntax.
///
/// `\N` becomes `${N}`, any other escaped character is taken literally and a
/// literal `$` is doubled.
fn translate_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 8);
    let mut chars = replacement.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(d) if d.is_ascii_digit() => {
                    out.push_str("${");
                    out.push(d);
                    out.push('}');
                }
                Some('$') => out.push_str("$$"),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            '$' => out.push_str("$$"),
            other => out.push(other),
        }
    }
    out
}
