// crates/render-probe-core/src/core/check.rs
// ============================================================================
// Module: Response Checks
// Description: Declarative assertions evaluated against captured responses.
// Purpose: Turn response expectations into data so failures carry exact reasons.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Checks are declarative so a probe definition is inspectable data rather
//! than opaque closures: every violated check yields a human-readable reason
//! string that the report and audit trail carry verbatim. Evaluation never
//! panics and never short-circuits; all reasons for a response are collected
//! in one pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::report::ResponseSnapshot;

// ============================================================================
// SECTION: Single-Response Checks
// ============================================================================

/// One declarative assertion over a single response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Status code equals the given value.
    StatusIs(u16),
    /// Status code falls within the inclusive range.
    StatusInRange {
        /// Lower bound (inclusive).
        lo: u16,
        /// Upper bound (inclusive).
        hi: u16,
    },
    /// Header is present with exactly the given value.
    HeaderEquals {
        /// Header name (case-insensitive).
        name: String,
        /// Expected value (exact match).
        value: String,
    },
    /// Header is present with any value.
    HeaderPresent {
        /// Header name (case-insensitive).
        name: String,
    },
    /// Body contains the needle at least once.
    BodyContains(String),
    /// Body does not contain the needle.
    BodyLacks(String),
    /// Body is empty.
    BodyIsEmpty,
    /// Body contains every needle, in any order.
    BodyContainsAll(Vec<String>),
    /// Body contains every needle at strictly increasing positions.
    BodyContainsInOrder(Vec<String>),
    /// Body contains the needle exactly `count` times (non-overlapping).
    BodyCountEquals {
        /// Substring to count.
        needle: String,
        /// Expected occurrence count.
        count: usize,
    },
    /// Body parses as JSON and the pointer resolves to the given value.
    JsonFieldEquals {
        /// RFC 6901 JSON pointer.
        pointer: String,
        /// Expected value (exact equality).
        value: Value,
    },
    /// Body parses as JSON and the pointer resolves to some value.
    JsonFieldPresent {
        /// RFC 6901 JSON pointer.
        pointer: String,
    },
    /// Some `Set-Cookie` header sets the given name to the given value.
    SetCookiePresent {
        /// Cookie name.
        name: String,
        /// Expected cookie value.
        value: String,
    },
    /// Some `Set-Cookie` header clears the given name (empty value plus a
    /// `Max-Age=0` or `Expires` attribute; expiry instants are not parsed).
    SetCookieCleared {
        /// Cookie name.
        name: String,
    },
}

impl Check {
    /// Evaluates the check against one response.
    ///
    /// Returns an empty vector when the check holds; otherwise one reason per
    /// violation.
    #[must_use]
    pub fn evaluate(&self, response: &ResponseSnapshot) -> Vec<String> {
        match self {
            Self::StatusIs(expected) => {
                if response.status == *expected {
                    Vec::new()
                } else {
                    vec![format!("status {} != expected {expected}", response.status)]
                }
            }
            Self::StatusInRange {
                lo,
                hi,
            } => {
                if (*lo ..= *hi).contains(&response.status) {
                    Vec::new()
                } else {
                    vec![format!("status {} outside expected {lo}..={hi}", response.status)]
                }
            }
            Self::HeaderEquals {
                name,
                value,
            } => match first_header(response, name) {
                Some(found) if found == value => Vec::new(),
                Some(found) => {
                    vec![format!("header {name} = {found:?} != expected {value:?}")]
                }
                None => vec![format!("header {name} missing")],
            },
            Self::HeaderPresent {
                name,
            } => {
                if first_header(response, name).is_some() {
                    Vec::new()
                } else {
                    vec![format!("header {name} missing")]
                }
            }
            Self::BodyContains(needle) => {
                if response.body.contains(needle) {
                    Vec::new()
                } else {
                    vec![format!("body missing {needle:?}")]
                }
            }
            Self::BodyLacks(needle) => {
                if response.body.contains(needle) {
                    vec![format!("body unexpectedly contains {needle:?}")]
                } else {
                    Vec::new()
                }
            }
            Self::BodyIsEmpty => {
                if response.body.is_empty() {
                    Vec::new()
                } else {
                    vec![format!("body not empty ({} bytes)", response.body.len())]
                }
            }
            Self::BodyContainsAll(needles) => needles
                .iter()
                .filter(|needle| !response.body.contains(needle.as_str()))
                .map(|needle| format!("body missing {needle:?}"))
                .collect(),
            Self::BodyContainsInOrder(needles) => in_order_reasons(&response.body, needles),
            Self::BodyCountEquals {
                needle,
                count,
            } => {
                let found = response.body.matches(needle.as_str()).count();
                if found == *count {
                    Vec::new()
                } else {
                    vec![format!("body contains {needle:?} {found} times, expected {count}")]
                }
            }
            Self::JsonFieldEquals {
                pointer,
                value,
            } => match parse_json(&response.body) {
                Ok(root) => match root.pointer(pointer) {
                    Some(found) if found == value => Vec::new(),
                    Some(found) => {
                        vec![format!("json {pointer} = {found} != expected {value}")]
                    }
                    None => vec![format!("json pointer {pointer} not found")],
                },
                Err(reason) => vec![reason],
            },
            Self::JsonFieldPresent {
                pointer,
            } => match parse_json(&response.body) {
                Ok(root) => {
                    if root.pointer(pointer).is_some() {
                        Vec::new()
                    } else {
                        vec![format!("json pointer {pointer} not found")]
                    }
                }
                Err(reason) => vec![reason],
            },
            Self::SetCookiePresent {
                name,
                value,
            } => {
                let matched = set_cookie_values(response)
                    .any(|raw| cookie_pair(raw).is_some_and(|(n, v)| n == name && v == value));
                if matched {
                    Vec::new()
                } else {
                    vec![format!("no set-cookie sets {name}={value}")]
                }
            }
            Self::SetCookieCleared {
                name,
            } => {
                let cleared = set_cookie_values(response).any(|raw| is_clearing_cookie(raw, name));
                if cleared {
                    Vec::new()
                } else {
                    vec![format!("no set-cookie clears {name}")]
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Cross-Step Checks
// ============================================================================

/// Substring window extracted from a response body.
///
/// # Invariants
/// - Extraction uses the first occurrence of `after`, then the first
///   occurrence of `until` past it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyExtract {
    /// Marker preceding the window.
    pub after: String,
    /// Marker terminating the window.
    pub until: String,
}

impl BodyExtract {
    /// Creates an extraction window.
    #[must_use]
    pub fn between(after: impl Into<String>, until: impl Into<String>) -> Self {
        Self {
            after: after.into(),
            until: until.into(),
        }
    }

    /// Applies the window to a body, returning the enclosed text.
    #[must_use]
    pub fn apply(&self, body: &str) -> Option<String> {
        let start = body.find(self.after.as_str())? + self.after.len();
        let rest = body.get(start ..)?;
        let end = rest.find(self.until.as_str())?;
        rest.get(.. end).map(str::to_owned)
    }
}

/// One declarative assertion spanning two step responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossCheck {
    /// Extracted windows from two steps must differ.
    ExtractsDiffer {
        /// Index of the first step.
        first_step: usize,
        /// Index of the second step.
        second_step: usize,
        /// Extraction window applied to both bodies.
        extract: BodyExtract,
    },
    /// Extracted windows from two steps must be equal.
    ExtractsEqual {
        /// Index of the first step.
        first_step: usize,
        /// Index of the second step.
        second_step: usize,
        /// Extraction window applied to both bodies.
        extract: BodyExtract,
    },
}

impl CrossCheck {
    /// Returns the pair of step indices this check references.
    #[must_use]
    pub const fn step_refs(&self) -> (usize, usize) {
        match self {
            Self::ExtractsDiffer {
                first_step,
                second_step,
                ..
            }
            | Self::ExtractsEqual {
                first_step,
                second_step,
                ..
            } => (*first_step, *second_step),
        }
    }

    /// Evaluates the check against the full set of step responses.
    ///
    /// Returns an empty vector when the check holds; otherwise one reason per
    /// violation.
    #[must_use]
    pub fn evaluate(&self, responses: &[ResponseSnapshot]) -> Vec<String> {
        let (first, second, extract, want_equal) = match self {
            Self::ExtractsDiffer {
                first_step,
                second_step,
                extract,
            } => (*first_step, *second_step, extract, false),
            Self::ExtractsEqual {
                first_step,
                second_step,
                extract,
            } => (*first_step, *second_step, extract, true),
        };
        let Some(first_body) = responses.get(first).map(|r| r.body.as_str()) else {
            return vec![format!("cross-check references missing step {first}")];
        };
        let Some(second_body) = responses.get(second).map(|r| r.body.as_str()) else {
            return vec![format!("cross-check references missing step {second}")];
        };
        let Some(first_value) = extract.apply(first_body) else {
            return vec![format!("step {first} body missing marker {:?}", extract.after)];
        };
        let Some(second_value) = extract.apply(second_body) else {
            return vec![format!("step {second} body missing marker {:?}", extract.after)];
        };
        let equal = first_value == second_value;
        if equal == want_equal {
            Vec::new()
        } else if want_equal {
            vec![format!(
                "extracted values differ: step {first} {first_value:?} vs step {second} \
                 {second_value:?}"
            )]
        } else {
            vec![format!("extracted value {first_value:?} repeated across steps {first} and {second}")]
        }
    }
}

// ============================================================================
// SECTION: Evaluation Helpers
// ============================================================================

/// Returns the first value of a header, matched case-insensitively.
fn first_header<'a>(response: &'a ResponseSnapshot, name: &str) -> Option<&'a str> {
    response
        .headers
        .iter()
        .find(|(header, _)| header.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Iterates over all `Set-Cookie` header values.
fn set_cookie_values(response: &ResponseSnapshot) -> impl Iterator<Item = &str> {
    response
        .headers
        .iter()
        .filter(|(header, _)| header.eq_ignore_ascii_case("set-cookie"))
        .map(|(_, value)| value.as_str())
}

/// Splits a `Set-Cookie` value into its leading name/value pair.
fn cookie_pair(raw: &str) -> Option<(&str, &str)> {
    let lead = raw.split(';').next()?;
    let (name, value) = lead.split_once('=')?;
    Some((name.trim(), value.trim()))
}

/// Reports whether a `Set-Cookie` value clears the named cookie.
fn is_clearing_cookie(raw: &str, name: &str) -> bool {
    let Some((cookie_name, cookie_value)) = cookie_pair(raw) else {
        return false;
    };
    if cookie_name != name || !cookie_value.is_empty() {
        return false;
    }
    raw.split(';').skip(1).any(|attr| {
        let attr = attr.trim().to_ascii_lowercase();
        attr == "max-age=0" || attr.starts_with("expires=")
    })
}

/// Collects reasons for needles that break the in-order requirement.
fn in_order_reasons(body: &str, needles: &[String]) -> Vec<String> {
    let mut reasons = Vec::new();
    let mut position = 0_usize;
    for needle in needles {
        match body.get(position ..).and_then(|rest| rest.find(needle.as_str())) {
            Some(offset) => {
                position += offset + needle.len();
            }
            None => {
                if body.contains(needle.as_str()) {
                    reasons.push(format!("{needle:?} present but out of order"));
                } else {
                    reasons.push(format!("body missing {needle:?}"));
                }
            }
        }
    }
    reasons
}

/// Parses a response body as JSON with a reason-style error.
fn parse_json(body: &str) -> Result<Value, String> {
    serde_json::from_str(body).map_err(|err| format!("body is not valid json: {err}"))
}
