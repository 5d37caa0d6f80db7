use crate::types::FieldHint;
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum significant characters a free-text query must carry after
/// normalization.
pub const MIN_QUERY_CHARS: usize = 3;

pub const GUIDANCE_MSG: &str =
    "Enter at least 3 characters of a registration or chassis number, \
     or a complete registration number (e.g. MH12AB1234).";

// National plate grammar: 2-letter region, 2-digit district, 2-letter
// series, 4-digit serial.
static FULL_PLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2})\d{2}[A-Z]{2}(\d{4})$").unwrap());

// Cross-region series: 2-digit year, the reserved BH marker, 4-digit
// serial, optional 2-letter suffix.
static CROSS_REGION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}BH(\d{4})[A-Z]{0,2}$").unwrap());

// A region code followed only by digits ("DL 1234"): the serial letters are
// missing, so neither anchored matching nor a meaningful substring scan is
// possible.
static REGION_FRAGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2}\d+$").unwrap());

/// How a normalized query should be executed against the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// Full plate decomposed into region + last-4 serial, matched as an
    /// anchored pattern instead of a naive substring — mid-string digit
    /// collisions would otherwise produce false positives.
    Anchored { region: String, last4: String },
    /// Cross-region plate: the serial immediately follows the BH marker.
    CrossRegion { serial: String },
    /// Case-insensitive substring over the hinted fields.
    Substring(String),
    /// Query too short or ambiguous to run; return an empty result set
    /// with this message, not an error.
    Guidance(&'static str),
}

/// Canonical id form shared by the index writer and the query planner:
/// uppercase, ASCII alphanumerics only.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub fn plan_query(input: &str, hint: FieldHint) -> QueryPlan {
    let norm = normalize(input);

    // Plate grammar only applies to registrations; a chassis-hinted query
    // is plain text even when it happens to look like a plate.
    if hint != FieldHint::Chassis {
        if let Some(caps) = FULL_PLATE.captures(&norm) {
            return QueryPlan::Anchored {
                region: caps[1].to_string(),
                last4: caps[2].to_string(),
            };
        }
        if let Some(caps) = CROSS_REGION.captures(&norm) {
            return QueryPlan::CrossRegion {
                serial: caps[1].to_string(),
            };
        }
        if REGION_FRAGMENT.is_match(&norm) {
            return QueryPlan::Guidance(GUIDANCE_MSG);
        }
    }
    if norm.len() < MIN_QUERY_CHARS {
        return QueryPlan::Guidance(GUIDANCE_MSG);
    }
    QueryPlan::Substring(norm)
}

impl QueryPlan {
    /// The whole-term regex pattern for the registration field, if this
    /// plan matches registrations.
    pub(crate) fn registration_pattern(&self) -> Option<String> {
        match self {
            QueryPlan::Anchored { region, last4 } => Some(format!("{}.*{}", region, last4)),
            QueryPlan::CrossRegion { serial } => {
                Some(format!("[0-9]{{2}}BH{}[A-Z]{{0,2}}", serial))
            }
            QueryPlan::Substring(s) => Some(format!(".*{}.*", regex::escape(s))),
            QueryPlan::Guidance(_) => None,
        }
    }

    /// The whole-term regex pattern for the chassis field. Plate-grammar
    /// plans are registration-specific and never match chassis ids.
    pub(crate) fn chassis_pattern(&self) -> Option<String> {
        match self {
            QueryPlan::Substring(s) => Some(format!(".*{}.*", regex::escape(s))),
            _ => None,
        }
    }
}
