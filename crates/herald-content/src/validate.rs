//! Kind-specific validation.

use crate::error::ValidationError;
use crate::event::{wire, Event, EventKind};

/// Required fields for alpha-token events, checked in this order.
pub const ALPHA_REQUIRED_FIELDS: [&str; 7] = [
    "type", "chain", "name", "symbol", "amount", "contract", "explorer",
];

/// Non-fatal findings on an otherwise valid event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Discriminator resolved to a known kind but is not spelled canonically.
    NonCanonicalDiscriminator {
        found: String,
        expected: &'static str,
    },
}

/// Result of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub kind: EventKind,
    pub warnings: Vec<ValidationWarning>,
}

/// Check that an event is renderable.
///
/// Alpha-token events need every field in [`ALPHA_REQUIRED_FIELDS`]; every
/// other kind needs a non-empty `message`. The first missing field is
/// reported.
pub fn validate(event: &Event) -> Result<ValidationReport, ValidationError> {
    let kind = event.kind();
    let mut warnings = Vec::new();

    match kind {
        EventKind::AlphaNewToken => {
            if let Some(field) = ALPHA_REQUIRED_FIELDS
                .iter()
                .copied()
                .find(|field| !has_value(event, field))
            {
                return Err(ValidationError { field });
            }

            if let Some(found) = event.raw_discriminator() {
                if found != wire::ALPHA_NEW_TOKEN {
                    tracing::warn!(
                        found = %found,
                        expected = wire::ALPHA_NEW_TOKEN,
                        "Event discriminator is not canonical"
                    );
                    warnings.push(ValidationWarning::NonCanonicalDiscriminator {
                        found: found.to_string(),
                        expected: wire::ALPHA_NEW_TOKEN,
                    });
                }
            }
        }
        _ => {
            if !non_empty(event.message.as_deref()) {
                return Err(ValidationError { field: "message" });
            }
        }
    }

    Ok(ValidationReport { kind, warnings })
}

fn has_value(event: &Event, field: &str) -> bool {
    match field {
        "type" => non_empty(event.raw_discriminator()),
        "chain" => non_empty(event.chain.as_deref()),
        "name" => non_empty(event.name.as_deref()),
        "symbol" => non_empty(event.symbol.as_deref()),
        "amount" => event.amount.as_ref().is_some_and(|a| !a.is_empty()),
        "contract" => non_empty(event.contract.as_deref()),
        "explorer" => non_empty(event.explorer.as_deref()),
        "message" => non_empty(event.message.as_deref()),
        _ => false,
    }
}

fn non_empty(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}
