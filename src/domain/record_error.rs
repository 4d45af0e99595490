//! Errors raised when a loosely typed record cannot become a domain value.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("exit fields are only allowed on closed trades")]
    ExitOnOpenTrade,
}

impl RecordError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        RecordError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject negative amounts for fields that must be `>= 0`.
pub(crate) fn non_negative(
    field: &'static str,
    value: crate::domain::Decimal,
) -> Result<crate::domain::Decimal, RecordError> {
    if value.is_negative() {
        return Err(RecordError::invalid(field, "must not be negative"));
    }
    Ok(value)
}

/// Reject a price and quantity whose notional value does not fit in a decimal,
/// so metrics derived from the record can always be computed.
pub(crate) fn bounded_notional(
    field: &'static str,
    price: crate::domain::Decimal,
    quantity: crate::domain::Decimal,
) -> Result<(), RecordError> {
    match price.checked_mul(quantity) {
        Some(_) => Ok(()),
        None => Err(RecordError::invalid(field, "price times quantity is out of range")),
    }
}
