use thiserror::Error;

/// Amount parsing and formatting errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("invalid amount format: {0}")]
    InvalidFormat(String),

    #[error("decimals out of range: {0} (max 18)")]
    DecimalsOutOfRange(u8),

    #[error("amount overflows 256 bits: {0}")]
    Overflow(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_format() {
        let err = AmountError::InvalidFormat("1e9".into());
        assert_eq!(err.to_string(), "invalid amount format: 1e9");
    }

    #[test]
    fn display_decimals_out_of_range() {
        let err = AmountError::DecimalsOutOfRange(19);
        assert_eq!(err.to_string(), "decimals out of range: 19 (max 18)");
    }

    #[test]
    fn display_overflow() {
        let err = AmountError::Overflow("999".into());
        assert_eq!(err.to_string(), "amount overflows 256 bits: 999");
    }
}
