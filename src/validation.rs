// Validation utilities module
// Custom validation functions for campaign rules

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;
use validator::ValidationError;

fn campaign_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9_-]{3,32}$").expect("valid campaign code pattern"))
}

/// Canonical stored form of a campaign code
pub fn normalize_campaign_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// 3 to 32 characters of A-Z, 0-9, '_' or '-' (case-insensitive)
pub fn validate_campaign_code(code: &str) -> Result<(), ValidationError> {
    if campaign_code_pattern().is_match(&normalize_campaign_code(code)) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_campaign_code"))
    }
}

/// Percent and money columns are NUMERIC(_, 2)
const MONEY_SCALE: u32 = 2;

/// Largest value a NUMERIC(12, 2) column holds
fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

fn has_money_scale(value: Decimal) -> bool {
    value.normalize().scale() <= MONEY_SCALE
}

/// Percent discount in (0, 100] with at most 2 decimal places
pub fn validate_discount_percent(percent: Decimal) -> Result<(), ValidationError> {
    if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        Err(ValidationError::new("discount_percent_out_of_range"))
    } else if !has_money_scale(percent) {
        Err(ValidationError::new("discount_percent_too_precise"))
    } else {
        Ok(())
    }
}

/// Money amounts are strictly positive, fit NUMERIC(12, 2) and carry at most 2 decimal places
pub fn validate_positive_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        Err(ValidationError::new("amount_must_be_positive"))
    } else if amount > max_amount() {
        Err(ValidationError::new("amount_too_large"))
    } else if !has_money_scale(amount) {
        Err(ValidationError::new("amount_too_precise"))
    } else {
        Ok(())
    }
}
