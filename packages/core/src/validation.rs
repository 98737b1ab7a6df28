// ABOUTME: Input validation rules shared by the storage and workflow packages
// ABOUTME: Pricing invariant, progress bounds, and required-field checks

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Deal price {deal_price} must be greater than or equal to MRP {mrp}")]
    DealPriceBelowMrp { mrp: f64, deal_price: f64 },

    #[error("Invalid price for {field}: {value}. Must be a finite, non-negative number")]
    InvalidPrice { field: &'static str, value: f64 },

    #[error("Invalid progress: {0}. Must be between 0 and 100")]
    InvalidProgress(i32),

    #[error("Invalid duration: {0} minutes. Must be greater than zero")]
    InvalidDuration(i32),

    #[error("Field '{0}' cannot be empty")]
    EmptyField(&'static str),

    #[error("{0}")]
    Inconsistent(String),

    #[error("Submission has already been reviewed with status '{0}'")]
    AlreadyReviewed(String),
}

fn check_price(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidPrice { field, value });
    }
    Ok(())
}

/// Enforce `deal_price >= mrp` whenever a deal price is present
pub fn validate_pricing(mrp: f64, deal_price: Option<f64>) -> Result<(), ValidationError> {
    check_price("mrp", mrp)?;

    if let Some(deal_price) = deal_price {
        check_price("dealPrice", deal_price)?;
        if deal_price < mrp {
            return Err(ValidationError::DealPriceBelowMrp { mrp, deal_price });
        }
    }

    Ok(())
}

pub fn validate_progress(progress: i32) -> Result<(), ValidationError> {
    if !(0..=100).contains(&progress) {
        return Err(ValidationError::InvalidProgress(progress));
    }
    Ok(())
}

pub fn validate_duration(minutes: i32) -> Result<(), ValidationError> {
    if minutes <= 0 {
        return Err(ValidationError::InvalidDuration(minutes));
    }
    Ok(())
}

pub fn validate_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_price_below_mrp_is_rejected() {
        let err = validate_pricing(1000.0, Some(900.0)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DealPriceBelowMrp {
                mrp: 1000.0,
                deal_price: 900.0
            }
        );
    }

    #[test]
    fn test_deal_price_equal_or_above_mrp_is_accepted() {
        assert!(validate_pricing(1000.0, Some(1000.0)).is_ok());
        assert!(validate_pricing(1000.0, Some(1100.0)).is_ok());
        assert!(validate_pricing(1000.0, None).is_ok());
    }

    #[test]
    fn test_non_finite_or_negative_prices_are_rejected() {
        assert!(validate_pricing(-1.0, None).is_err());
        assert!(validate_pricing(f64::NAN, None).is_err());
        assert!(validate_pricing(10.0, Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_progress_bounds() {
        assert!(validate_progress(0).is_ok());
        assert!(validate_progress(100).is_ok());
        assert_eq!(
            validate_progress(101).unwrap_err(),
            ValidationError::InvalidProgress(101)
        );
        assert!(validate_progress(-1).is_err());
    }

    #[test]
    fn test_required_field() {
        assert!(validate_required("title", "Landing page").is_ok());
        assert_eq!(
            validate_required("title", "   ").unwrap_err(),
            ValidationError::EmptyField("title")
        );
    }

    #[test]
    fn test_duration() {
        assert!(validate_duration(30).is_ok());
        assert!(validate_duration(0).is_err());
    }
}
