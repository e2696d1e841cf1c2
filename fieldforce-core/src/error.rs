//! Quantity validation for strict evaluation
//!
//! The progress functions never fail; they clamp. Strict mode uses these
//! checks to reject malformed tracker entries instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantityError {
    #[error("capacity must be a positive finite number (got {capacity})")]
    InvalidCapacity { capacity: f64 },

    #[error("quantity {current} is outside [0, {capacity}]")]
    OutOfRangeQuantity { current: f64, capacity: f64 },
}

/// A `(current, capacity)` pair driving percent and severity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantityPair {
    pub current: f64,
    pub capacity: f64,
}

impl QuantityPair {
    /// Build a pair without validation; progress functions clamp it later
    pub fn new(current: f64, capacity: f64) -> Self {
        QuantityPair { current, capacity }
    }

    /// Build a pair, rejecting capacity <= 0 and current outside [0, capacity]
    pub fn new_checked(current: f64, capacity: f64) -> Result<Self, QuantityError> {
        if !(capacity.is_finite() && capacity > 0.0) {
            return Err(QuantityError::InvalidCapacity { capacity });
        }
        if !(0.0..=capacity).contains(&current) {
            return Err(QuantityError::OutOfRangeQuantity { current, capacity });
        }
        Ok(QuantityPair { current, capacity })
    }

    pub fn check(&self) -> Result<(), QuantityError> {
        QuantityPair::new_checked(self.current, self.capacity).map(|_| ())
    }
}
