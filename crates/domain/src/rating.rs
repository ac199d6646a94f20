//! Review rating value object.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A review rating between 1 and 5 stars inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Creates a rating, rejecting values outside 1–5.
    pub fn new(stars: u8) -> Result<Self, DomainError> {
        if (1..=5).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(DomainError::InvalidRating(stars))
        }
    }

    /// Returns the number of stars.
    pub fn stars(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_one_through_five() {
        for stars in 1..=5 {
            assert_eq!(Rating::new(stars).unwrap().stars(), stars);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(Rating::new(0), Err(DomainError::InvalidRating(0))));
        assert!(matches!(Rating::new(6), Err(DomainError::InvalidRating(6))));
    }
}
