//! Saved shipping address.

use chrono::{DateTime, Utc};
use common::{AddressId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for address fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("full name is required")]
    MissingName,
    #[error("phone must be 10 digits")]
    InvalidPhone,
    #[error("pincode must be 6 digits")]
    InvalidPincode,
    #[error("address line is required")]
    MissingAddressLine,
}

/// A saved shipping address.
///
/// At most one address per user may have `is_default` set; the store
/// enforces this transactionally when a new default is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub full_name: String,
    pub phone: String,
    pub pincode: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Address {
    /// Validates the postal fields.
    pub fn validate(&self) -> Result<(), AddressError> {
        if self.full_name.trim().is_empty() {
            return Err(AddressError::MissingName);
        }
        if self.phone.len() != 10 || !self.phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(AddressError::InvalidPhone);
        }
        if self.pincode.len() != 6 || !self.pincode.chars().all(|c| c.is_ascii_digit()) {
            return Err(AddressError::InvalidPincode);
        }
        if self.address_line.trim().is_empty() {
            return Err(AddressError::MissingAddressLine);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_address() -> Address {
        Address {
            id: AddressId::new(),
            user_id: UserId::new(),
            full_name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            pincode: "560001".to_string(),
            address_line: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            is_default: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn valid_address_passes() {
        assert!(valid_address().validate().is_ok());
    }

    #[test]
    fn phone_must_be_ten_digits() {
        let mut addr = valid_address();
        addr.phone = "12345".to_string();
        assert_eq!(addr.validate(), Err(AddressError::InvalidPhone));

        addr.phone = "987654321x".to_string();
        assert_eq!(addr.validate(), Err(AddressError::InvalidPhone));
    }

    #[test]
    fn pincode_must_be_six_digits() {
        let mut addr = valid_address();
        addr.pincode = "5600".to_string();
        assert_eq!(addr.validate(), Err(AddressError::InvalidPincode));
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut addr = valid_address();
        addr.full_name = "  ".to_string();
        assert_eq!(addr.validate(), Err(AddressError::MissingName));

        let mut addr = valid_address();
        addr.address_line = String::new();
        assert_eq!(addr.validate(), Err(AddressError::MissingAddressLine));
    }
}
