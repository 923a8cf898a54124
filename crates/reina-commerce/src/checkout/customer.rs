//! Customer delivery details.

use serde::{Deserialize, Serialize};

use crate::error::CommerceError;

/// Who receives a cash-on-delivery order and where.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerDetails {
    /// Full name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Delivery address, free-form.
    pub address: String,
}

impl CustomerDetails {
    /// Create validated details. Every field is trimmed and must be
    /// non-empty.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, CommerceError> {
        let details = Self {
            name: name.into().trim().to_string(),
            phone: phone.into().trim().to_string(),
            address: address.into().trim().to_string(),
        };
        details.validate()?;
        Ok(details)
    }

    /// Check that every field is filled in.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::InvalidCustomer(missing.join(", ")))
        }
    }
}
