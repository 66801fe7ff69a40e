//! Customer records and the identifiers they can be looked up by.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::CustomerId;
use super::validation::ValidationError;

/// A stored customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub name: String,
    pub age: i32,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driving_license_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// The identifiers this record is currently reachable by.
    #[must_use]
    pub fn identifiers(&self) -> IdentifierSnapshot {
        IdentifierSnapshot {
            customer_id: self.customer_id,
            aadhar_id: self.aadhar_id.clone(),
            passport_id: self.passport_id.clone(),
            driving_license_id: self.driving_license_id.clone(),
        }
    }
}

/// Unvalidated customer input, as received from a client.
///
/// Every field defaults so that a missing field is reported as a
/// [`ValidationError`] rather than a decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerDraft {
    pub name: String,
    pub age: Option<i32>,
    pub address: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub aadhar_id: Option<String>,
    pub passport_id: Option<String>,
    pub driving_license_id: Option<String>,
}

impl CustomerDraft {
    /// Check the draft and produce fields the store will accept.
    ///
    /// Blank optional values are treated as absent. At least one of the
    /// three identity documents must remain afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(self) -> Result<CustomerFields, ValidationError> {
        let name = required(self.name, "name")?;
        let age = match self.age {
            None => return Err(ValidationError::MissingField("age")),
            Some(age) if age <= 0 => {
                return Err(ValidationError::InvalidField {
                    field: "age",
                    reason: "must be greater than zero",
                });
            }
            Some(age) => age,
        };
        let address = required(self.address, "address")?;

        let aadhar_id = optional(self.aadhar_id, "aadhar_id")?;
        let passport_id = optional(self.passport_id, "passport_id")?;
        let driving_license_id = optional(self.driving_license_id, "driving_license_id")?;
        if aadhar_id.is_none() && passport_id.is_none() && driving_license_id.is_none() {
            return Err(ValidationError::MissingIdDocument);
        }

        let email = optional(self.email, "email")?
            .map(|raw| Email::parse(&raw))
            .transpose()?;

        Ok(CustomerFields {
            name,
            age,
            address,
            phone_number: optional(self.phone_number, "phone_number")?,
            email,
            aadhar_id,
            passport_id,
            driving_license_id,
        })
    }
}

/// Customer attributes that passed [`CustomerDraft::validate`].
///
/// Only obtainable through validation, so holding one proves the
/// identity-document invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerFields {
    name: String,
    age: i32,
    address: String,
    phone_number: Option<String>,
    email: Option<Email>,
    aadhar_id: Option<String>,
    passport_id: Option<String>,
    driving_license_id: Option<String>,
}

impl CustomerFields {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn age(&self) -> i32 {
        self.age
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    #[must_use]
    pub const fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    #[must_use]
    pub fn aadhar_id(&self) -> Option<&str> {
        self.aadhar_id.as_deref()
    }

    #[must_use]
    pub fn passport_id(&self) -> Option<&str> {
        self.passport_id.as_deref()
    }

    #[must_use]
    pub fn driving_license_id(&self) -> Option<&str> {
        self.driving_license_id.as_deref()
    }

    /// Build the record the store would hold for these fields.
    #[must_use]
    pub fn into_customer(self, customer_id: CustomerId, created_at: DateTime<Utc>) -> Customer {
        Customer {
            customer_id,
            name: self.name,
            age: self.age,
            address: self.address,
            phone_number: self.phone_number,
            email: self.email,
            aadhar_id: self.aadhar_id,
            passport_id: self.passport_id,
            driving_license_id: self.driving_license_id,
            created_at,
        }
    }
}

/// The identifier values a customer had at one point in time.
///
/// Taken before an update or delete so the keys valid for the old state
/// can be invalidated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierSnapshot {
    pub customer_id: CustomerId,
    pub aadhar_id: Option<String>,
    pub passport_id: Option<String>,
    pub driving_license_id: Option<String>,
}

impl IdentifierSnapshot {
    /// Every `(key, value)` pair the record was reachable by.
    #[must_use]
    pub fn lookups(&self) -> Vec<Lookup> {
        let mut lookups = vec![Lookup {
            key: LookupKey::CustomerId,
            value: self.customer_id.to_string(),
        }];
        let documents = [
            (LookupKey::Aadhar, &self.aadhar_id),
            (LookupKey::Passport, &self.passport_id),
            (LookupKey::DrivingLicense, &self.driving_license_id),
        ];
        for (key, value) in documents {
            if let Some(value) = value {
                lookups.push(Lookup {
                    key,
                    value: value.clone(),
                });
            }
        }
        lookups
    }
}

/// Identifier types a customer can be found by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKey {
    CustomerId,
    Aadhar,
    Passport,
    DrivingLicense,
}

impl LookupKey {
    pub const ALL: [Self; 4] = [
        Self::CustomerId,
        Self::Aadhar,
        Self::Passport,
        Self::DrivingLicense,
    ];

    /// Wire name of the key type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerId => "customer_id",
            Self::Aadhar => "aadhar",
            Self::Passport => "passport",
            Self::DrivingLicense => "driving_license",
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookupKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownLookupKey(s.to_owned()))
    }
}

/// A validated identifier lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lookup {
    pub key: LookupKey,
    pub value: String,
}

impl Lookup {
    /// Parse a `(type, value)` pair as sent by a search client.
    ///
    /// Customer ID values are normalized to their canonical decimal form.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an unknown key type, a blank value, or
    /// a non-numeric customer ID.
    pub fn parse(key: &str, value: &str) -> Result<Self, ValidationError> {
        let key: LookupKey = key.parse()?;
        let value = value.trim();
        if value.is_empty() {
            return Err(ValidationError::MissingField("value"));
        }
        reject_nul(value, "value")?;
        let value = match key {
            LookupKey::CustomerId => value
                .parse::<CustomerId>()
                .map_err(|_| ValidationError::InvalidField {
                    field: "value",
                    reason: "must be a numeric customer ID",
                })?
                .to_string(),
            _ => value.to_owned(),
        };
        Ok(Self { key, value })
    }

    /// Lookup by primary identifier.
    #[must_use]
    pub fn customer_id(id: CustomerId) -> Self {
        Self {
            key: LookupKey::CustomerId,
            value: id.to_string(),
        }
    }
}

fn required(value: String, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    reject_nul(trimmed, field)?;
    Ok(trimmed.to_owned())
}

fn optional(value: Option<String>, field: &'static str) -> Result<Option<String>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    reject_nul(trimmed, field)?;
    Ok(Some(trimmed.to_owned()))
}

/// `PostgreSQL` text columns cannot store NUL.
pub(crate) fn reject_nul(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::InvalidField {
            field,
            reason: "must not contain NUL characters",
        });
    }
    Ok(())
}
