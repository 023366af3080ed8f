//! # User Accounts
//!
//! Customer accounts, their address book and recently viewed products.
//! Password hashing lives in the API crate; this module only stores the
//! PHC-format hash string.

use crate::error::{ShopError, ShopResult};
use crate::validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many recently viewed products are remembered per user
pub const RECENTLY_VIEWED_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Product ids, most recent first
    #[serde(default)]
    pub recently_viewed: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            recently_viewed: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Move a product to the front of the recently viewed list
    pub fn touch_recently_viewed(&mut self, product_id: &str) {
        self.recently_viewed.retain(|id| id != product_id);
        self.recently_viewed.insert(0, product_id.to_string());
        self.recently_viewed.truncate(RECENTLY_VIEWED_LIMIT);
    }
}

/// Request body for registration
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Registration {
    /// Returns normalized (name, email); the password is checked for presence only
    pub fn validate(&self) -> ShopResult<(String, String)> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty()
        {
            return Err(ShopError::validation("Please fill all the fields"));
        }
        Ok((self.name.trim().to_string(), validate::email(&self.email)?))
    }
}

/// Request body for login (users and admin)
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> ShopResult<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ShopError::validation("Email and password are required"));
        }
        Ok(())
    }
}

/// Postal address, also embedded in orders as a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDetails {
    pub fullname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub country: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub email: String,
}

impl AddressDetails {
    pub fn validate(self) -> ShopResult<Self> {
        let required = [
            &self.fullname,
            &self.country,
            &self.city,
            &self.state,
            &self.phone,
            &self.email,
        ];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(ShopError::validation(
                "All required fields must be provided.",
            ));
        }
        Ok(Self {
            fullname: self.fullname.trim().to_string(),
            company: self
                .company
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            country: self.country.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: validate::email(&self.email)?,
        })
    }
}

/// Address book entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub details: AddressDetails,
    pub created_at: DateTime<Utc>,
}

impl Address {
    pub fn new(user_id: &str, details: AddressDetails) -> ShopResult<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            details: details.validate()?,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn address() -> AddressDetails {
        AddressDetails {
            fullname: "Ada Obi".to_string(),
            company: None,
            country: "Nigeria".to_string(),
            city: "Lagos".to_string(),
            state: "Lagos".to_string(),
            phone: "+2348000000000".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_recently_viewed_is_capped_and_deduped() {
        let mut user = User::new("Ada".into(), "ada@example.com".into(), "hash".into());
        for id in ["p1", "p2", "p3", "p4", "p5", "p6"] {
            user.touch_recently_viewed(id);
        }
        assert_eq!(user.recently_viewed, vec!["p6", "p5", "p4", "p3", "p2"]);

        user.touch_recently_viewed("p3");
        assert_eq!(user.recently_viewed, vec!["p3", "p6", "p5", "p4", "p2"]);
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User::new("Ada".into(), "ada@example.com".into(), "secret-hash".into());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn test_registration_requires_all_fields() {
        let reg = Registration {
            name: "Ada".into(),
            email: "".into(),
            password: "pw".into(),
        };
        assert_eq!(
            reg.validate().unwrap_err().to_string(),
            "Please fill all the fields"
        );
    }

    #[test]
    fn test_address_validation() {
        let mut details = address();
        details.city = "  ".into();
        assert!(Address::new("u1", details).is_err());

        let saved = Address::new("u1", address()).unwrap();
        let json = serde_json::to_value(&saved).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["city"], "Lagos");
    }
}
