//! Caller identity and rights carried by bearer tokens

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Rights level on one area of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rights {
    None = 0,
    Read = 1,
    Write = 2,
}

impl From<char> for Rights {
    fn from(c: char) -> Self {
        match c {
            'r' | 'R' => Rights::Read,
            'w' | 'W' => Rights::Write,
            _ => Rights::None,
        }
    }
}

impl From<Option<String>> for Rights {
    fn from(s: Option<String>) -> Self {
        s.and_then(|s| s.chars().next())
            .map(Rights::from)
            .unwrap_or(Rights::None)
    }
}

/// Account type of the calling user, as assigned by the authentication layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Admin,
    Librarian,
    Faculty,
    Student,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Admin => "admin",
            AccountType::Librarian => "librarian",
            AccountType::Faculty => "faculty",
            AccountType::Student => "student",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-area rights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRights {
    /// Authors, publishers, books, branches
    pub catalog_rights: Rights,
    /// Faculties, students, faculty usages
    pub people_rights: Rights,
    /// Stock counters
    pub inventory_rights: Rights,
    /// Loan issuance and returns
    pub loans_rights: Rights,
}

impl Default for UserRights {
    fn default() -> Self {
        Self {
            catalog_rights: Rights::None,
            people_rights: Rights::None,
            inventory_rights: Rights::None,
            loans_rights: Rights::None,
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub account_type: AccountType,
    pub rights: UserRights,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    fn require(&self, have: Rights, need: Rights, what: &str) -> Result<(), AppError> {
        if self.is_admin() || have >= need {
            Ok(())
        } else {
            Err(AppError::Authorization(format!("Insufficient rights to {}", what)))
        }
    }

    // Authorization checks
    pub fn require_read_catalog(&self) -> Result<(), AppError> {
        self.require(self.rights.catalog_rights, Rights::Read, "read the catalog")
    }

    pub fn require_write_catalog(&self) -> Result<(), AppError> {
        self.require(self.rights.catalog_rights, Rights::Write, "write the catalog")
    }

    pub fn require_read_people(&self) -> Result<(), AppError> {
        self.require(self.rights.people_rights, Rights::Read, "read faculties and students")
    }

    pub fn require_write_people(&self) -> Result<(), AppError> {
        self.require(self.rights.people_rights, Rights::Write, "write faculties and students")
    }

    pub fn require_read_inventory(&self) -> Result<(), AppError> {
        self.require(self.rights.inventory_rights, Rights::Read, "read inventory")
    }

    pub fn require_write_inventory(&self) -> Result<(), AppError> {
        self.require(self.rights.inventory_rights, Rights::Write, "adjust inventory")
    }

    pub fn require_read_loans(&self) -> Result<(), AppError> {
        self.require(self.rights.loans_rights, Rights::Read, "read loans")
    }

    pub fn require_write_loans(&self) -> Result<(), AppError> {
        self.require(self.rights.loans_rights, Rights::Write, "manage loans")
    }

    /// Check if user is admin
    pub fn is_admin(&self) -> bool {
        self.account_type == AccountType::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(account_type: AccountType, rights: UserRights) -> UserClaims {
        let now = chrono::Utc::now().timestamp();
        UserClaims {
            sub: "librarian".to_string(),
            user_id: 3,
            account_type,
            rights,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_rights_from_char() {
        assert_eq!(Rights::from('r'), Rights::Read);
        assert_eq!(Rights::from('W'), Rights::Write);
        assert_eq!(Rights::from('x'), Rights::None);
        assert_eq!(Rights::from(None), Rights::None);
    }

    #[test]
    fn test_read_does_not_grant_write() {
        let c = claims(
            AccountType::Librarian,
            UserRights {
                loans_rights: Rights::Read,
                ..Default::default()
            },
        );
        assert!(c.require_read_loans().is_ok());
        assert!(matches!(c.require_write_loans(), Err(AppError::Authorization(_))));
        assert!(c.require_read_catalog().is_err());
    }

    #[test]
    fn test_admin_has_all_rights() {
        let c = claims(AccountType::Admin, UserRights::default());
        assert!(c.require_write_inventory().is_ok());
        assert!(c.require_write_people().is_ok());
    }

    #[test]
    fn test_token_round_trip() {
        let c = claims(
            AccountType::Librarian,
            UserRights {
                inventory_rights: Rights::Write,
                ..Default::default()
            },
        );
        let token = c.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 3);
        assert_eq!(parsed.rights.inventory_rights, Rights::Write);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }
}
