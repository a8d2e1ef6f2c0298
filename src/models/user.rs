//! User identity record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A user row. `password_hash` never leaves the service in JSON.
/// `gender` is the enumerated code 0/1/2; range-checked at the DTO layer.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub gender: i32,
    pub birthday: Option<NaiveDate>,
    pub admin: bool,
    pub created_on: DateTime<Utc>,
    pub created_by: String,
    pub modified_on: DateTime<Utc>,
    pub modified_by: String,
    // Soft-delete markers; no read path filters on these yet.
    pub revoked_on: Option<DateTime<Utc>>,
    pub revoked_by: Option<String>,
}

impl User {
    /// A fresh record ready for insertion; timestamps are stamped by the database.
    pub fn new(
        id: Uuid,
        login: String,
        password_hash: String,
        name: String,
        gender: i32,
        birthday: Option<NaiveDate>,
        admin: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            login,
            password_hash,
            name,
            gender,
            birthday,
            admin,
            created_on: now,
            created_by: String::new(),
            modified_on: now,
            modified_by: String::new(),
            revoked_on: None,
            revoked_by: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User::new(
            Uuid::new_v4(),
            "alice1".into(),
            "$argon2id$secret".into(),
            "Alice".into(),
            0,
            None,
            false,
        );
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json.get("login").and_then(|v| v.as_str()), Some("alice1"));
    }
}
