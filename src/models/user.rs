//! User model
//!
//! Authenticated accounts. Appointments and patients reference doctors by
//! `users.id`.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::json_column;
use crate::db::DbResult;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Doctor,
    Pharmacist,
    Pathologist,
    Reception,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "superadmin",
            UserRole::Admin => "admin",
            UserRole::Doctor => "doctor",
            UserRole::Pharmacist => "pharmacist",
            UserRole::Pathologist => "pathologist",
            UserRole::Reception => "reception",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "superadmin" => Some(UserRole::SuperAdmin),
            "admin" => Some(UserRole::Admin),
            "doctor" => Some(UserRole::Doctor),
            "pharmacist" => Some(UserRole::Pharmacist),
            "pathologist" => Some(UserRole::Pathologist),
            "reception" => Some(UserRole::Reception),
            _ => None,
        }
    }
}

/// A user account (password material is never loaded)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub metadata: Value,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub id: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub metadata: Value,
}

impl User {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let role_str: String = row.get("role")?;
        let role = UserRole::from_str(&role_str).unwrap_or(UserRole::Reception);

        Ok(Self {
            id: row.get("id")?,
            role,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            is_active: row.get("is_active")?,
            metadata: json_column(row, "metadata")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Free-form profile field from `metadata`, ignoring blanks
    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn specialization(&self) -> Option<&str> {
        self.metadata_str("specialization")
    }

    pub fn qualification(&self) -> Option<&str> {
        self.metadata_str("qualification")
    }

    /// Create a new user
    pub fn create(conn: &Connection, data: &UserCreate) -> DbResult<Self> {
        let metadata = serde_json::to_string(&data.metadata)?;

        conn.execute(
            r#"
            INSERT INTO users (id, role, first_name, last_name, email, phone, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                data.id,
                data.role.as_str(),
                data.first_name,
                data.last_name,
                data.email.trim().to_lowercase(),
                data.phone,
                metadata,
            ],
        )?;

        Self::get_by_id(conn, &data.id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a user by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Find a user with the given role by email (case-insensitive)
    pub fn find_by_email_and_role(
        conn: &Connection,
        email: &str,
        role: UserRole,
    ) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE email = ?1 AND role = ?2")?;

        let result = stmt.query_row(
            params![email.trim().to_lowercase(), role.as_str()],
            Self::from_row,
        );
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use serde_json::json;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn doctor(id: &str, email: &str) -> UserCreate {
        UserCreate {
            id: id.into(),
            role: UserRole::Doctor,
            first_name: "Anand".into(),
            last_name: "Kumar".into(),
            email: email.into(),
            phone: None,
            metadata: json!({ "specialization": "Gastroenterology", "qualification": " " }),
        }
    }

    #[test]
    fn test_metadata_profile_fields() {
        let conn = setup_db();
        let user = User::create(&conn, &doctor("u-1", "anand@kgf.in")).unwrap();

        assert_eq!(user.full_name(), "Anand Kumar");
        assert_eq!(user.specialization(), Some("Gastroenterology"));
        assert_eq!(user.qualification(), None);
        assert!(user.is_active);
    }

    #[test]
    fn test_find_by_email_ignores_case_and_checks_role() {
        let conn = setup_db();
        User::create(&conn, &doctor("u-1", "Anand@KGF.in")).unwrap();

        let found = User::find_by_email_and_role(&conn, "ANAND@kgf.in", UserRole::Doctor).unwrap();
        assert_eq!(found.map(|u| u.id), Some("u-1".to_string()));

        let wrong_role = User::find_by_email_and_role(&conn, "anand@kgf.in", UserRole::Admin).unwrap();
        assert!(wrong_role.is_none());
    }
}
