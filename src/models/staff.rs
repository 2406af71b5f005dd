//! Staff model
//!
//! Staff profiles live in their own table with their own ids; a doctor may have
//! both a staff profile and a user account, linked only by email.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::json_column;
use crate::db::DbResult;

/// A staff profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    pub contact: String,
    pub email: String,
    pub roles: Vec<String>,
    pub qualifications: Vec<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new staff profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffCreate {
    pub id: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    pub contact: String,
    pub email: String,
    pub roles: Vec<String>,
    pub qualifications: Vec<String>,
}

impl Staff {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            designation: row.get("designation")?,
            department: row.get("department")?,
            contact: row.get("contact")?,
            email: row.get("email")?,
            roles: json_column(row, "roles")?,
            qualifications: json_column(row, "qualifications")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create a new staff profile
    pub fn create(conn: &Connection, data: &StaffCreate) -> DbResult<Self> {
        let roles = serde_json::to_string(&data.roles)?;
        let qualifications = serde_json::to_string(&data.qualifications)?;

        conn.execute(
            r#"
            INSERT INTO staff (id, name, designation, department, contact, email, roles, qualifications)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                data.id,
                data.name,
                data.designation,
                data.department,
                data.contact,
                data.email.trim().to_lowercase(),
                roles,
                qualifications,
            ],
        )?;

        Self::get_by_id(conn, &data.id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a staff profile by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM staff WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(staff) => Ok(Some(staff)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_create_and_roles() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let staff = Staff::create(
            &conn,
            &StaffCreate {
                id: "stf-1".into(),
                name: "Dr. Priya Nair".into(),
                designation: "Cardiologist".into(),
                email: "Priya@KGF.in".into(),
                roles: vec!["Doctor".into()],
                qualifications: vec!["MBBS".into(), "MD".into()],
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(staff.email, "priya@kgf.in");
        assert_eq!(staff.status, "Available");
        assert_eq!(staff.roles, vec!["Doctor".to_string()]);
        assert_eq!(staff.qualifications.join(", "), "MBBS, MD");
    }
}
