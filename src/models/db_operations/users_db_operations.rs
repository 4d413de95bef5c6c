use crate::models::AdminUser;
use bcrypt::{hash, verify, BcryptError};
use chrono::Utc;
use rusqlite::{params, Connection, Error as RusqliteError, OptionalExtension};

fn bcrypt_to_rusqlite_error(e: BcryptError) -> RusqliteError {
    RusqliteError::ToSqlConversionFailure(Box::new(e))
}

pub fn create_admin(conn: &Connection, username: &str, password: &str) -> Result<(), RusqliteError> {
    let hashed_password = hash(password, bcrypt::DEFAULT_COST).map_err(bcrypt_to_rusqlite_error)?;
    conn.execute(
        "INSERT INTO admins (username, password_hash) VALUES (?1, ?2)",
        params![username, hashed_password],
    )?;
    Ok(())
}

pub fn read_all_admins(conn: &Connection) -> Result<Vec<AdminUser>, RusqliteError> {
    let mut stmt = conn.prepare("SELECT id, username, is_active, last_login_time FROM admins ORDER BY id")?;
    let admin_iter = stmt.query_map([], |row| {
        Ok(AdminUser {
            id: row.get(0)?,
            username: row.get(1)?,
            is_active: row.get(2)?,
            last_login_time: row.get(3)?,
        })
    })?;

    let admins = admin_iter.filter_map(|u| u.ok()).collect();
    Ok(admins)
}

/// Returns false when no admin has that username.
pub fn change_password(conn: &Connection, username: &str, new_password: &str) -> Result<bool, RusqliteError> {
    let hashed_password = hash(new_password, bcrypt::DEFAULT_COST).map_err(bcrypt_to_rusqlite_error)?;
    let changed = conn.execute(
        "UPDATE admins SET password_hash = ?1 WHERE username = ?2",
        params![hashed_password, username],
    )?;
    Ok(changed > 0)
}

pub fn set_admin_active(conn: &Connection, username: &str, is_active: bool) -> Result<bool, RusqliteError> {
    let changed = conn.execute(
        "UPDATE admins SET is_active = ?1 WHERE username = ?2",
        params![is_active, username],
    )?;
    Ok(changed > 0)
}

/// The username of an active admin whose password matches.
pub fn verify_credentials(conn: &Connection, username: &str, password: &str) -> Option<String> {
    let res: rusqlite::Result<(String, bool)> = conn.query_row(
        "SELECT password_hash, is_active FROM admins WHERE username = ?1",
        [username],
        |row| Ok((row.get(0)?, row.get(1)?)),
    );

    if let Ok((hash, is_active)) = res {
        if is_active && verify(password, &hash).unwrap_or(false) {
            return Some(username.to_string());
        }
    }
    None
}

pub fn update_last_login_time(conn: &Connection, username: &str) -> Result<(), RusqliteError> {
    let now = Utc::now().to_rfc3339();
    conn.execute("UPDATE admins SET last_login_time = ?1 WHERE username = ?2", params![now, username])?;
    Ok(())
}

pub fn read_setting(conn: &Connection, key: &str) -> Option<String> {
    conn.query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| row.get(0))
        .optional()
        .unwrap_or(None)
}

pub fn update_setting(conn: &Connection, key: &str, value: &str) -> Result<(), RusqliteError> {
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::db_setup::setup_site_db;

    #[test]
    fn suspended_admin_cannot_log_in() {
        let mut conn = Connection::open_in_memory().unwrap();
        setup_site_db(&mut conn).unwrap();
        create_admin(&conn, "ana", "s3nha-forte").unwrap();
        assert_eq!(verify_credentials(&conn, "ana", "s3nha-forte").as_deref(), Some("ana"));

        assert!(set_admin_active(&conn, "ana", false).unwrap());
        assert_eq!(verify_credentials(&conn, "ana", "s3nha-forte"), None);
        assert!(!read_all_admins(&conn).unwrap()[0].is_active);

        assert!(set_admin_active(&conn, "ana", true).unwrap());
        assert!(verify_credentials(&conn, "ana", "s3nha-forte").is_some());
        assert!(!set_admin_active(&conn, "bruno", false).unwrap());
    }
}
