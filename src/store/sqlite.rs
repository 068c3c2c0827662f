use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, ffi, params};
use serde_json::Value;

use super::schema::SCHEMA;
use super::{FormStats, Store};
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database. Used by tests and tooling.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> Timestamp {
    DateTime::parse_from_rfc3339(s).unwrap_or_else(|e| {
        tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
        Utc::now().fixed_offset()
    })
}

fn format_datetime(dt: &Timestamp) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, false)
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = Error>,
{
    row.get::<_, String>(idx)?
        .parse()
        .map_err(|e| conversion_error(idx, e))
}

fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Value> {
    serde_json::from_str(&row.get::<_, String>(idx)?).map_err(|e| conversion_error(idx, e))
}

fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    Ok(parse_datetime(&row.get::<_, String>(idx)?))
}

fn decision_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DecisionStatus>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| s.parse().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Translates constraint failures into domain errors. Anything else stays a
/// database error.
fn map_constraint(e: rusqlite::Error, conflict: &str, missing: &'static str) -> Error {
    match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            Error::Conflict(conflict.to_string())
        }
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            Error::NotFound(missing)
        }
        e => Error::from(e),
    }
}

fn to_json_text(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::InvalidArgument(e.to_string()))
}

fn form_from_row(row: &Row<'_>) -> rusqlite::Result<Form> {
    Ok(Form {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        schema: json_column(row, 3)?,
        status: enum_column(row, 4)?,
        created_at: time_column(row, 5)?,
        url: row.get(6)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: enum_column(row, 4)?,
        status: enum_column(row, 5)?,
    })
}

fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get(0)?,
        form_id: row.get(1)?,
        user_id: row.get(2)?,
        assigned_by: row.get(3)?,
        assigned_at: time_column(row, 4)?,
    })
}

fn response_from_row(row: &Row<'_>) -> rusqlite::Result<Response> {
    Ok(Response {
        id: row.get(0)?,
        form_id: row.get(1)?,
        user_id: row.get(2)?,
        data: json_column(row, 3)?,
        file_path: row.get(4)?,
        is_spam: row.get(5)?,
        submitted_at: time_column(row, 6)?,
    })
}

fn approval_from_row(row: &Row<'_>) -> rusqlite::Result<Approval> {
    Ok(Approval {
        id: row.get(0)?,
        response_id: row.get(1)?,
        status: enum_column(row, 2)?,
        comment: row.get(3)?,
        decided_by: row.get(4)?,
        decided_at: time_column(row, 5)?,
    })
}

impl FormStats for SqliteStore {
    fn list_active_forms(&self) -> Result<Vec<Form>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, description, schema, status, created_at, url
             FROM forms WHERE status = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![FormStatus::Active.as_str()], form_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_form_assignments(&self, form_id: i64) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM assignments WHERE form_id = ?1",
            params![form_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn count_form_responses(&self, form_id: i64) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM responses WHERE form_id = ?1",
            params![form_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Form operations

    fn create_form(
        &self,
        form: &NewForm,
        created_at: &Timestamp,
        url_base: Option<&str>,
    ) -> Result<Form> {
        let schema = to_json_text(&form.schema)?;
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let mut created = tx
            .query_row(
                "INSERT INTO forms (name, name_key, description, schema, status, created_at, url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING id, name, description, schema, status, created_at, url",
                params![
                    form.name,
                    form.name.to_lowercase(),
                    form.description,
                    schema,
                    FormStatus::Draft.as_str(),
                    format_datetime(created_at),
                    form.url,
                ],
                form_from_row,
            )
            .map_err(|e| {
                map_constraint(
                    e,
                    &format!("a form named '{}' already exists", form.name),
                    "form",
                )
            })?;

        if created.url.is_none() {
            if let Some(base) = url_base {
                let url = format!("{base}/forms/{}", created.id);
                tx.execute(
                    "UPDATE forms SET url = ?1 WHERE id = ?2",
                    params![url, created.id],
                )?;
                created.url = Some(url);
            }
        }

        tx.commit()?;
        Ok(created)
    }

    fn get_form(&self, id: i64) -> Result<Option<Form>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, description, schema, status, created_at, url
             FROM forms WHERE id = ?1",
            params![id],
            form_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn activate_form(&self, id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE forms SET status = ?1 WHERE id = ?2 AND status = ?3",
            params![
                FormStatus::Active.as_str(),
                id,
                FormStatus::Draft.as_str()
            ],
        )?;
        Ok(rows > 0)
    }

    fn count_forms(&self) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM forms", [], |row| row.get(0))?;
        Ok(count)
    }

    fn list_forms_with_submission_counts(&self) -> Result<Vec<FormListItem>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT f.id, f.name, f.description, f.schema, f.status, f.created_at, f.url,
                    COUNT(DISTINCT r.id)
             FROM forms f
             LEFT JOIN responses r ON r.form_id = f.id
             GROUP BY f.id
             ORDER BY f.id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(FormListItem {
                form: form_from_row(row)?,
                submission_count: row.get(7)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // User operations

    fn create_user(&self, user: &NewUser) -> Result<User> {
        let conn = self.conn();
        conn.query_row(
            "INSERT INTO users (name, email, password_hash, role, status)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, name, email, password_hash, role, status",
            params![
                user.name,
                user.email,
                user.password_hash,
                user.role.as_str(),
                UserStatus::Active.as_str(),
            ],
            user_from_row,
        )
        .map_err(|e| {
            map_constraint(
                e,
                &format!("a user with email '{}' already exists", user.email),
                "user",
            )
        })
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, email, password_hash, role, status FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, name, email, password_hash, role, status FROM users ORDER BY id")?;

        let rows = stmt.query_map([], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn set_user_status(&self, id: i64, status: UserStatus) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE users SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(rows > 0)
    }

    fn has_admin_user(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = ?1",
            params![Role::Admin.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Assignment operations

    fn create_assignment(
        &self,
        form_id: i64,
        user_id: i64,
        assigned_by: i64,
        assigned_at: &Timestamp,
    ) -> Result<Assignment> {
        let conn = self.conn();
        conn.query_row(
            "INSERT INTO assignments (form_id, user_id, assigned_by, assigned_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, form_id, user_id, assigned_by, assigned_at",
            params![form_id, user_id, assigned_by, format_datetime(assigned_at)],
            assignment_from_row,
        )
        .map_err(|e| {
            map_constraint(
                e,
                &format!("form {form_id} is already assigned to user {user_id}"),
                "form or user",
            )
        })
    }

    fn get_assignment(&self, form_id: i64, user_id: i64) -> Result<Option<Assignment>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, form_id, user_id, assigned_by, assigned_at
             FROM assignments WHERE form_id = ?1 AND user_id = ?2",
            params![form_id, user_id],
            assignment_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_assignment(&self, form_id: i64, user_id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM assignments WHERE form_id = ?1 AND user_id = ?2",
            params![form_id, user_id],
        )?;
        Ok(rows > 0)
    }

    fn list_assignees(&self, form_id: i64) -> Result<Vec<AssignmentView>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT a.id, a.form_id, a.user_id, u.name, u.email, a.assigned_by, a.assigned_at
             FROM assignments a
             JOIN users u ON u.id = a.user_id
             WHERE a.form_id = ?1
             ORDER BY a.id",
        )?;

        let rows = stmt.query_map(params![form_id], |row| {
            Ok(AssignmentView {
                assignment_id: row.get(0)?,
                form_id: row.get(1)?,
                user_id: row.get(2)?,
                user_name: row.get(3)?,
                user_email: row.get(4)?,
                assigned_by: row.get(5)?,
                assigned_at: time_column(row, 6)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_user_assignments(&self, user_id: i64) -> Result<Vec<AssignedFormView>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT a.id, a.form_id, f.name, f.description, f.status, f.url,
                    a.assigned_by, a.assigned_at,
                    (SELECT COUNT(*) FROM responses r
                     WHERE r.form_id = a.form_id AND r.user_id = a.user_id)
             FROM assignments a
             JOIN forms f ON f.id = a.form_id
             WHERE a.user_id = ?1
             ORDER BY a.id",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok(AssignedFormView {
                assignment_id: row.get(0)?,
                form_id: row.get(1)?,
                form_name: row.get(2)?,
                description: row.get(3)?,
                form_status: enum_column(row, 4)?,
                url: row.get(5)?,
                assigned_by: row.get(6)?,
                assigned_at: time_column(row, 7)?,
                submission_status: SubmissionStatus::derive(row.get(8)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Response operations

    fn create_response(
        &self,
        form_id: i64,
        user_id: i64,
        data: &Value,
        file_path: Option<&str>,
        is_spam: bool,
        submitted_at: &Timestamp,
    ) -> Result<Response> {
        let data = to_json_text(data)?;
        let conn = self.conn();
        conn.query_row(
            "INSERT INTO responses (form_id, user_id, data, file_path, is_spam, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, form_id, user_id, data, file_path, is_spam, submitted_at",
            params![
                form_id,
                user_id,
                data,
                file_path,
                is_spam,
                format_datetime(submitted_at),
            ],
            response_from_row,
        )
        .map_err(|e| map_constraint(e, "duplicate response", "form"))
    }

    fn get_response(&self, id: i64) -> Result<Option<Response>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, form_id, user_id, data, file_path, is_spam, submitted_at
             FROM responses WHERE id = ?1",
            params![id],
            response_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_responses(&self, is_spam: bool) -> Result<Vec<ResponseView>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT r.id, r.form_id, f.name, r.user_id, u.name, u.email, r.data, r.file_path,
                    r.is_spam, r.submitted_at, a.status, a.comment, a.decided_by, a.decided_at
             FROM responses r
             LEFT JOIN users u ON u.id = r.user_id
             LEFT JOIN forms f ON f.id = r.form_id
             LEFT JOIN approvals a ON a.response_id = r.id
             WHERE r.is_spam = ?1
             ORDER BY julianday(r.submitted_at) DESC, r.id DESC",
        )?;

        let rows = stmt.query_map(params![is_spam], |row| {
            Ok(ResponseView {
                response_id: row.get(0)?,
                form_id: row.get(1)?,
                form_name: row.get(2)?,
                user_id: row.get(3)?,
                user_name: row.get(4)?,
                user_email: row.get(5)?,
                data: json_column(row, 6)?,
                file_path: row.get(7)?,
                is_spam: row.get(8)?,
                submitted_at: time_column(row, 9)?,
                status: ApprovalState::derive(decision_column(row, 10)?),
                comment: row.get(11)?,
                decided_by: row.get(12)?,
                decided_at: row
                    .get::<_, Option<String>>(13)?
                    .map(|s| parse_datetime(&s)),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn recent_responses(&self, limit: i64) -> Result<Vec<RecentView>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT r.id, r.form_id, f.name, r.user_id, u.name, r.submitted_at, a.status
             FROM responses r
             LEFT JOIN forms f ON f.id = r.form_id
             LEFT JOIN users u ON u.id = r.user_id
             LEFT JOIN approvals a ON a.response_id = r.id
             WHERE r.is_spam = 0
             ORDER BY julianday(r.submitted_at) DESC, r.id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            Ok(RecentView {
                response_id: row.get(0)?,
                form_id: row.get(1)?,
                form_name: row.get(2)?,
                user_id: row.get(3)?,
                user_name: row.get(4)?,
                submitted_at: time_column(row, 5)?,
                status: ApprovalState::derive(decision_column(row, 6)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_responses(&self) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
        Ok(count)
    }

    fn count_undecided_responses(&self) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM responses r
             WHERE NOT EXISTS (SELECT 1 FROM approvals a WHERE a.response_id = r.id)",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // Approval operations

    fn upsert_approval(
        &self,
        response_id: i64,
        decision: &Decision,
        decided_at: &Timestamp,
    ) -> Result<Approval> {
        let conn = self.conn();
        conn.query_row(
            "INSERT INTO approvals (response_id, status, comment, decided_by, decided_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (response_id) DO UPDATE SET
                status = excluded.status,
                comment = excluded.comment,
                decided_by = excluded.decided_by,
                decided_at = excluded.decided_at
             RETURNING id, response_id, status, comment, decided_by, decided_at",
            params![
                response_id,
                decision.status.as_str(),
                decision.comment,
                decision.decided_by,
                format_datetime(decided_at),
            ],
            approval_from_row,
        )
        .map_err(|e| map_constraint(e, "duplicate approval", "response"))
    }

    fn get_approval_for_response(&self, response_id: i64) -> Result<Option<Approval>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, response_id, status, comment, decided_by, decided_at
             FROM approvals WHERE response_id = ?1",
            params![response_id],
            approval_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn count_approvals(&self, status: DecisionStatus) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM approvals WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
