//! SurrealDB implementation of [`ApplicationRepository`].

use chrono::{DateTime, Utc};
use homestay_core::error::HomestayResult;
use homestay_core::models::application::{
    Application, ApplicationStatus, CreateApplication, UpdateApplication,
};
use homestay_core::repository::ApplicationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ApplicationRow {
    full_name: String,
    email: String,
    whats_app: Option<String>,
    start_date: DateTime<Utc>,
    duration: String,
    program: String,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ApplicationRowWithId {
    record_id: String,
    full_name: String,
    email: String,
    whats_app: Option<String>,
    start_date: DateTime<Utc>,
    duration: String,
    program: String,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<ApplicationStatus, DbError> {
    s.parse().map_err(DbError::Decode)
}

impl ApplicationRow {
    fn into_application(self, id: Uuid) -> Result<Application, DbError> {
        Ok(Application {
            id,
            full_name: self.full_name,
            email: self.email,
            whats_app: self.whats_app,
            start_date: self.start_date,
            duration: self.duration,
            program: self.program,
            message: self.message,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ApplicationRowWithId {
    fn try_into_application(self) -> Result<Application, DbError> {
        let id = parse_uuid(&self.record_id, "application")?;
        ApplicationRow {
            full_name: self.full_name,
            email: self.email,
            whats_app: self.whats_app,
            start_date: self.start_date,
            duration: self.duration,
            program: self.program,
            message: self.message,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_application(id)
    }
}

/// SurrealDB implementation of the Application repository.
#[derive(Clone)]
pub struct SurrealApplicationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealApplicationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ApplicationRepository for SurrealApplicationRepository<C> {
    async fn create(&self, input: CreateApplication) -> HomestayResult<Application> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('application', $id) SET \
                 full_name = $full_name, \
                 email = $email, \
                 whats_app = $whats_app, \
                 start_date = $start_date, \
                 duration = $duration, \
                 program = $program, \
                 message = $message, \
                 status = 'PENDING'",
            )
            .bind(("id", id_str.clone()))
            .bind(("full_name", input.full_name))
            .bind(("email", input.email))
            .bind(("whats_app", input.whats_app))
            .bind(("start_date", input.start_date))
            .bind(("duration", input.duration))
            .bind(("program", input.program))
            .bind(("message", input.message))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("application", e))?;

        let rows: Vec<ApplicationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("application", &id_str))?;

        Ok(row.into_application(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> HomestayResult<Application> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('application', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApplicationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("application", &id_str))?;

        Ok(row.into_application(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateApplication) -> HomestayResult<Application> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.program.is_some() {
            sets.push("program = $program");
        }
        if input.duration.is_some() {
            sets.push("duration = $duration");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('application', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(program) = input.program {
            builder = builder.bind(("program", program));
        }
        if let Some(duration) = input.duration {
            builder = builder.bind(("duration", duration));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("application", e))?;

        let rows: Vec<ApplicationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("application", &id_str))?;

        Ok(row.into_application(id)?)
    }

    async fn list(&self) -> HomestayResult<Vec<Application>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM application \
                 ORDER BY created_at DESC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApplicationRowWithId> = result.take(0).map_err(DbError::from)?;

        let applications = rows
            .into_iter()
            .map(|row| row.try_into_application())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(applications)
    }
}
