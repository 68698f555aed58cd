//! SurrealDB implementation of [`SessionRepository`].
//!
//! Sessions are written once and read by token hash on every
//! authenticated request, so `create` builds the returned [`Session`] from
//! its own input instead of reading the row back.

use chrono::{DateTime, Utc};
use homestay_core::error::HomestayResult;
use homestay_core::models::session::{CreateSession, Session};
use homestay_core::repository::SessionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct SessionRecord {
    record_id: String,
    user_id: String,
    token_hash: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SessionRecord> for Session {
    type Error = DbError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        Ok(Session {
            id: parse_uuid(&record.record_id, "session")?,
            user_id: parse_uuid(&record.user_id, "user")?,
            token_hash: record.token_hash,
            ip_address: record.ip_address,
            user_agent: record.user_agent,
            expires_at: record.expires_at,
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct ExpiredCount {
    total: u64,
}

#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> HomestayResult<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            token_hash: input.token_hash,
            ip_address: input.ip_address,
            user_agent: input.user_agent,
            expires_at: input.expires_at,
            created_at: Utc::now(),
        };

        self.db
            .query(
                "CREATE type::record('session', $id) SET \
                 user_id = $user_id, token_hash = $token_hash, \
                 ip_address = $ip_address, user_agent = $user_agent, \
                 expires_at = $expires_at, created_at = $created_at \
                 RETURN NONE",
            )
            .bind(("id", session.id.to_string()))
            .bind(("user_id", session.user_id.to_string()))
            .bind(("token_hash", session.token_hash.clone()))
            .bind(("ip_address", session.ip_address.clone()))
            .bind(("user_agent", session.user_agent.clone()))
            .bind(("expires_at", session.expires_at))
            .bind(("created_at", session.created_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("session", e))?;

        Ok(session)
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> HomestayResult<Session> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE token_hash = $token_hash LIMIT 1",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let records: Vec<SessionRecord> = result.take(0).map_err(DbError::from)?;
        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("session", "token"))?;

        Ok(Session::try_from(record)?)
    }

    async fn invalidate(&self, id: Uuid) -> HomestayResult<()> {
        self.db
            .query("DELETE type::record('session', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> HomestayResult<u64> {
        // Count and delete against the same cutoff in one round trip.
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM session WHERE expires_at < $cutoff GROUP ALL; \
                 DELETE session WHERE expires_at < $cutoff;",
            )
            .bind(("cutoff", Utc::now()))
            .await
            .map_err(DbError::from)?;

        let counts: Vec<ExpiredCount> = result.take(0).map_err(DbError::from)?;
        Ok(counts.first().map(|c| c.total).unwrap_or(0))
    }
}
