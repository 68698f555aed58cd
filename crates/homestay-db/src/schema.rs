//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. UUIDs are stored as strings and enums as
//! strings guarded by ASSERT clauses. The one-review-per-user rule lives
//! here as a UNIQUE index on `review.user_id`.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "accounts",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "content",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1: users and sessions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD image ON TABLE user TYPE option<string>;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['user', 'superUser', 'superAdmin'];
DEFINE FIELD email_verified ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD token_hash ON TABLE session TYPE string;
DEFINE FIELD ip_address ON TABLE session TYPE option<string>;
DEFINE FIELD user_agent ON TABLE session TYPE option<string>;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_token_hash ON TABLE session \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_session_user ON TABLE session COLUMNS user_id;
";

// -----------------------------------------------------------------------
// Schema v2: reviews, applications, landing page content
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
DEFINE TABLE review SCHEMAFULL;
DEFINE FIELD user_id ON TABLE review TYPE string;
DEFINE FIELD rating ON TABLE review TYPE int \
    ASSERT $value >= 1 AND $value <= 5;
DEFINE FIELD title ON TABLE review TYPE option<string>;
DEFINE FIELD review_text ON TABLE review TYPE string \
    ASSERT string::len($value) >= 10;
DEFINE FIELD stay_duration ON TABLE review TYPE string;
DEFINE FIELD stay_period ON TABLE review TYPE string;
DEFINE FIELD nationality ON TABLE review TYPE string;
DEFINE FIELD country_flag ON TABLE review TYPE string;
DEFINE FIELD approved ON TABLE review TYPE bool DEFAULT false;
DEFINE FIELD date ON TABLE review TYPE datetime DEFAULT time::now();
DEFINE FIELD created_at ON TABLE review TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE review TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_review_user ON TABLE review COLUMNS user_id UNIQUE;
DEFINE INDEX idx_review_approved ON TABLE review COLUMNS approved;

DEFINE TABLE application SCHEMAFULL;
DEFINE FIELD full_name ON TABLE application TYPE string;
DEFINE FIELD email ON TABLE application TYPE string;
DEFINE FIELD whats_app ON TABLE application TYPE option<string>;
DEFINE FIELD start_date ON TABLE application TYPE datetime;
DEFINE FIELD duration ON TABLE application TYPE string;
DEFINE FIELD program ON TABLE application TYPE string;
DEFINE FIELD message ON TABLE application TYPE option<string>;
DEFINE FIELD status ON TABLE application TYPE string \
    DEFAULT 'PENDING' \
    ASSERT $value IN ['PENDING', 'APPROVED', 'REJECTED'];
DEFINE FIELD created_at ON TABLE application TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE application TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE landing_page SCHEMAFULL;
DEFINE FIELD section ON TABLE landing_page TYPE string;
DEFINE FIELD title ON TABLE landing_page TYPE option<string>;
DEFINE FIELD subtitle ON TABLE landing_page TYPE option<string>;
DEFINE FIELD description ON TABLE landing_page TYPE option<string>;
DEFINE FIELD images ON TABLE landing_page TYPE array<string> DEFAULT [];
DEFINE FIELD video_url ON TABLE landing_page TYPE option<string>;
DEFINE FIELD updated_at ON TABLE landing_page TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_landing_page_section ON TABLE landing_page \
    COLUMNS section UNIQUE;
";

/// Apply every migration newer than the recorded schema version.
///
/// Safe to call on every start-up: applied versions are tracked in the
/// `_migration` table and skipped.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;
    }

    Ok(())
}

/// Latest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}
