//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations report a missing
//! record as [`HomestayError::NotFound`](crate::error::HomestayError) and
//! a unique-index violation as `AlreadyExists`.

use uuid::Uuid;

use crate::error::HomestayResult;
use crate::models::{
    application::{Application, CreateApplication, UpdateApplication},
    landing::{LandingPageContent, UpsertLandingContent},
    review::{CreateReview, Review, ReviewListQuery, ReviewPatch},
    session::{CreateSession, Session},
    user::{CreateUser, UpdateUser, User},
};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Largest offset the storage layer accepts (a signed 64-bit `START`).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Pagination parameters for list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Build from 1-based page parameters. The page is clamped to at
    /// least 1 and the size to `[1, MAX_PAGE_SIZE]`; anything that does
    /// not parse as an integer takes the default. Offsets past
    /// [`MAX_OFFSET`] are capped, yielding an empty page.
    pub fn from_page_params(page: Option<&str>, page_size: Option<&str>) -> Self {
        let page = parse_or(page, 1).max(1) as u64;
        let size =
            parse_or(page_size, DEFAULT_PAGE_SIZE as i64).clamp(1, MAX_PAGE_SIZE as i64) as u64;

        Self {
            offset: (page - 1).saturating_mul(size).min(MAX_OFFSET),
            limit: size,
        }
    }
}

fn parse_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the email is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = HomestayResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HomestayResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = HomestayResult<User>> + Send;
    /// Fetch several users at once; missing ids are skipped.
    fn get_many(&self, ids: &[Uuid]) -> impl Future<Output = HomestayResult<Vec<User>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = HomestayResult<User>> + Send;
    /// All users, newest first.
    fn list(&self) -> impl Future<Output = HomestayResult<Vec<User>>> + Send;
}

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = HomestayResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = HomestayResult<Session>> + Send;
    /// Invalidate a single session.
    fn invalidate(&self, id: Uuid) -> impl Future<Output = HomestayResult<()>> + Send;
    /// Remove all expired sessions, returning how many were removed.
    fn cleanup_expired(&self) -> impl Future<Output = HomestayResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

pub trait ReviewRepository: Send + Sync {
    /// Insert an unapproved review. A second review for the same user
    /// fails with `AlreadyExists`.
    fn create(&self, input: CreateReview) -> impl Future<Output = HomestayResult<Review>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HomestayResult<Review>> + Send;
    fn get_by_user(&self, user_id: Uuid) -> impl Future<Output = HomestayResult<Review>> + Send;
    fn exists_for_user(&self, user_id: Uuid) -> impl Future<Output = HomestayResult<bool>> + Send;
    /// One count query, then a page query unless the page starts past
    /// the last row.
    fn list(
        &self,
        query: ReviewListQuery,
    ) -> impl Future<Output = HomestayResult<PaginatedResult<Review>>> + Send;
    fn update(
        &self,
        id: Uuid,
        patch: ReviewPatch,
    ) -> impl Future<Output = HomestayResult<Review>> + Send;
    /// Fails with `NotFound` if the review does not exist.
    fn delete(&self, id: Uuid) -> impl Future<Output = HomestayResult<()>> + Send;
}

pub trait ApplicationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateApplication,
    ) -> impl Future<Output = HomestayResult<Application>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HomestayResult<Application>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateApplication,
    ) -> impl Future<Output = HomestayResult<Application>> + Send;
    /// All applications, newest first.
    fn list(&self) -> impl Future<Output = HomestayResult<Vec<Application>>> + Send;
}

pub trait LandingPageRepository: Send + Sync {
    fn list(&self) -> impl Future<Output = HomestayResult<Vec<LandingPageContent>>> + Send;
    /// Create the section or update only the provided fields.
    fn upsert(
        &self,
        input: UpsertLandingContent,
    ) -> impl Future<Output = HomestayResult<LandingPageContent>> + Send;
}
