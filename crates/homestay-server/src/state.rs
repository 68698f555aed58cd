//! Shared application state handed to every handler.

use std::sync::Arc;

use homestay_auth::{AuthConfig, AuthService};
use homestay_db::repository::{
    SurrealApplicationRepository, SurrealLandingPageRepository, SurrealReviewRepository,
    SurrealSessionRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

use crate::mail::Mailer;
use crate::media::ImageHost;

pub type Auth = AuthService<SurrealUserRepository<Any>, SurrealSessionRepository<Any>>;

pub struct AppState {
    pub users: SurrealUserRepository<Any>,
    pub reviews: SurrealReviewRepository<Any>,
    pub applications: SurrealApplicationRepository<Any>,
    pub landing: SurrealLandingPageRepository<Any>,
    pub auth: Auth,
    pub mailer: Arc<dyn Mailer>,
    pub images: Arc<dyn ImageHost>,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(
        db: Surreal<Any>,
        auth_config: AuthConfig,
        cookie_secure: bool,
        mailer: Arc<dyn Mailer>,
        images: Arc<dyn ImageHost>,
    ) -> Arc<Self> {
        Arc::new(Self {
            users: SurrealUserRepository::new(db.clone()),
            reviews: SurrealReviewRepository::new(db.clone()),
            applications: SurrealApplicationRepository::new(db.clone()),
            landing: SurrealLandingPageRepository::new(db.clone()),
            auth: AuthService::new(
                SurrealUserRepository::new(db.clone()),
                SurrealSessionRepository::new(db),
                auth_config,
            ),
            mailer,
            images,
            cookie_secure,
        })
    }
}
