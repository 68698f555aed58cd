//! SurrealDB repository implementations.

mod application;
mod landing;
mod review;
mod session;
mod user;

pub use application::SurrealApplicationRepository;
pub use landing::SurrealLandingPageRepository;
pub use review::SurrealReviewRepository;
pub use session::SurrealSessionRepository;
pub use user::SurrealUserRepository;
