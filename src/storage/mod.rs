//! Staging object-store module

pub mod auth;
pub mod gcs;
pub mod store;

pub use auth::AccessTokenProvider;
pub use gcs::GcsStore;
pub use store::{delete_by_prefix, move_object, ObjectStore};
