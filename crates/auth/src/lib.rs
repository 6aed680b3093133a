//! User accounts for Hearth.
//!
//! A SQLite-backed user store plus the two credential primitives it needs:
//! salted password hashing and signed access tokens. The store owns the
//! mapping from an account to its memory partition key (`mem0_user_id`),
//! which is assigned once at creation and never changes.

pub mod password;
pub mod token;
pub mod user;

pub use token::{Claims, TokenSigner};
pub use user::{NewUser, User, UserStore, UserUpdate};
