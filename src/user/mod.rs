//! The user directory.
//!
//! This module contains everything related to users:
//! - The `User` model and the public views of it that are sent to clients
//! - Database functions for storing users and their transaction references
//! - Route handlers for registration, log-in, avatars and listing users

mod avatar_endpoint;
mod core;
mod list_endpoint;
mod log_in_endpoint;
mod register_endpoint;

pub use avatar_endpoint::set_avatar_endpoint;
pub use self::core::{
    NewUser, User, UserId, UserProfile, UserSummary, append_transaction_ref, create_user,
    create_user_table, get_user_by_email, get_user_by_id, remove_transaction_ref,
};
pub use list_endpoint::list_other_users_endpoint;
pub use log_in_endpoint::log_in;
pub use register_endpoint::register_user;
