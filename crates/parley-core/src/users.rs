//! Profile operations: login-or-create, user search, display name and photo.

use parley_shared::validation::is_valid_username;
use parley_shared::{UserId, UserView};
use parley_store::Database;
use tracing::info;

use crate::compose::user_view;
use crate::error::{CoreError, Result};

fn validate_username(name: &str) -> Result<()> {
    if is_valid_username(name) {
        Ok(())
    } else {
        Err(CoreError::BadRequest(
            "username must be 3 to 16 letters or digits".into(),
        ))
    }
}

/// Log in by display name, creating the user on first use.
pub fn login(db: &Database, name: &str) -> Result<UserId> {
    validate_username(name)?;
    let (id, created) = db.login(name)?;
    if created {
        info!(user = %id, name, "new user registered");
    } else {
        info!(user = %id, "user logged in");
    }
    Ok(id)
}

/// Users other than `caller`, optionally restricted to one exact name.
/// An empty result is [`CoreError::NotFound`].
pub fn search(db: &Database, caller: UserId, name: Option<&str>) -> Result<Vec<UserView>> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let users = db.search_users(name, caller)?;
    if users.is_empty() {
        return Err(CoreError::NotFound("no user found".into()));
    }
    Ok(users.into_iter().map(user_view).collect())
}

pub fn profile(db: &Database, id: UserId) -> Result<UserView> {
    Ok(user_view(db.get_user(id)?))
}

pub fn rename(db: &Database, caller: UserId, name: &str) -> Result<()> {
    validate_username(name)?;
    match db.set_username(caller, name) {
        Ok(true) => {
            info!(user = %caller, name, "username changed");
            Ok(())
        }
        Ok(false) => Err(CoreError::NotFound("user not found".into())),
        Err(e) if e.is_unique_violation() => {
            Err(CoreError::Conflict(format!("username '{name}' is already in use")))
        }
        Err(e) => Err(e.into()),
    }
}

/// Set the caller's photo; an empty URL clears it.
pub fn set_photo(db: &Database, caller: UserId, photo_url: &str) -> Result<()> {
    let photo = Some(photo_url.trim()).filter(|p| !p.is_empty());
    if !db.set_user_photo(caller, photo)? {
        return Err(CoreError::NotFound("user not found".into()));
    }
    info!(user = %caller, cleared = photo.is_none(), "profile photo changed");
    Ok(())
}
