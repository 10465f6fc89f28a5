//! Group membership and group profile.
//!
//! Every operation requires the requester to be a participant and the
//! conversation to be a group. Leaving and removing another member are the
//! same operation; there is no admin role.

use parley_shared::{ConversationId, UserId};
use parley_store::Database;
use tracing::info;

use crate::error::{CoreError, Result};
use crate::guard;

fn require_member_of_group(
    db: &Database,
    conversation: ConversationId,
    requester: UserId,
) -> Result<()> {
    guard::require_participant(db, conversation, requester)?;
    guard::require_group(db, conversation)
}

pub fn add_participant(
    db: &Database,
    conversation: ConversationId,
    requester: UserId,
    target: UserId,
) -> Result<()> {
    require_member_of_group(db, conversation, requester)?;

    if !db.user_exists(target)? {
        return Err(CoreError::NotFound("user not found".into()));
    }
    if guard::is_participant(db, conversation, target)? {
        return Err(CoreError::Forbidden("user is already a participant".into()));
    }
    if !db.add_participant(conversation, target)? {
        return Err(CoreError::Forbidden("user is already a participant".into()));
    }

    info!(conversation = %conversation, user = %target, by = %requester, "participant added");
    Ok(())
}

/// Remove `target` from the group. `target == requester` is leaving.
/// The last participant cannot leave.
pub fn remove_participant(
    db: &Database,
    conversation: ConversationId,
    requester: UserId,
    target: UserId,
) -> Result<()> {
    require_member_of_group(db, conversation, requester)?;

    if !guard::is_participant(db, conversation, target)? {
        return Err(CoreError::Forbidden("user is not a participant".into()));
    }
    if !db.remove_participant(conversation, target)? {
        return Err(CoreError::Forbidden(
            "the last participant cannot leave a group".into(),
        ));
    }

    info!(conversation = %conversation, user = %target, by = %requester, "participant removed");
    Ok(())
}

pub fn rename(
    db: &Database,
    conversation: ConversationId,
    requester: UserId,
    name: &str,
) -> Result<()> {
    require_member_of_group(db, conversation, requester)?;
    if name.is_empty() {
        return Err(CoreError::BadRequest("name must not be empty".into()));
    }
    if !db.set_group_name(conversation, name)? {
        return Err(CoreError::NotFound("conversation not found".into()));
    }
    info!(conversation = %conversation, by = %requester, "group renamed");
    Ok(())
}

/// An empty `photo_url` clears the photo.
pub fn set_photo(
    db: &Database,
    conversation: ConversationId,
    requester: UserId,
    photo_url: &str,
) -> Result<()> {
    require_member_of_group(db, conversation, requester)?;
    let photo = Some(photo_url).filter(|p| !p.is_empty());
    if !db.set_group_photo(conversation, photo)? {
        return Err(CoreError::NotFound("conversation not found".into()));
    }
    info!(conversation = %conversation, by = %requester, "group photo updated");
    Ok(())
}
