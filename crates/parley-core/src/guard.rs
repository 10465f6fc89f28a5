//! Participation guard: the authorization gate for every
//! conversation-scoped operation.
//!
//! Membership is re-read from the store on every call. A check followed by a
//! separate mutation is not atomic; a membership revoked in between is not
//! noticed by the mutation.

use parley_shared::{ConversationId, MessageId, UserId};
use parley_store::Database;

use crate::error::{CoreError, Result};

pub fn is_participant(db: &Database, conversation: ConversationId, user: UserId) -> Result<bool> {
    Ok(db.is_participant(conversation, user)?)
}

/// [`CoreError::Forbidden`] unless `user` belongs to `conversation`.
pub fn require_participant(
    db: &Database,
    conversation: ConversationId,
    user: UserId,
) -> Result<()> {
    if is_participant(db, conversation, user)? {
        Ok(())
    } else {
        tracing::debug!(conversation = %conversation, user = %user, "not a participant");
        Err(CoreError::Forbidden(
            "not a participant of this conversation".into(),
        ))
    }
}

/// `false` for direct conversations and for conversations that do not exist.
pub fn is_group(db: &Database, conversation: ConversationId) -> Result<bool> {
    Ok(db
        .conversation_kind(conversation)?
        .is_some_and(|kind| kind.is_group()))
}

/// [`CoreError::Forbidden`] unless `conversation` is a group.
pub fn require_group(db: &Database, conversation: ConversationId) -> Result<()> {
    if is_group(db, conversation)? {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "operation is only allowed on group conversations".into(),
        ))
    }
}

pub fn is_sender(db: &Database, message: MessageId, user: UserId) -> Result<bool> {
    Ok(db.is_sender(message, user)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::World;

    #[test]
    fn participation_is_exact() {
        let w = World::new();
        let chat = w.chat(w.alice, w.bob);

        assert!(is_participant(&w.db, chat, w.alice).unwrap());
        assert!(is_participant(&w.db, chat, w.bob).unwrap());
        assert!(!is_participant(&w.db, chat, w.carol).unwrap());
        assert!(!is_participant(&w.db, ConversationId(999), w.alice).unwrap());

        assert!(require_participant(&w.db, chat, w.alice).is_ok());
        assert!(matches!(
            require_participant(&w.db, chat, w.carol),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn group_check() {
        let w = World::new();
        let chat = w.chat(w.alice, w.bob);
        let group = w.group("friends", &[w.alice, w.carol]);

        assert!(is_group(&w.db, group).unwrap());
        assert!(!is_group(&w.db, chat).unwrap());
        assert!(!is_group(&w.db, ConversationId(999)).unwrap());
        assert!(matches!(
            require_group(&w.db, chat),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn sender_check() {
        let w = World::new();
        let chat = w.chat(w.alice, w.bob);
        let msg = w.say(chat, w.alice, "hi");

        assert!(is_sender(&w.db, msg.id, w.alice).unwrap());
        assert!(!is_sender(&w.db, msg.id, w.bob).unwrap());
        assert!(!is_sender(&w.db, MessageId(999), w.alice).unwrap());
    }
}
