//! Conversation creation, the caller's conversation list, and the detail
//! view of a single conversation.

use std::collections::BTreeSet;

use parley_shared::constants::DIRECT_PARTICIPANTS;
use parley_shared::{ConversationDetail, ConversationId, ConversationKind, ConversationView, UserId};
use parley_store::{Database, NewConversation};
use tracing::{debug, info};

use crate::compose;
use crate::error::{CoreError, Result};
use crate::guard;

/// A conversation as requested by a client, before validation.
#[derive(Debug, Clone, Default)]
pub struct ConversationDraft {
    /// `"chat"` or `"group"`.
    pub kind: String,
    pub participants: Vec<UserId>,
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

/// Only the empty string counts as absent; whitespace is kept verbatim.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Validate a draft into the exact rows to insert.
///
/// The creator is always included and duplicate ids collapse, so a direct
/// conversation ends up with exactly two distinct participants or is
/// rejected.
pub fn validate(creator: UserId, draft: ConversationDraft) -> Result<NewConversation> {
    let kind: ConversationKind = draft
        .kind
        .parse()
        .map_err(|_| CoreError::BadRequest("type must be 'chat' or 'group'".into()))?;
    let name = non_empty(draft.name);
    let photo_url = non_empty(draft.photo_url);

    if draft.participants.is_empty() {
        return Err(CoreError::BadRequest(
            "at least one participant is required".into(),
        ));
    }

    match kind {
        ConversationKind::Group if name.is_none() => {
            return Err(CoreError::BadRequest("a group requires a name".into()));
        }
        ConversationKind::Direct if name.is_some() => {
            return Err(CoreError::BadRequest(
                "a direct conversation cannot have a name".into(),
            ));
        }
        ConversationKind::Direct if photo_url.is_some() => {
            return Err(CoreError::BadRequest(
                "a direct conversation cannot have a photo".into(),
            ));
        }
        _ => {}
    }

    let participants: BTreeSet<UserId> = draft
        .participants
        .into_iter()
        .chain(std::iter::once(creator))
        .collect();

    if kind == ConversationKind::Direct && participants.len() != DIRECT_PARTICIPANTS {
        return Err(CoreError::BadRequest(
            "a direct conversation needs exactly two distinct participants".into(),
        ));
    }

    Ok(NewConversation {
        kind,
        name,
        photo_url,
        participants: participants.into_iter().collect(),
    })
}

/// Create a conversation with its initial participants in one transaction.
pub fn create(db: &Database, creator: UserId, draft: ConversationDraft) -> Result<ConversationId> {
    let new = validate(creator, draft)?;

    for user in &new.participants {
        if !db.user_exists(*user)? {
            return Err(CoreError::BadRequest(format!("unknown participant {user}")));
        }
    }

    let id = db.create_conversation(&new).map_err(|e| {
        if e.is_foreign_key_violation() {
            CoreError::BadRequest("unknown participant".into())
        } else {
            e.into()
        }
    })?;

    info!(
        conversation = %id,
        creator = %creator,
        kind = %new.kind,
        participants = new.participants.len(),
        "conversation created"
    );
    Ok(id)
}

/// Every conversation of `viewer`, with participants and latest-message
/// previews, most recently active first.
pub fn list(db: &Database, viewer: UserId) -> Result<Vec<ConversationView>> {
    let conversations = db.list_conversations_for(viewer)?;
    let participants = db.participants_for_member(viewer)?;
    let latest = db.latest_messages_for_member(viewer)?;

    debug!(user = %viewer, count = conversations.len(), "listing conversations");
    Ok(compose::conversation_list(
        viewer,
        conversations,
        participants,
        latest,
    ))
}

/// Descriptor and full history of one conversation.
///
/// A caller who is not a participant gets [`CoreError::NotFound`], the same
/// answer as for a conversation that does not exist.
pub fn detail(
    db: &Database,
    viewer: UserId,
    conversation: ConversationId,
) -> Result<ConversationDetail> {
    if !guard::is_participant(db, conversation, viewer)? {
        return Err(CoreError::NotFound("conversation not found".into()));
    }

    let info = db.get_conversation(conversation)?;
    let participants = db.participants_of(conversation)?;
    let messages = db.list_messages(conversation)?;

    Ok(compose::conversation_detail(
        viewer,
        info,
        participants,
        messages,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::World;

    fn draft(kind: &str, participants: &[UserId]) -> ConversationDraft {
        ConversationDraft {
            kind: kind.into(),
            participants: participants.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn chat_always_has_two_participants() {
        let w = World::new();

        // Only the other party given.
        let a = create(&w.db, w.alice, draft("chat", &[w.bob])).unwrap();
        assert_eq!(w.db.participants_of(a).unwrap().len(), 2);

        // Other party given twice, creator given explicitly.
        let b = create(&w.db, w.alice, draft("chat", &[w.bob, w.bob, w.alice])).unwrap();
        assert_eq!(w.db.participants_of(b).unwrap().len(), 2);
        assert!(guard::is_participant(&w.db, b, w.alice).unwrap());
        assert!(guard::is_participant(&w.db, b, w.bob).unwrap());
    }

    #[test]
    fn chat_with_wrong_participant_count_is_rejected() {
        let w = World::new();
        assert!(matches!(
            create(&w.db, w.alice, draft("chat", &[w.alice])),
            Err(CoreError::BadRequest(_))
        ));
        assert!(matches!(
            create(&w.db, w.alice, draft("chat", &[w.bob, w.carol])),
            Err(CoreError::BadRequest(_))
        ));
        assert!(matches!(
            create(&w.db, w.alice, draft("chat", &[])),
            Err(CoreError::BadRequest(_))
        ));
    }

    #[test]
    fn validation_rules() {
        let w = World::new();

        let group_without_name = draft("group", &[w.bob]);
        assert!(matches!(
            create(&w.db, w.alice, group_without_name),
            Err(CoreError::BadRequest(_))
        ));

        let chat_with_name = ConversationDraft {
            name: Some("x".into()),
            ..draft("chat", &[w.bob])
        };
        assert!(matches!(
            create(&w.db, w.alice, chat_with_name),
            Err(CoreError::BadRequest(_))
        ));

        let chat_with_photo = ConversationDraft {
            photo_url: Some("http://img/x.png".into()),
            ..draft("chat", &[w.bob])
        };
        assert!(matches!(
            create(&w.db, w.alice, chat_with_photo),
            Err(CoreError::BadRequest(_))
        ));

        assert!(matches!(
            create(&w.db, w.alice, draft("channel", &[w.bob])),
            Err(CoreError::BadRequest(_))
        ));

        // Empty strings count as absent, whitespace does not.
        let chat_with_empty_strings = ConversationDraft {
            name: Some(String::new()),
            photo_url: Some(String::new()),
            ..draft("chat", &[w.bob])
        };
        assert!(create(&w.db, w.alice, chat_with_empty_strings).is_ok());

        let chat_with_blank_name = ConversationDraft {
            name: Some(" ".into()),
            ..draft("chat", &[w.bob])
        };
        assert!(matches!(
            create(&w.db, w.alice, chat_with_blank_name),
            Err(CoreError::BadRequest(_))
        ));
        let chat_with_blank_photo = ConversationDraft {
            photo_url: Some("  ".into()),
            ..draft("chat", &[w.bob])
        };
        assert!(matches!(
            create(&w.db, w.alice, chat_with_blank_photo),
            Err(CoreError::BadRequest(_))
        ));
    }

    #[test]
    fn group_name_is_stored_verbatim() {
        let w = World::new();
        let padded = ConversationDraft {
            name: Some("  team  ".into()),
            ..draft("group", &[w.bob])
        };
        let id = create(&w.db, w.alice, padded).unwrap();
        assert_eq!(
            w.db.get_conversation(id).unwrap().name.as_deref(),
            Some("  team  ")
        );
    }

    #[test]
    fn unknown_participant_is_rejected_without_side_effects() {
        let w = World::new();
        let bad = ConversationDraft {
            name: Some("g".into()),
            ..draft("group", &[w.bob, UserId(404)])
        };
        assert!(matches!(
            create(&w.db, w.alice, bad),
            Err(CoreError::BadRequest(_))
        ));
        assert!(list(&w.db, w.alice).unwrap().is_empty());
    }

    #[test]
    fn participation_starts_at_creation() {
        let w = World::new();
        let members = [w.alice, w.bob, w.carol];
        let group = ConversationDraft {
            name: Some("trio".into()),
            ..draft("group", &members)
        };
        let id = create(&w.db, w.alice, group).unwrap();
        for user in members {
            assert!(guard::is_participant(&w.db, id, user).unwrap());
        }
        // Creator alone is a valid group.
        let solo = ConversationDraft {
            name: Some("notes".into()),
            ..draft("group", &[w.alice])
        };
        let solo = create(&w.db, w.alice, solo).unwrap();
        assert_eq!(w.db.participants_of(solo).unwrap().len(), 1);
    }

    #[test]
    fn list_shows_previews_and_fallback_names() {
        let w = World::new();
        let chat = w.chat(w.alice, w.bob);
        let quiet = w.group("quiet", &[w.alice, w.carol]);
        let msg = w.say(chat, w.bob, "hello");

        let views = list(&w.db, w.alice).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].id, chat);
        assert_eq!(views[0].name, "bob");
        assert_eq!(views[0].latest_message.as_ref().unwrap().id, msg.id);
        assert_eq!(views[1].id, quiet);
        assert!(views[1].latest_message.is_none());

        let bobs = list(&w.db, w.bob).unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].name, "alice");
    }

    #[test]
    fn detail_requires_participation() {
        let w = World::new();
        let chat = w.chat(w.alice, w.bob);

        let empty = detail(&w.db, w.alice, chat).unwrap();
        assert!(empty.messages.is_empty());
        assert_eq!(empty.conversation.participants.len(), 2);

        assert!(matches!(
            detail(&w.db, w.carol, chat),
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            detail(&w.db, w.alice, ConversationId(999)),
            Err(CoreError::NotFound(_))
        ));
    }
}
