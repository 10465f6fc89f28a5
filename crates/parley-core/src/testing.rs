//! Fixture world shared by the unit tests of this crate.

use parley_shared::{ConversationId, MessageView, UserId};
use parley_store::Database;

use crate::conversations::{self, ConversationDraft};
use crate::messaging::{self, MessageDraft};
use crate::users;

pub(crate) struct World {
    pub db: Database,
    pub alice: UserId,
    pub bob: UserId,
    pub carol: UserId,
}

impl World {
    pub fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        let alice = users::login(&db, "alice").unwrap();
        let bob = users::login(&db, "bob").unwrap();
        let carol = users::login(&db, "carol").unwrap();
        Self {
            db,
            alice,
            bob,
            carol,
        }
    }

    pub fn chat(&self, a: UserId, b: UserId) -> ConversationId {
        let draft = ConversationDraft {
            kind: "chat".into(),
            participants: vec![b],
            ..Default::default()
        };
        conversations::create(&self.db, a, draft).unwrap()
    }

    /// A group created by the first member.
    pub fn group(&self, name: &str, members: &[UserId]) -> ConversationId {
        let draft = ConversationDraft {
            kind: "group".into(),
            participants: members.to_vec(),
            name: Some(name.into()),
            photo_url: None,
        };
        conversations::create(&self.db, members[0], draft).unwrap()
    }

    pub fn say(&self, conversation: ConversationId, sender: UserId, text: &str) -> MessageView {
        messaging::send(&self.db, conversation, sender, MessageDraft::text(text)).unwrap()
    }
}
