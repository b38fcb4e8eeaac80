use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Speaker label used when the conversation is flattened into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl ToString) -> Self {
        Self { role: Role::User, content: content.to_string() }
    }

    pub fn assistant(content: impl ToString) -> Self {
        Self { role: Role::Assistant, content: content.to_string() }
    }

    /// An assistant message with no content yet, waiting for a stream to
    /// fill it.
    pub fn placeholder() -> Self {
        Self::assistant("")
    }

    pub fn is_placeholder(&self) -> bool {
        self.role == Role::Assistant && self.content.is_empty()
    }
}

/// Ordered sequence of messages exchanged in a chat.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Deref, From)]
#[serde(transparent)]
pub struct Conversation(Vec<Message>);

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its index.
    pub fn push(&mut self, message: Message) -> usize {
        self.0.push(message);
        self.0.len() - 1
    }

    /// Replaces the content of the message at `index`. Returns `false` when
    /// no message lives there.
    pub fn overwrite(&mut self, index: usize, content: impl Into<String>) -> bool {
        match self.0.get_mut(index) {
            Some(message) => {
                message.content = content.into();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.0
    }
}

impl FromIterator<Message> for Conversation {
    fn from_iter<T: IntoIterator<Item = Message>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
