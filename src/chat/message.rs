use serde::Serialize;

/// Role of a participant in a chat-completions request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions shared by every prompt of a batch
    System,
    /// The rendered prompt
    User,
}

/// A single message sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Who the message speaks for
    pub role: ChatRole,
    /// The text content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new builder for a system message
    pub fn system() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::System)
    }

    /// Create a new builder for a user message
    pub fn user() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::User)
    }

    /// Builds the two-part instruction set for one evaluation: the optional
    /// system instruction first, then the user prompt. Blank system
    /// instructions are skipped.
    pub fn instructions(system: Option<&str>, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system.filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage::system().content(system).build());
        }
        messages.push(ChatMessage::user().content(prompt).build());
        messages
    }
}

/// Builder for ChatMessage
#[derive(Debug)]
pub struct ChatMessageBuilder {
    role: ChatRole,
    content: String,
}

impl ChatMessageBuilder {
    /// Create a new ChatMessageBuilder with specified role
    pub fn new(role: ChatRole) -> Self {
        Self {
            role,
            content: String::new(),
        }
    }

    /// Set the message content
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Build the ChatMessage
    pub fn build(self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_put_system_first() {
        let msgs = ChatMessage::instructions(Some("be terse"), "hello");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, ChatRole::System);
        assert_eq!(msgs[0].content, "be terse");
        assert_eq!(msgs[1].role, ChatRole::User);
        assert_eq!(msgs[1].content, "hello");
    }

    #[test]
    fn blank_system_instruction_is_dropped() {
        let msgs = ChatMessage::instructions(Some("  "), "hello");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].role, ChatRole::User);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let msg = ChatMessage::system().content("x").build();
        let json = serde_json::to_value(&msg).expect("serialize message");
        assert_eq!(json["role"], "system");
    }
}
