//! Caller-owned chat history that folds prior turns into a prompt

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   User
  , Assistant
}

impl Role
{   fn label(&self) -> &'static str
    {   match self
        {   Role::User => "User"
          , Role::Assistant => "Assistant"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: Role
  , pub content: String
}

/// Message list kept between interactions.
/// The adapter never sees this; callers fold it into a prompt first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation
{   messages: Vec<ChatMessage>
  , /// Only the most recent messages go into prompts
    max_messages: Option<usize>
}

impl Conversation
{   pub fn new() -> Self
    {   Conversation::default()
    }

    pub fn with_max_messages(max_messages: usize) -> Self
    {   Conversation
        {   messages: vec![]
          , max_messages: Some(max_messages)
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>)
    {   self.messages.push(ChatMessage
        {   role: Role::User
          , content: content.into()
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>)
    {   self.messages.push(ChatMessage
        {   role: Role::Assistant
          , content: content.into()
        });
    }

    pub fn clear(&mut self)
    {   self.messages.clear();
    }

    pub fn messages(&self) -> &[ChatMessage]
    {   &self.messages
    }

    pub fn len(&self) -> usize
    {   self.messages.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.messages.is_empty()
    }

    pub fn user_turns(&self) -> usize
    {   self.messages
          .iter()
          .filter(|m| m.role == Role::User)
          .count()
    }

    /// Prompt for `next` with prior turns prepended.
    /// An empty history returns `next` unchanged.
    pub fn build_prompt(&self, next: &str) -> String
    {   let skip = match self.max_messages
        {   Some(max) => self.messages.len().saturating_sub(max)
          , None => 0
        };
        let history = &self.messages[skip..];
        if history.is_empty()
        {   return next.to_string();
        }

        let mut prompt = String::new();
        for message in history
        {   prompt.push_str(message.role.label());
            prompt.push_str(": ");
            prompt.push_str(&message.content);
            prompt.push('\n');
        }
        prompt.push_str("User: ");
        prompt.push_str(next);
        prompt.push_str("\nAssistant:");
        prompt
    }
}
