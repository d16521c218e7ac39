use std::{fmt, str::FromStr};

use serde_json::{json, Value};
use uuid::Uuid;

pub type IdentityId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Seeker,
    Provider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        use Role::*;
        match self {
            Seeker => "seeker",
            Provider => "provider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seeker" | "Seeker" => Ok(Role::Seeker),
            "provider" | "Provider" => Ok(Role::Provider),
            _ => Err(format!("unknown role {s:?}")),
        }
    }
}

/// Opaque id of one live transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// (role, identity) as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    pub role: Role,
    pub identity: IdentityId,
}

impl Binding {
    pub fn new(role: Role, identity: impl Into<IdentityId>) -> Self {
        Self { role, identity: identity.into() }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.role, self.identity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    Chat { text: String },
    ProfileDisclosure { payload: Value },
}

impl MessageKind {
    /// Outbound event name the recipient sees.
    pub fn event_name(&self) -> &'static str {
        use MessageKind::*;
        match self {
            Chat { .. } => "message-received",
            ProfileDisclosure { .. } => "profile-received",
        }
    }

    pub fn tag(&self) -> &'static str {
        use MessageKind::*;
        match self {
            Chat { .. } => "Chat",
            ProfileDisclosure { .. } => "ProfileDisclosure",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub sender_identity: IdentityId,
    pub sender_display_name: String,
    pub recipient: Binding,
    pub kind: MessageKind,
}

impl Message {
    pub fn chat(
        sender_identity: impl Into<IdentityId>,
        sender_display_name: impl Into<String>,
        recipient: Binding,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender_identity: sender_identity.into(),
            sender_display_name: sender_display_name.into(),
            recipient,
            kind: MessageKind::Chat { text: text.into() },
        }
    }

    pub fn profile_disclosure(
        sender_identity: impl Into<IdentityId>,
        sender_display_name: impl Into<String>,
        recipient: Binding,
        payload: Value,
    ) -> Self {
        Self {
            sender_identity: sender_identity.into(),
            sender_display_name: sender_display_name.into(),
            recipient,
            kind: MessageKind::ProfileDisclosure { payload },
        }
    }

    /// Body of the outbound delivery. The recipient fields are not echoed.
    pub fn to_payload(&self) -> Value {
        match &self.kind {
            MessageKind::Chat { text } => json!({
                "senderIdentity": self.sender_identity,
                "senderDisplayName": self.sender_display_name,
                "text": text,
                "kind": self.kind.tag(),
            }),
            MessageKind::ProfileDisclosure { payload } => json!({
                "senderIdentity": self.sender_identity,
                "senderDisplayName": self.sender_display_name,
                "payload": payload,
                "kind": self.kind.tag(),
            }),
        }
    }
}
