use serde_json::Value;

use crate::{AppResult, GetField};

use super::message::{Binding, IdentityId, Message, Role};

const ANONYMOUS: &str = "Anonymous";

/// Decoded client frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Login { role: Role, identity: IdentityId },
    Chat(Message),
    ProfileDisclosure(Message),
}

impl InboundEvent {
    pub fn from_slice(bytes: &[u8]) -> AppResult<InboundEvent> {
        let json: Value = serde_json::from_slice(bytes)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &Value) -> AppResult<InboundEvent> {
        let event = json.get_str_field("event")?;
        let data = json.get_obj_field("data")?;

        match event.as_str() {
            "login" => Ok(InboundEvent::Login {
                role: data.get_str_field("role")?.parse()?,
                identity: data.get_str_field("identityId")?,
            }),
            "chat-message" => {
                let recipient = Binding::new(
                    data.get_str_field("recipientRole")?.parse()?,
                    data.get_str_field("recipientIdentity")?,
                );
                let (sender, name) = sender_of(data)?;
                Ok(InboundEvent::Chat(Message::chat(sender, name, recipient, data.get_str_field("text")?)))
            }
            "profile-disclosure" => {
                let role = match data.get_opt_str_field("recipientRole")? {
                    Some(role) => role.parse()?,
                    None => Role::Provider,
                };
                let recipient = Binding::new(role, data.get_str_field("recipientIdentity")?);
                let (sender, name) = sender_of(data)?;
                let payload = data.get_obj_field("payload")?;
                if !payload.is_object() {
                    return Err(format!("expected payload in {data} to be object").into());
                }
                let payload = payload.clone();
                Ok(InboundEvent::ProfileDisclosure(Message::profile_disclosure(sender, name, recipient, payload)))
            }
            other => Err(format!("unknown event {other:?}").into()),
        }
    }
}

/// `senderDisplayName` is optional on the wire; clients that omit it show up
/// as "Anonymous".
fn sender_of(data: &Value) -> AppResult<(IdentityId, String)> {
    let sender = data.get_str_field("senderIdentity")?;
    let name = data
        .get_opt_str_field("senderDisplayName")?
        .unwrap_or_else(|| ANONYMOUS.to_owned());
    Ok((sender, name))
}
