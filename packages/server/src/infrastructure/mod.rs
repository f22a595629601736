//! Infrastructure layer: concrete implementations of the collaborator
//! traits the domain defines.

pub mod mailer;
pub mod message_pusher;
pub mod rules;
