//! Delivery channels for rendered error reports.
//!
//! The dispatcher talks to channels only through the `AdminMailer` and
//! `ChatPoster` traits, so tests can substitute capturing fakes for the
//! real SMTP and webhook backends.

pub mod chat;
pub mod email;

pub use chat::{ChatChannel, ChatPoster};
pub use email::{AdminMailer, EmailChannel};
