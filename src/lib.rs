//! wabridge — WhatsApp webhook bridge for the Meta Cloud API and Serpro.
//!
//! Receives webhook events from either provider, asks an answer source what to
//! reply, renders the replies into the provider's wire format and delivers them
//! with the right credentials.
//!
//! See `DESIGN.md` for the architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod answers;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod http;
pub mod logging;
pub mod server;
pub mod whatsapp;
