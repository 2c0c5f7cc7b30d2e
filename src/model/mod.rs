//! Core data model types: messages, senders, and escaped attributes.

pub mod address;
pub mod attribute;
pub mod message;
