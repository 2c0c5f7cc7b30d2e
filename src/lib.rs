//! `remotegate` — remote-content policy filter for HTML email bodies.
//!
//! Decides whether escaped remote references (`proton-src`, `proton-url`, …)
//! in a rendered message body may load. When they may, the body is either
//! unescaped in place or, for manual loading, the references are reported
//! through an [`remote::EventSink`].

pub mod config;
pub mod error;
pub mod html;
pub mod model;
pub mod parser;
pub mod remote;
