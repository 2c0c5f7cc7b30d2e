//! Message loading: `.eml`/MBOX-framed messages and bare HTML bodies.

pub mod eml;
pub mod mime;
