//! Document and workspace state: everything between the raw gap buffer
//! and the terminal front end. A [`document::Document`] owns one buffer
//! plus its cursor, scroll, selection and undo bookkeeping; the
//! [`workspace::Workspace`] holds the ring of open documents and the
//! state they share.

pub mod document;
pub mod workspace;
