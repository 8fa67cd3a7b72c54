//! Core data structures of the editing engine: the gap buffer, the undo
//! log, and the abstract key codes. No I/O and no terminal knowledge here.

pub mod errors;
pub mod gap_buffer;
pub mod history;
pub mod key;
