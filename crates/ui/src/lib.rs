//! Terminal front end: raw-mode screen driver, line/status-bar rendering,
//! bottom-row prompts, key decoding, and the main edit loop. Everything
//! here reads engine state and paints; the engine never touches the
//! terminal itself.

pub mod help;
pub mod input;
pub mod prompt;
pub mod render;
pub mod run;
pub mod screen;

pub use run::{run, Options};
