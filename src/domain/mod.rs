//! Core types: Note, name rules, index line form

mod note;

pub use note::{INDEX_DATE_FORMAT, Note, NoteError, ParseIndexLineError, invalid_name};
