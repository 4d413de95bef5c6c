//! CMS block model: typed block contents, validation, the editor state
//! machine and its factory, plus the shared import and URL helpers.

pub mod content;
pub mod editor;
pub mod factory;
pub mod import;
pub mod locks;
pub mod url_check;
pub mod validation;

pub use content::{BlockContent, BlockType};
pub use editor::{BlockEditor, BlockPersistence, EditorOutcome};
pub use factory::{editor_for, render_published, EditorSlot};
