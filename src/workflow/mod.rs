//! Interactive field-generation workflow.
//!
//! A category names an ordered list of steps. Each step is a
//! [`FieldDescriptor`] saying how its field is produced:
//!
//! - `string` - generate from a prompt template, edit by hand, or accept
//! - `bound` - enter a number in range or pick one at random, then confirm
//! - `recipe` - derive the field from others without asking
//! - `menu` - a nested editor, saved after every command
//!
//! The [driver](run_workflow) walks the steps under a [`Policy`]; the
//! [chapter editor](chapter_menu) is the submenu behind `chapters`.

mod chapters;
mod driver;
mod fields;
mod generate;
mod session;

pub use chapters::{chapter_menu, format_chapters};
pub use driver::{run_workflow, should_run, Policy};
pub use fields::{
    descriptor, field_order, FieldDescriptor, FieldKind, MenuSignal, Submenu, Transform,
    DESCRIPTOR_NAMES, REGISTRY,
};
pub use generate::{
    bound_cycle, run_field, text_cycle, until_accepted, update_chapter_part, ChapterPart, Step,
};
pub use session::{Interaction, Session};
