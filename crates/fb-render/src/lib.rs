pub mod control;
pub mod design;
mod html;
pub mod hit;
pub mod runtime;

pub use control::{Control, InputKind, RenderMode};
pub use design::render_canvas;
pub use hit::{hit_index, hit_test, hover_index};
pub use runtime::{FillSession, render_form};
