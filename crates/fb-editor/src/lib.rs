pub mod canvas;
pub mod commands;
pub mod input;
pub mod palette;
pub mod persistence;
pub mod properties;
pub mod session;
pub mod shortcuts;
pub mod sync;

pub use canvas::{CanvasEngine, CanvasError, reorder_triggered};
pub use commands::CommandStack;
pub use input::{CanvasEvent, DragItem, HoverTarget, Point};
pub use persistence::{FormStore, MemoryStore, SaveMode, StoreError};
pub use properties::{PropertiesPanel, PropertySheet};
pub use session::{EditorConfig, EditorSession, Notice, SaveTicket};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use sync::{FieldMutation, SyncEngine};
