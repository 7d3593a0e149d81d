pub mod input;
pub mod session;
pub mod signature;

pub use input::InputEvent;
pub use session::{EXPORT_SETTLE, ExportOutcome, FillSession, PageState};
pub use signature::{SignaturePad, StrokeState};
