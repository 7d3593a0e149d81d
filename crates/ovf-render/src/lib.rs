pub mod hit;
pub mod paint;
pub mod view;

pub use hit::hit_test;
pub use paint::{PaintOp, paint_page};
pub use view::{
    CHECKED_GLYPH, Control, FieldView, RadioChoice, RenderMode, UNCHECKED_GLYPH,
    build_field_view, build_page_views,
};
