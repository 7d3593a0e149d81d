pub mod error;
pub mod id;
pub mod model;
pub mod rules;
pub mod scale;
pub mod store;
pub mod validate;

pub use error::DocumentError;
pub use id::FieldId;
pub use model::*;
pub use rules::{ApplyDate, PlanFees, PlanTable, RuleContext, RuleSet, apply_date_writes};
pub use scale::{FALLBACK_PAGE, PageMetrics, PageSize, StageRect, stage_rect};
pub use store::{JsonFileStore, MemoryStore, StorageKey, ValueStore};
pub use validate::{MissingField, check_required, missing_summary};
