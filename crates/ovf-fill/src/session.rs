//! The fill session: document + store + rules + renderer, wired together.
//!
//! The session owns the live value set (single source of truth) and keeps
//! every rendered representation of a field in sync with it: each write
//! goes store-first, then updates the live set, notifies subscribers, and
//! refreshes the page views. Derived-rule writes follow the controlling
//! field's own write, through the same path.
//!
//! Everything here runs as discrete reactions to discrete external events
//! (pointer input, control edits, image-load completion, resize, export
//! request) — nothing blocks, and persistence failures never interrupt
//! interaction.

use crate::input::InputEvent;
use crate::signature::{PAD_HEIGHT, PAD_WIDTH, SignaturePad};
use ovf_core::FieldId;
use ovf_core::model::{DesignDocument, FieldKind, FieldValue, ValueSet};
use ovf_core::rules::{ApplyDate, PlanTable, RuleContext, RuleSet, apply_date_writes};
use ovf_core::scale::{PageMetrics, PageSize};
use ovf_core::store::ValueStore;
use ovf_core::validate::{MissingField, check_required, missing_summary};
use ovf_render::hit::hit_test;
use ovf_render::view::{FieldView, RenderMode, build_page_views};
use std::collections::HashMap;
use std::time::Duration;

/// Fixed delay before the host's print/export fires, purely to let final
/// layout settle. Not a correctness timeout.
pub const EXPORT_SETTLE: Duration = Duration::from_millis(150);

/// Result of an export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// All required fields are satisfied; the host may print/export after
    /// the settle delay.
    Proceed { settle: Duration },
    /// Required fields are unmet. The session has already dropped back to
    /// interactive mode so the user can correct them in place.
    Blocked {
        missing: Vec<MissingField>,
        message: String,
    },
}

/// Per-page render state: scale metrics plus the resolved field views.
pub struct PageState {
    pub metrics: PageMetrics,
    pub views: Vec<FieldView>,
}

type ValueObserver = Box<dyn Fn(FieldId, &FieldValue)>;

/// One user's editing session over one design document.
pub struct FillSession {
    doc: DesignDocument,
    plans: PlanTable,
    rules: RuleSet,
    store: Box<dyn ValueStore>,
    /// Live mirror of the store — the single source of truth for views.
    values: ValueSet,
    mode: RenderMode,
    pages: Vec<PageState>,
    pads: HashMap<FieldId, SignaturePad>,
    /// Signature pad currently capturing the pointer, if any.
    active_pad: Option<(usize, FieldId)>,
    observers: Vec<ValueObserver>,
}

impl FillSession {
    /// Start a session. `doc` is already validated (construction of a
    /// [`DesignDocument`] enforces its invariants), `store` is scoped to
    /// this document variant by the host's key resolver, and `apply_date`
    /// is today's date as the host knows it.
    pub fn new(
        doc: DesignDocument,
        plans: PlanTable,
        store: Box<dyn ValueStore>,
        mode: RenderMode,
        apply_date: ApplyDate,
        avail_width: f64,
    ) -> Self {
        let values = store.load();
        let pages = doc
            .pages
            .iter()
            .map(|_| PageState {
                metrics: PageMetrics::new(avail_width),
                views: Vec::new(),
            })
            .collect();

        let mut session = Self {
            doc,
            plans,
            rules: RuleSet::standard(),
            store,
            values,
            mode,
            pages,
            pads: HashMap::new(),
            active_pad: None,
            observers: Vec::new(),
        };

        // Date auto-fill runs on every render start and overwrites any
        // previously persisted date components.
        for (id, value) in apply_date_writes(apply_date) {
            session.write_raw(id, value);
        }

        // Seed signature pads from prior values before interaction begins.
        let signature_ids: Vec<FieldId> = session
            .doc
            .fields()
            .filter(|f| f.kind == FieldKind::Signature)
            .filter_map(|f| f.id)
            .collect();
        for id in signature_ids {
            let mut pad = SignaturePad::new();
            if let Some(FieldValue::Text(uri)) = session.values.get(&id) {
                pad.load_data_uri(uri);
            }
            session.pads.insert(id, pad);
        }

        session.rebuild_views();
        session
    }

    // ─── Write path ──────────────────────────────────────────────────────

    /// Capture a value change for `id`: persist, mirror, notify, refresh,
    /// then apply any derived-rule writes (strictly after this one).
    pub fn set_value(&mut self, id: FieldId, value: FieldValue) {
        self.write_raw(id, value.clone());

        let ctx = RuleContext { plans: &self.plans };
        let derived = self.rules.on_change(id, &value, &ctx);
        for (dep_id, dep_value) in derived {
            self.write_raw(dep_id, dep_value);
        }

        self.rebuild_views();
    }

    // Derived writes reuse this without re-entering the rule engine.
    fn write_raw(&mut self, id: FieldId, value: FieldValue) {
        self.store.upsert(id, value.clone());
        self.values.insert(id, value.clone());
        for observer in &self.observers {
            observer(id, &value);
        }
    }

    /// Watch every write (direct, derived, and auto-fill). All rendered
    /// representations of a field subscribe here instead of being located
    /// by id after the fact.
    pub fn subscribe(&mut self, observer: impl Fn(FieldId, &FieldValue) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ─── Event reactions ─────────────────────────────────────────────────

    /// React to one normalized input event.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Resize { avail_width } => {
                // Independent per page; stage-space views are untouched.
                for state in &mut self.pages {
                    state.metrics.set_avail_width(avail_width);
                }
            }
            InputEvent::PointerDown { page, x, y, .. } => {
                if self.mode != RenderMode::Interactive {
                    return;
                }
                let Some(state) = self.pages.get(page) else {
                    return;
                };
                let Some(id) = hit_test(&state.views, &state.metrics, x, y) else {
                    return;
                };
                if !self.pads.contains_key(&id) {
                    return; // only signature fields capture the pointer
                }
                if let Some((px, py)) = self.pad_local(page, id, x, y)
                    && let Some(pad) = self.pads.get_mut(&id)
                {
                    pad.pointer_down(px, py);
                    self.active_pad = Some((page, id));
                }
            }
            InputEvent::PointerMove { page, x, y, .. } => {
                let Some((active_page, id)) = self.active_pad else {
                    return;
                };
                if active_page != page {
                    return;
                }
                let emitted = self
                    .pad_local(page, id, x, y)
                    .and_then(|(px, py)| self.pads.get_mut(&id)?.pointer_move(px, py));
                if let Some(uri) = emitted {
                    // Continuous autosave: one write per stroke segment.
                    self.set_value(id, FieldValue::Text(uri));
                }
            }
            InputEvent::PointerUp { .. } => {
                if let Some((_, id)) = self.active_pad.take()
                    && let Some(pad) = self.pads.get_mut(&id)
                {
                    pad.pointer_up();
                }
            }
        }
    }

    /// The host discovered a page background's intrinsic pixel size.
    pub fn background_loaded(&mut self, page: usize, size: PageSize) {
        if let Some(state) = self.pages.get_mut(page) {
            state.metrics.set_intrinsic(size);
        }
        self.rebuild_views();
    }

    // ─── Export gate ─────────────────────────────────────────────────────

    /// Validate required fields against the persisted set. Runs only on
    /// request — ordinary editing never pays for it.
    pub fn request_export(&mut self) -> ExportOutcome {
        let missing = check_required(&self.doc, &self.store.read_all());
        if missing.is_empty() {
            return ExportOutcome::Proceed {
                settle: EXPORT_SETTLE,
            };
        }
        let message = missing_summary(&missing);
        log::warn!("export blocked: {message}");
        // Back to fill mode so the user can correct in place.
        self.set_mode(RenderMode::Interactive);
        ExportOutcome::Blocked { missing, message }
    }

    // ─── Queries & mode ──────────────────────────────────────────────────

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        if self.mode != mode {
            self.mode = mode;
            self.rebuild_views();
        }
    }

    pub fn pages(&self) -> &[PageState] {
        &self.pages
    }

    pub fn values(&self) -> &ValueSet {
        &self.values
    }

    pub fn document(&self) -> &DesignDocument {
        &self.doc
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn rebuild_views(&mut self) {
        for (page, state) in self.doc.pages.iter().zip(self.pages.iter_mut()) {
            state.views =
                build_page_views(page, &self.values, self.mode, state.metrics.intrinsic());
        }
    }

    /// Screen position → pad-local raster pixels for a signature field.
    fn pad_local(&self, page: usize, id: FieldId, x: f64, y: f64) -> Option<(f64, f64)> {
        let state = self.pages.get(page)?;
        let view = state.views.iter().find(|v| v.id == Some(id))?;
        let scale = state.metrics.scale();
        if scale <= 0.0 || view.frame.width <= 0.0 || view.frame.height <= 0.0 {
            return None;
        }
        let sx = x / scale - view.frame.x;
        let sy = y / scale - view.frame.y;
        Some((
            sx / view.frame.width * f64::from(PAD_WIDTH),
            sy / view.frame.height * f64::from(PAD_HEIGHT),
        ))
    }
}
