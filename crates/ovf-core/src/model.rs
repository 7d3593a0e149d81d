//! Core data model for OVF design documents.
//!
//! A design document is pure data: an ordered list of pages, each with a
//! background image reference and an ordered list of positioned fields.
//! Fields are anchored by percentage offsets relative to the page surface.
//! Everything with behavior — scale, persistence, rules, validation —
//! lives in sibling modules and consumes this model read-only.

use crate::error::DocumentError;
use crate::id::FieldId;
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::fmt;

// ─── Field kinds ─────────────────────────────────────────────────────────

/// The closed set of renderable field kinds.
///
/// Unknown tags in a design document deserialize to [`FieldKind::Text`]
/// rather than failing, so documents written for newer clients still fill
/// on older ones. The degradation is logged, never surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Select,
    Checkbox,
    Radio,
    Signature,
}

impl FieldKind {
    /// Map a raw tag to a kind, degrading unknown tags to `Text`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "select" => Self::Select,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "signature" => Self::Signature,
            other => {
                log::warn!("unknown field type `{other}`, rendering as text");
                Self::Text
            }
        }
    }
}

fn lenient_kind<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FieldKind, D::Error> {
    // Non-string values degrade the same way unknown tags do.
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw {
        serde_json::Value::String(tag) => FieldKind::from_tag(&tag),
        _ => FieldKind::Text,
    })
}

// ─── Field values ────────────────────────────────────────────────────────

/// A captured field value: text (including signature data-URIs) or a
/// checkbox boolean. Numbers are accepted on read for compatibility with
/// autosave sets written by hosts that stored fees numerically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Build a text value from an integer (fee writes).
    pub fn int(n: i64) -> Self {
        Self::Text(n.to_string())
    }

    /// Checkbox semantics: is this value "checked"?
    pub fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Non-checkbox semantics: is this value empty after trimming?
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// The persisted value set: field id → captured value.
pub type ValueSet = HashMap<FieldId, FieldValue>;

// ─── Presentation hints ──────────────────────────────────────────────────

/// A dimension hint: a bare number means pixels, a string is passed
/// through (`"auto"`, `"1.2em"`, …). Opaque to all logic except sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dim {
    Px(f64),
    Raw(String),
}

impl Dim {
    /// Resolve to pixels if the hint is numeric (or a string with a
    /// leading number, e.g. `"80px"`). `"auto"` and friends yield `None`.
    pub fn as_px(&self) -> Option<f64> {
        match self {
            Self::Px(v) => Some(*v),
            Self::Raw(s) => {
                let digits: String = s
                    .trim()
                    .chars()
                    .take_while(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                digits.parse().ok()
            }
        }
    }
}

// ─── Fields & pages ──────────────────────────────────────────────────────

fn default_width() -> f64 {
    24.0
}

fn id_empty_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<FieldId>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| FieldId::intern(&s)))
}

/// One positioned input field on a page.
///
/// `x`, `y`, `w` are percentages of the page surface. Fields without an
/// `id` are render-only: they never persist, never validate, never emit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    #[serde(default, deserialize_with = "id_empty_as_none")]
    pub id: Option<FieldId>,

    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: FieldKind,

    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_width")]
    pub w: f64,

    /// Caption rendered above the control.
    #[serde(default)]
    pub label: Option<String>,

    /// Choices for `select` / `radio` kinds, in display order.
    #[serde(default)]
    pub options: SmallVec<[String; 4]>,

    /// Design-time default, used only when no persisted value exists.
    #[serde(default)]
    pub value: Option<FieldValue>,

    #[serde(default)]
    pub required: bool,

    // Presentation hints, opaque to logic.
    #[serde(rename = "fontSize", default)]
    pub font_size: Option<Dim>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "inputHeight", default)]
    pub input_height: Option<Dim>,
}

impl Field {
    /// The field's current effective value: persisted if present, else the
    /// design-time default. `None` means type-appropriate empty.
    pub fn effective_value<'a>(&'a self, values: &'a ValueSet) -> Option<&'a FieldValue> {
        self.id
            .and_then(|id| values.get(&id))
            .or(self.value.as_ref())
    }

    /// Fallback display name for validation reports.
    pub fn display_name(&self) -> String {
        self.label
            .clone()
            .or_else(|| self.id.map(|id| id.as_str().to_string()))
            .unwrap_or_default()
    }
}

/// One page: a background image plus its overlay fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Background image reference (URI). Intrinsic pixel dimensions are
    /// discovered asynchronously by the host; see [`crate::scale`].
    #[serde(rename = "bg", alias = "background", default)]
    pub bg: String,

    #[serde(default)]
    pub fields: Vec<Field>,
}

// ─── Design document ─────────────────────────────────────────────────────

/// The complete design document: an ordered, non-empty sequence of pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignDocument {
    pub pages: Vec<Page>,
}

impl DesignDocument {
    /// Parse and validate a design document from raw JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_str(raw)?;
        doc.check_integrity()?;
        Ok(doc)
    }

    /// Validate an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_value(value)?;
        doc.check_integrity()?;
        Ok(doc)
    }

    /// Shape checks that gate rendering: at least one page, and no field
    /// id claimed twice across the flattened field set. Per-field defects
    /// (bad kinds, missing options) surface later as defaulted behavior.
    fn check_integrity(&self) -> Result<(), DocumentError> {
        if self.pages.is_empty() {
            return Err(DocumentError::NoPages);
        }
        let mut seen: HashSet<FieldId> = HashSet::new();
        for field in self.fields() {
            if let Some(id) = field.id
                && !seen.insert(id)
            {
                return Err(DocumentError::DuplicateFieldId {
                    id: id.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    /// All fields across all pages, in document order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.pages.iter().flat_map(|p| p.fields.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn minimal_document_loads() {
        let doc = DesignDocument::from_json_str(
            r#"{"pages":[{"bg":"p1.png","fields":[{"id":"name","type":"text","x":10,"y":20}]}]}"#,
        )
        .unwrap();
        assert_eq!(doc.pages.len(), 1);
        let f = &doc.pages[0].fields[0];
        assert_eq!(f.id, Some(FieldId::intern("name")));
        assert_eq!(f.kind, FieldKind::Text);
        assert_eq!(f.w, 24.0); // default width
    }

    #[test]
    fn missing_pages_is_fatal() {
        assert!(matches!(
            DesignDocument::from_json_str(r#"{"pages":[]}"#),
            Err(DocumentError::NoPages)
        ));
        assert!(DesignDocument::from_json_str(r#"{"title":"x"}"#).is_err());
    }

    #[test]
    fn unknown_kind_degrades_to_text() {
        let doc = DesignDocument::from_json_str(
            r#"{"pages":[{"bg":"","fields":[{"id":"a","type":"slider"}]}]}"#,
        )
        .unwrap();
        assert_eq!(doc.pages[0].fields[0].kind, FieldKind::Text);
    }

    #[test]
    fn duplicate_id_across_pages_rejected() {
        let raw = r#"{"pages":[
            {"bg":"1.png","fields":[{"id":"name"}]},
            {"bg":"2.png","fields":[{"id":"name"}]}
        ]}"#;
        assert!(matches!(
            DesignDocument::from_json_str(raw),
            Err(DocumentError::DuplicateFieldId { id }) if id == "name"
        ));
    }

    #[test]
    fn empty_id_means_render_only() {
        let doc =
            DesignDocument::from_json_str(r#"{"pages":[{"bg":"","fields":[{"id":"  "}]}]}"#)
                .unwrap();
        assert_eq!(doc.pages[0].fields[0].id, None);
    }

    #[test]
    fn effective_value_prefers_persisted() {
        let doc = DesignDocument::from_json_str(
            r#"{"pages":[{"bg":"","fields":[{"id":"city","value":"Seoul"}]}]}"#,
        )
        .unwrap();
        let field = &doc.pages[0].fields[0];

        let empty = ValueSet::new();
        assert_eq!(
            field.effective_value(&empty),
            Some(&FieldValue::Text("Seoul".into()))
        );

        let mut values = ValueSet::new();
        values.insert(FieldId::intern("city"), FieldValue::Text("Busan".into()));
        assert_eq!(
            field.effective_value(&values),
            Some(&FieldValue::Text("Busan".into()))
        );
    }

    #[test]
    fn dim_hint_parsing() {
        assert_eq!(Dim::Px(80.0).as_px(), Some(80.0));
        assert_eq!(Dim::Raw("80px".into()).as_px(), Some(80.0));
        assert_eq!(Dim::Raw("auto".into()).as_px(), None);
    }

    #[test]
    fn value_truthiness_and_blankness() {
        assert!(FieldValue::Bool(true).truthy());
        assert!(!FieldValue::Bool(false).truthy());
        assert!(FieldValue::Text("x".into()).truthy());
        assert!(FieldValue::Text("  ".into()).is_blank());
        assert!(!FieldValue::Number(40000.0).is_blank());
        assert_eq!(FieldValue::int(40000), FieldValue::Text("40000".into()));
    }
}
