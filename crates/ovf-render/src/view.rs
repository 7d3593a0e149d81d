//! Field descriptor + current value + mode → renderable view.
//!
//! Each field resolves to exactly one control, dispatched on its kind.
//! Interactive mode yields editable controls carrying their current
//! effective value; static (print/export) mode yields text or image
//! echoes of the same value. The host materializes the controls and
//! routes edits back through the fill session's write path.

use kurbo::Point;
use ovf_core::FieldId;
use ovf_core::model::{Field, FieldKind, FieldValue, Page, ValueSet};
use ovf_core::scale::{PageSize, StageRect, stage_rect};

/// How a page is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Editable controls, change capture wired.
    Interactive,
    /// Read-only value echoes for print/export.
    Static,
}

/// Static rendering of a checked checkbox. Never the empty string.
pub const CHECKED_GLYPH: &str = "☑ 동의";
/// Static rendering of an unchecked checkbox. Never the empty string.
pub const UNCHECKED_GLYPH: &str = "☐ 미동의";

/// One entry in a radio group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioChoice {
    pub value: String,
    pub selected: bool,
}

/// The rendered control for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    TextInput {
        value: String,
    },
    Select {
        options: Vec<String>,
        selected: Option<String>,
    },
    Checkbox {
        checked: bool,
    },
    /// Mutually exclusive choices sharing the field's id as group key.
    RadioGroup {
        group: FieldId,
        choices: Vec<RadioChoice>,
    },
    /// Freehand drawing surface, pre-seeded with any prior data-URI.
    SignaturePad {
        initial: Option<String>,
    },
    /// Static echo of a value. May be empty for blank text fields.
    StaticText {
        text: String,
    },
    /// Static echo of a signature; `None` renders nothing.
    StaticImage {
        src: Option<String>,
    },
}

/// A field resolved against its effective value, positioned on the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub id: Option<FieldId>,
    pub kind: FieldKind,
    pub frame: StageRect,
    pub label: Option<String>,
    pub control: Control,
    // Presentation hints passed through to the painter.
    pub font_size: Option<f64>,
    pub color: Option<String>,
}

/// Resolve one field. The effective value is the persisted one if
/// present, else the design-time default, else type-appropriate empty.
pub fn build_field_view(
    field: &Field,
    values: &ValueSet,
    mode: RenderMode,
    page: PageSize,
) -> FieldView {
    let value = field.effective_value(values);
    let control = match mode {
        RenderMode::Static => static_control(field, value),
        RenderMode::Interactive => interactive_control(field, value),
    };
    FieldView {
        id: field.id,
        kind: field.kind,
        frame: stage_rect(field, page),
        label: field.label.clone(),
        control,
        font_size: field.font_size.as_ref().and_then(|d| d.as_px()),
        color: field.color.clone(),
    }
}

/// Resolve a whole page's fields, in document order.
pub fn build_page_views(
    page: &Page,
    values: &ValueSet,
    mode: RenderMode,
    size: PageSize,
) -> Vec<FieldView> {
    page.fields
        .iter()
        .map(|f| build_field_view(f, values, mode, size))
        .collect()
}

fn interactive_control(field: &Field, value: Option<&FieldValue>) -> Control {
    match field.kind {
        FieldKind::Select => Control::Select {
            options: field.options.to_vec(),
            selected: value.and_then(|v| v.as_str()).map(str::to_string),
        },
        FieldKind::Checkbox => Control::Checkbox {
            checked: value.is_some_and(|v| v.truthy()),
        },
        FieldKind::Radio => {
            let chosen = value.and_then(|v| v.as_str());
            Control::RadioGroup {
                // Render-only radios can't emit; group them under their label
                // text if no id was given.
                group: field
                    .id
                    .unwrap_or_else(|| FieldId::intern(&field.display_name())),
                choices: field
                    .options
                    .iter()
                    .map(|o| RadioChoice {
                        value: o.clone(),
                        selected: chosen == Some(o.as_str()),
                    })
                    .collect(),
            }
        }
        FieldKind::Signature => Control::SignaturePad {
            initial: value.and_then(|v| v.as_str()).map(str::to_string),
        },
        // `text` doubles as the structural fallback; unknown tags were
        // already degraded to it at deserialization.
        FieldKind::Text => Control::TextInput {
            value: value.map(|v| v.to_string()).unwrap_or_default(),
        },
    }
}

fn static_control(field: &Field, value: Option<&FieldValue>) -> Control {
    match field.kind {
        FieldKind::Checkbox => Control::StaticText {
            text: if value.is_some_and(|v| v.truthy()) {
                CHECKED_GLYPH.to_string()
            } else {
                UNCHECKED_GLYPH.to_string()
            },
        },
        FieldKind::Signature => Control::StaticImage {
            src: value.and_then(|v| v.as_str()).map(str::to_string),
        },
        _ => Control::StaticText {
            text: value.map(|v| v.to_string()).unwrap_or_default(),
        },
    }
}

/// Label anchor: just above the control's top-left corner, mirroring the
/// overlay styling the designs were authored against.
pub(crate) fn label_origin(frame: &StageRect) -> Point {
    Point::new(frame.x, frame.y - 16.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovf_core::model::DesignDocument;
    use ovf_core::scale::FALLBACK_PAGE;
    use pretty_assertions::assert_eq;

    fn field(json: &str) -> Field {
        let doc = DesignDocument::from_json_str(&format!(
            r#"{{"pages":[{{"bg":"","fields":[{json}]}}]}}"#
        ))
        .unwrap();
        doc.pages[0].fields[0].clone()
    }

    fn build(json: &str, values: &ValueSet, mode: RenderMode) -> FieldView {
        build_field_view(&field(json), values, mode, FALLBACK_PAGE)
    }

    #[test]
    fn checkbox_glyph_is_identical_for_persisted_and_default_truth() {
        let empty = ValueSet::new();
        let from_default = build(
            r#"{"id":"agree","type":"checkbox","value":true}"#,
            &empty,
            RenderMode::Static,
        );

        let mut values = ValueSet::new();
        values.insert(FieldId::intern("agree"), FieldValue::Bool(true));
        let from_persisted = build(
            r#"{"id":"agree","type":"checkbox"}"#,
            &values,
            RenderMode::Static,
        );

        assert_eq!(from_default.control, from_persisted.control);
        assert_eq!(
            from_default.control,
            Control::StaticText {
                text: CHECKED_GLYPH.into()
            }
        );
    }

    #[test]
    fn unchecked_checkbox_never_renders_empty() {
        let v = build(
            r#"{"id":"agree","type":"checkbox"}"#,
            &ValueSet::new(),
            RenderMode::Static,
        );
        assert_eq!(
            v.control,
            Control::StaticText {
                text: UNCHECKED_GLYPH.into()
            }
        );
    }

    #[test]
    fn select_preselects_persisted_value() {
        let mut values = ValueSet::new();
        values.insert(FieldId::intern("plan"), FieldValue::from("5G basic"));
        let v = build(
            r#"{"id":"plan","type":"select","options":["5G basic","5G premium"]}"#,
            &values,
            RenderMode::Interactive,
        );
        assert_eq!(
            v.control,
            Control::Select {
                options: vec!["5G basic".into(), "5G premium".into()],
                selected: Some("5G basic".into()),
            }
        );
    }

    #[test]
    fn radio_marks_exactly_the_chosen_option() {
        let mut values = ValueSet::new();
        values.insert(FieldId::intern("band"), FieldValue::from("adult"));
        let v = build(
            r#"{"id":"band","type":"radio","options":["teen","adult"]}"#,
            &values,
            RenderMode::Interactive,
        );
        match v.control {
            Control::RadioGroup { group, choices } => {
                assert_eq!(group, FieldId::intern("band"));
                assert_eq!(
                    choices,
                    vec![
                        RadioChoice {
                            value: "teen".into(),
                            selected: false
                        },
                        RadioChoice {
                            value: "adult".into(),
                            selected: true
                        },
                    ]
                );
            }
            other => panic!("expected RadioGroup, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_renders_as_editable_text() {
        let v = build(
            r#"{"id":"x","type":"slider","value":"7"}"#,
            &ValueSet::new(),
            RenderMode::Interactive,
        );
        assert_eq!(v.control, Control::TextInput { value: "7".into() });
    }

    #[test]
    fn signature_static_echoes_data_uri_or_nothing() {
        let mut values = ValueSet::new();
        values.insert(
            FieldId::intern("sign"),
            FieldValue::from("data:image/png;base64,AAAA"),
        );
        let with = build(
            r#"{"id":"sign","type":"signature"}"#,
            &values,
            RenderMode::Static,
        );
        assert_eq!(
            with.control,
            Control::StaticImage {
                src: Some("data:image/png;base64,AAAA".into())
            }
        );

        let without = build(
            r#"{"id":"sign","type":"signature"}"#,
            &ValueSet::new(),
            RenderMode::Static,
        );
        assert_eq!(without.control, Control::StaticImage { src: None });
    }
}
