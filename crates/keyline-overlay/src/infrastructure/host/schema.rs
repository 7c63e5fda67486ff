//! Settings property descriptors for the host UI.
//!
//! One function builds the whole schema for any [`Locale`]; only the display
//! strings differ between languages.  Descriptors serialise with
//! `serde_json` so a host can consume them directly.

use keyline_core::{
    domain::settings::{MAX_DIMENSION, MIN_DIMENSION},
    keymap::{key_name, KEY_OPTIONS},
    Locale, OverlaySettings, Row,
};
use serde::Serialize;

use super::settings::{row_color_id, row_enabled_id, row_key_id, row_suffix};

/// Display strings for one locale.
struct Strings {
    source_name: &'static str,
    width: &'static str,
    height: &'static str,
    bg_opacity: &'static str,
    bg_color: &'static str,
    key_prefix: &'static str,
    monitored_key: &'static str,
    row_color: &'static str,
    show_row: &'static str,
}

const EN_US: Strings = Strings {
    source_name: "Keyline Input Timeline",
    width: "Width",
    height: "Height",
    bg_opacity: "Background Opacity",
    bg_color: "Background Color",
    key_prefix: "Key",
    monitored_key: "Monitored Key",
    row_color: "Row Color",
    show_row: "Show Row",
};

const KO_KR: Strings = Strings {
    source_name: "Keyline 입력 타임라인",
    width: "너비",
    height: "높이",
    bg_opacity: "배경 불투명도",
    bg_color: "배경 색상",
    key_prefix: "키",
    monitored_key: "감시할 키",
    row_color: "행 색상",
    show_row: "행 표시",
};

fn strings(locale: Locale) -> &'static Strings {
    match locale {
        Locale::EnUs => &EN_US,
        Locale::KoKr => &KO_KR,
    }
}

/// One entry of an integer list property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListOption {
    pub label: &'static str,
    pub value: i64,
}

/// Widget type and constraints of a property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyKind {
    Int { min: i64, max: i64, step: i64 },
    FloatSlider { min: f64, max: f64, step: f64 },
    Color,
    Bool,
    IntList { options: Vec<ListOption> },
    Group { properties: Vec<PropertyDescriptor> },
}

/// One property shown in the host's settings dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    /// Settings key the property edits (or the group id).
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: PropertyKind,
}

impl PropertyDescriptor {
    fn new(id: impl Into<String>, label: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
        }
    }
}

/// Name of the source as shown by the host.
pub fn source_name(locale: Locale) -> &'static str {
    strings(locale).source_name
}

/// Title of a row's settings group, e.g. `"Key W"`.
pub fn group_title(locale: Locale, vk: u16) -> String {
    format!("{} {}", strings(locale).key_prefix, key_name(vk))
}

pub fn row_group_id(row: Row) -> String {
    format!("row_{}_group", row_suffix(row))
}

/// Builds the settings schema, titling each row group after its current key.
pub fn settings_schema(locale: Locale, settings: &OverlaySettings) -> Vec<PropertyDescriptor> {
    let s = strings(locale);
    let dim = PropertyKind::Int {
        min: i64::from(MIN_DIMENSION),
        max: i64::from(MAX_DIMENSION),
        step: 1,
    };

    let mut props = vec![
        PropertyDescriptor::new("width", s.width, dim.clone()),
        PropertyDescriptor::new("height", s.height, dim),
        PropertyDescriptor::new(
            "bg_alpha",
            s.bg_opacity,
            PropertyKind::FloatSlider {
                min: 0.0,
                max: 1.0,
                step: 0.01,
            },
        ),
        PropertyDescriptor::new("bg_color", s.bg_color, PropertyKind::Color),
    ];

    let key_options: Vec<ListOption> = KEY_OPTIONS
        .iter()
        .map(|o| ListOption {
            label: o.name,
            value: i64::from(o.vk),
        })
        .collect();

    for row in Row::ALL {
        let group = vec![
            PropertyDescriptor::new(
                row_key_id(row),
                s.monitored_key,
                PropertyKind::IntList {
                    options: key_options.clone(),
                },
            ),
            PropertyDescriptor::new(row_color_id(row), s.row_color, PropertyKind::Color),
            PropertyDescriptor::new(row_enabled_id(row), s.show_row, PropertyKind::Bool),
        ];
        props.push(PropertyDescriptor::new(
            row_group_id(row),
            group_title(locale, settings.row(row).key),
            PropertyKind::Group { properties: group },
        ));
    }

    props
}

/// Retitles the group that contains `key_property` after its key changed.
///
/// Returns `false` when `key_property` is not a row key property.
pub fn retitle_group(
    schema: &mut [PropertyDescriptor],
    locale: Locale,
    key_property: &str,
    vk: u16,
) -> bool {
    let Some(row) = Row::ALL.into_iter().find(|r| row_key_id(*r) == key_property) else {
        return false;
    };
    let group_id = row_group_id(row);
    match schema.iter_mut().find(|p| p.id == group_id) {
        Some(group) => {
            group.label = group_title(locale, vk);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyline_core::keymap::windows_vk;

    fn group<'a>(schema: &'a [PropertyDescriptor], id: &str) -> &'a PropertyDescriptor {
        schema.iter().find(|p| p.id == id).expect("group present")
    }

    #[test]
    fn test_schema_has_top_level_fields_and_four_row_groups() {
        let schema = settings_schema(Locale::EnUs, &OverlaySettings::default());

        let ids: Vec<&str> = schema.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "width",
                "height",
                "bg_alpha",
                "bg_color",
                "row_w_group",
                "row_s_group",
                "row_a_group",
                "row_d_group"
            ]
        );
        assert_eq!(
            schema[0].kind,
            PropertyKind::Int {
                min: 16,
                max: 16_384,
                step: 1
            }
        );
    }

    #[test]
    fn test_group_titles_follow_current_keys() {
        let mut settings = OverlaySettings::default();
        settings.row_mut(Row::S).key = windows_vk::VK_SPACE;

        let schema = settings_schema(Locale::EnUs, &settings);

        assert_eq!(group(&schema, "row_w_group").label, "Key W");
        assert_eq!(group(&schema, "row_s_group").label, "Key SPACE");
    }

    #[test]
    fn test_row_group_contains_key_list_color_and_toggle() {
        let schema = settings_schema(Locale::EnUs, &OverlaySettings::default());

        let PropertyKind::Group { properties } = &group(&schema, "row_a_group").kind else {
            panic!("row_a_group must be a group");
        };
        let ids: Vec<&str> = properties.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["row_a_key", "color_a", "row_a_enabled"]);
        let PropertyKind::IntList { options } = &properties[0].kind else {
            panic!("key property must be a list");
        };
        assert_eq!(options.len(), KEY_OPTIONS.len());
        assert_eq!(properties[2].label, "Show Row");
    }

    #[test]
    fn test_korean_locale_changes_only_strings() {
        let settings = OverlaySettings::default();

        let en = settings_schema(Locale::EnUs, &settings);
        let ko = settings_schema(Locale::KoKr, &settings);

        assert_eq!(en.len(), ko.len());
        assert_eq!(ko[0].label, "너비");
        assert_eq!(group(&ko, "row_d_group").label, "키 D");
        for (a, b) in en.iter().zip(&ko) {
            assert_eq!(a.id, b.id);
        }
    }

    #[test]
    fn test_retitle_group_after_key_change() {
        let mut schema = settings_schema(Locale::EnUs, &OverlaySettings::default());

        let changed = retitle_group(&mut schema, Locale::EnUs, "row_d_key", windows_vk::VK_RIGHT);
        let unrelated = retitle_group(&mut schema, Locale::EnUs, "bg_color", 0);

        assert!(changed);
        assert!(!unrelated);
        assert_eq!(group(&schema, "row_d_group").label, "Key RIGHT ARROW");
    }

    #[test]
    fn test_schema_serialises_with_type_tags() {
        let schema = settings_schema(Locale::EnUs, &OverlaySettings::default());

        let json = serde_json::to_value(&schema).expect("serialise");

        assert_eq!(json[2]["type"], "float_slider");
        assert_eq!(json[2]["id"], "bg_alpha");
        assert_eq!(json[4]["type"], "group");
        assert_eq!(json[4]["properties"][0]["type"], "int_list");
    }

    #[test]
    fn test_source_name_is_localised() {
        assert_eq!(source_name(Locale::EnUs), "Keyline Input Timeline");
        assert_ne!(source_name(Locale::KoKr), source_name(Locale::EnUs));
    }
}
