//! Per-variable metadata extraction and stringification.
//!
//! Every compared field is coerced to a canonical string form first, so the
//! comparison itself is plain string equality and a missing variable is a
//! set of empty strings rather than a null.

use std::collections::BTreeMap;
use std::fmt;

use nc_compare_align::align;
use nc_compare_container::{AttrValue, ContainerAccess, ContainerError};

/// Sentinel for a scale factor that is absent on one side; distinguishes
/// "absent" from an explicit empty value.
pub const SCALE_FACTOR_ABSENT: &str = " ";

/// Array-valued attributes show only their first elements; differences past
/// this point are invisible to the comparison. Lossy on purpose.
const ATTRIBUTE_PREVIEW_LEN: usize = 5;

/// Comparable string forms of one variable's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableProperties {
    pub name: String,
    pub dtype: String,
    /// Dimension names as a tuple string, e.g. `('x', 'y')`.
    pub dimensions: String,
    /// Shape as a tuple string, e.g. `(2, 8)`.
    pub shape: String,
    /// Chunk sizes as a tuple string, or `contiguous`.
    pub chunking: String,
    /// Stringified scale factor, or [`SCALE_FACTOR_ABSENT`].
    pub scale_factor: String,
    pub attributes: BTreeMap<String, String>,
}

impl VariableProperties {
    /// Placeholder for a variable absent on one side: every field is an
    /// empty string, so each property row classifies as one-sided.
    pub fn missing() -> Self {
        VariableProperties {
            name: String::new(),
            dtype: String::new(),
            dimensions: String::new(),
            shape: String::new(),
            chunking: String::new(),
            scale_factor: SCALE_FACTOR_ABSENT.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    /// Extract and stringify the metadata of one variable.
    pub fn from_container(
        access: &dyn ContainerAccess,
        group_path: &str,
        name: &str,
    ) -> Result<Self, ContainerError> {
        let meta = access.variable_meta(group_path, name)?;

        let dimension_names: Vec<String> = meta
            .dimension_names
            .iter()
            .map(|name| format!("'{name}'"))
            .collect();
        let chunking = match &meta.chunking {
            Some(chunks) => tuple_string(chunks),
            None => "contiguous".to_string(),
        };
        let scale_factor = match meta.scale_factor {
            Some(value) => value.to_string(),
            None => SCALE_FACTOR_ABSENT.to_string(),
        };
        let attributes = meta
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), attribute_value_string(value)))
            .collect();

        Ok(VariableProperties {
            name: name.to_string(),
            dtype: meta.dtype,
            dimensions: tuple_string(&dimension_names),
            shape: tuple_string(&meta.shape),
            chunking,
            scale_factor,
            attributes,
        })
    }
}

/// Align two attribute maps by name, yielding `(name, value_a, value_b)`
/// with an empty string for the side lacking the attribute.
pub fn attribute_pairs(
    a: &VariableProperties,
    b: &VariableProperties,
) -> Vec<(String, String, String)> {
    let names_a: Vec<String> = a.attributes.keys().cloned().collect();
    let names_b: Vec<String> = b.attributes.keys().cloned().collect();
    align(names_a, names_b)
        .into_iter()
        .map(|pair| {
            let name = pair.name().to_string();
            let value_a = a.attributes.get(&name).cloned().unwrap_or_default();
            let value_b = b.attributes.get(&name).cloned().unwrap_or_default();
            (name, value_a, value_b)
        })
        .collect()
}

/// The scale-factor row, surfaced only when at least one side carries a
/// non-default value.
pub fn scale_factor_pair(
    a: &VariableProperties,
    b: &VariableProperties,
) -> Option<(String, String)> {
    if a.scale_factor == SCALE_FACTOR_ABSENT && b.scale_factor == SCALE_FACTOR_ABSENT {
        None
    } else {
        Some((a.scale_factor.clone(), b.scale_factor.clone()))
    }
}

/// Canonical string form of one attribute value.
///
/// Array values are previewed: the first [`ATTRIBUTE_PREVIEW_LEN`] elements
/// followed by an ellipsis marker, regardless of the array's length.
pub fn attribute_value_string(value: &AttrValue) -> String {
    match value {
        AttrValue::Str(text) => text.clone(),
        AttrValue::Int(number) => number.to_string(),
        AttrValue::Float(number) => number.to_string(),
        AttrValue::Ints(items) => array_preview(items),
        AttrValue::Floats(items) => array_preview(items),
        AttrValue::Strs(items) => array_preview(items),
        AttrValue::Unreadable(reason) => format!("<unreadable: {reason}>"),
    }
}

fn array_preview<T: fmt::Display>(items: &[T]) -> String {
    let shown: Vec<String> = items
        .iter()
        .take(ATTRIBUTE_PREVIEW_LEN)
        .map(ToString::to_string)
        .collect();
    format!("[{}, ...]", shown.join(", "))
}

/// Tuple-style rendering: `()`, `(2,)`, `(2, 8)`.
fn tuple_string<T: fmt::Display>(items: &[T]) -> String {
    match items.len() {
        0 => "()".to_string(),
        1 => format!("({},)", items[0]),
        _ => {
            let joined: Vec<String> = items.iter().map(ToString::to_string).collect();
            format!("({})", joined.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryContainer;
    use nc_compare_container::VariableMeta;

    #[test]
    fn test_tuple_string_forms() {
        assert_eq!(tuple_string::<usize>(&[]), "()");
        assert_eq!(tuple_string(&[2]), "(2,)");
        assert_eq!(tuple_string(&[2, 8]), "(2, 8)");
    }

    #[test]
    fn test_missing_variable_is_all_empty_strings() {
        let props = VariableProperties::missing();
        assert_eq!(props.dtype, "");
        assert_eq!(props.shape, "");
        assert_eq!(props.scale_factor, SCALE_FACTOR_ABSENT);
        assert!(props.attributes.is_empty());
    }

    #[test]
    fn test_array_attributes_truncate_past_fifth_element() {
        // Two 7-element arrays equal in their first five elements compare
        // equal after stringification; the tail is invisible on purpose.
        let a = AttrValue::Ints(vec![1, 2, 3, 4, 5, 6, 7]);
        let b = AttrValue::Ints(vec![1, 2, 3, 4, 5, 60, 70]);
        assert_eq!(attribute_value_string(&a), "[1, 2, 3, 4, 5, ...]");
        assert_eq!(attribute_value_string(&a), attribute_value_string(&b));

        // Short arrays still carry the marker.
        let short = AttrValue::Floats(vec![0.5]);
        assert_eq!(attribute_value_string(&short), "[0.5, ...]");
    }

    #[test]
    fn test_unreadable_attribute_becomes_placeholder() {
        let value = AttrValue::Unreadable("type not supported".to_string());
        assert_eq!(
            attribute_value_string(&value),
            "<unreadable: type not supported>"
        );
    }

    #[test]
    fn test_scale_factor_row_surfaces_only_when_set() {
        let mut a = VariableProperties::missing();
        let b = VariableProperties::missing();
        assert_eq!(scale_factor_pair(&a, &b), None);

        a.scale_factor = "0.01".to_string();
        assert_eq!(
            scale_factor_pair(&a, &b),
            Some(("0.01".to_string(), " ".to_string()))
        );
    }

    #[test]
    fn test_from_container_stringifies_metadata() {
        let file = MemoryContainer::new().with_variable(
            "",
            VariableMeta {
                name: "z1".to_string(),
                dtype: "f64".to_string(),
                dimension_names: vec!["y".to_string(), "x".to_string()],
                shape: vec![2, 8],
                chunking: Some(vec![1, 8]),
                scale_factor: None,
                attributes: vec![("units".to_string(), AttrValue::Str("m".to_string()))],
            },
        );

        let props = VariableProperties::from_container(&file, "", "z1").unwrap();
        assert_eq!(props.dtype, "f64");
        assert_eq!(props.dimensions, "('y', 'x')");
        assert_eq!(props.shape, "(2, 8)");
        assert_eq!(props.chunking, "(1, 8)");
        assert_eq!(props.scale_factor, SCALE_FACTOR_ABSENT);
        assert_eq!(props.attributes.get("units").unwrap(), "m");
    }

    #[test]
    fn test_attribute_pairs_align_by_name() {
        let mut a = VariableProperties::missing();
        let mut b = VariableProperties::missing();
        a.attributes.insert("units".to_string(), "m".to_string());
        a.attributes.insert("long_name".to_string(), "height".to_string());
        b.attributes.insert("units".to_string(), "km".to_string());

        let pairs = attribute_pairs(&a, &b);
        assert_eq!(
            pairs,
            vec![
                (
                    "long_name".to_string(),
                    "height".to_string(),
                    String::new()
                ),
                ("units".to_string(), "m".to_string(), "km".to_string()),
            ]
        );
    }
}
