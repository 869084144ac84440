//! The field registry.
//!
//! Every searchable field is a [`Field`] variant carrying a static
//! [`FieldRule`]. The rule is the only place that knows a field's wire name,
//! list encoding and operator side effects; adding a searchable field means
//! adding a variant and a rule, never touching the translator.

use std::{collections::BTreeSet, fmt, str::FromStr};

use super::{
    QueryError, Result,
    value::{Operator, ParamValue, ValueShape},
};
use crate::wire::{WireParameterSet, WireValue};

/// Inward nudge applied to every bounding-box edge. The Pleiades
/// intersection predicate excludes places lying exactly on the boundary.
pub const BBOX_EPSILON: f64 = 0.0001;

/// How a list value is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListBehavior {
    /// Join items into one string, separated by the operator (or a space).
    Join,
    /// Keep the list as is; the encoder repeats the key once per item.
    NoSeq,
}

/// An extra wire parameter emitted when a list is combined with `operator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSideEffect {
    pub operator: Operator,
    pub key: &'static str,
    pub value: &'static str,
}

/// Turns a raw value straight into wire parameters, bypassing list handling.
pub type Preprocessor = fn(&ParamValue) -> Result<WireParameterSet>;

/// Validation and encoding rule for one logical field.
///
/// When `list_behavior` is `None`, list values are comma-joined and the wire
/// key gets a `:list` suffix.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub expected: &'static [ValueShape],
    pub wire_name: Option<&'static str>,
    pub list_behavior: Option<ListBehavior>,
    pub operator_side_effects: &'static [OperatorSideEffect],
    pub preprocessor: Option<Preprocessor>,
}

impl FieldRule {
    #[must_use]
    pub fn accepts(&self, shape: ValueShape) -> bool {
        self.expected.contains(&shape)
    }

    pub fn side_effects_for(
        &self,
        operator: Operator,
    ) -> impl Iterator<Item = &'static OperatorSideEffect> {
        self.operator_side_effects
            .iter()
            .filter(move |effect| effect.operator == operator)
    }

    /// Translate one value into its wire parameters.
    ///
    /// `field_name` is the wire key used when the rule does not rename the
    /// field. Preprocessors receive the value alone; the operator only
    /// matters for list values.
    pub fn translate(
        &self,
        field_name: &str,
        value: &ParamValue,
        operator: Option<Operator>,
    ) -> Result<WireParameterSet> {
        if let Some(preprocess) = self.preprocessor {
            return preprocess(value);
        }

        let mut wire_key = self.wire_name.unwrap_or(field_name).to_string();
        let mut params = WireParameterSet::new();

        let wire_value = match value {
            ParamValue::Scalar(text) => WireValue::Single(text.clone()),
            ParamValue::List(items) => {
                let list_value = match self.list_behavior {
                    Some(ListBehavior::Join) => {
                        let separator = operator
                            .map_or_else(|| " ".to_string(), |op| format!(" {op} "));
                        WireValue::Single(items.join(&separator))
                    }
                    Some(ListBehavior::NoSeq) => WireValue::Multi(items.clone()),
                    None => {
                        wire_key.push_str(":list");
                        WireValue::Single(items.join(","))
                    }
                };
                if let Some(op) = operator {
                    for effect in self.side_effects_for(op) {
                        params.insert(effect.key, effect.value);
                    }
                }
                list_value
            }
            ParamValue::Bounds(_) => {
                return Err(QueryError::UnsupportedValueShape {
                    field: field_name.to_string(),
                    shape: value.shape(),
                });
            }
        };

        params.insert(wire_key, wire_value);
        Ok(params)
    }
}

const SCALAR_OR_LIST: &[ValueShape] = &[ValueShape::Scalar, ValueShape::List];

static BBOX_RULE: FieldRule = FieldRule {
    expected: &[ValueShape::Bounds],
    wire_name: None,
    list_behavior: None,
    operator_side_effects: &[],
    preprocessor: Some(preprocess_bbox),
};

static DESCRIPTION_RULE: FieldRule = FieldRule {
    expected: SCALAR_OR_LIST,
    wire_name: Some("Description"),
    list_behavior: Some(ListBehavior::Join),
    operator_side_effects: &[],
    preprocessor: None,
};

static FEATURE_TYPE_RULE: FieldRule = FieldRule {
    expected: SCALAR_OR_LIST,
    wire_name: Some("getFeatureType"),
    list_behavior: Some(ListBehavior::NoSeq),
    operator_side_effects: &[OperatorSideEffect {
        operator: Operator::And,
        key: "get_usage:ignore_empty",
        value: "operator:and",
    }],
    preprocessor: None,
};

static TAG_RULE: FieldRule = FieldRule {
    expected: SCALAR_OR_LIST,
    wire_name: Some("Subject:list"),
    list_behavior: Some(ListBehavior::NoSeq),
    operator_side_effects: &[OperatorSideEffect {
        operator: Operator::And,
        key: "Subject_usage:ignore_empty",
        value: "operator:and",
    }],
    preprocessor: None,
};

static TEXT_RULE: FieldRule = FieldRule {
    expected: SCALAR_OR_LIST,
    wire_name: Some("SearchableText"),
    list_behavior: Some(ListBehavior::Join),
    operator_side_effects: &[],
    preprocessor: None,
};

static TITLE_RULE: FieldRule = FieldRule {
    expected: &[ValueShape::Scalar],
    wire_name: Some("Title"),
    list_behavior: None,
    operator_side_effects: &[],
    preprocessor: None,
};

/// A searchable field of the Pleiades search endpoint.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Bbox,
    Description,
    FeatureType,
    Tag,
    Text,
    Title,
}

impl Field {
    pub const ALL: [Self; 6] = [
        Self::Bbox,
        Self::Description,
        Self::FeatureType,
        Self::Tag,
        Self::Text,
        Self::Title,
    ];

    /// The logical name callers use with [`crate::Query::set_parameter`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bbox => "bbox",
            Self::Description => "description",
            Self::FeatureType => "feature_type",
            Self::Tag => "tag",
            Self::Text => "text",
            Self::Title => "title",
        }
    }

    #[must_use]
    pub fn rule(self) -> &'static FieldRule {
        match self {
            Self::Bbox => &BBOX_RULE,
            Self::Description => &DESCRIPTION_RULE,
            Self::FeatureType => &FEATURE_TYPE_RULE,
            Self::Tag => &TAG_RULE,
            Self::Text => &TEXT_RULE,
            Self::Title => &TITLE_RULE,
        }
    }

    /// Wire keys whose list values are sent as repeated parameters.
    pub fn repeated_wire_keys() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().filter_map(|field| {
            let rule = field.rule();
            (rule.list_behavior == Some(ListBehavior::NoSeq))
                .then(|| rule.wire_name.unwrap_or(field.name()))
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = QueryError;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| QueryError::UnknownField {
                name: name.to_string(),
                supported: list_supported_fields().into_iter().collect(),
            })
    }
}

/// Names of every supported field, sorted.
#[must_use]
pub fn list_supported_fields() -> BTreeSet<&'static str> {
    Field::ALL.into_iter().map(Field::name).collect()
}

/// Look up the rule for a logical field name.
pub fn rule_for(name: &str) -> Result<&'static FieldRule> {
    name.parse::<Field>().map(Field::rule)
}

/// Translate a stored value for `field` into wire parameters.
pub fn translate(
    field: Field,
    value: &ParamValue,
    operator: Option<Operator>,
) -> Result<WireParameterSet> {
    field.rule().translate(field.name(), value, operator)
}

fn preprocess_bbox(value: &ParamValue) -> Result<WireParameterSet> {
    let ParamValue::Bounds(bounds) = value else {
        return Err(QueryError::UnsupportedValueShape {
            field: Field::Bbox.name().to_string(),
            shape: value.shape(),
        });
    };
    let shaved = bounds.shaved(BBOX_EPSILON);

    let mut params = WireParameterSet::new();
    params.insert(
        "lowerLeft",
        format!(
            "{},{}",
            format_coordinate(shaved.min_lon()),
            format_coordinate(shaved.min_lat())
        ),
    );
    params.insert(
        "upperRight",
        format!(
            "{},{}",
            format_coordinate(shaved.max_lon()),
            format_coordinate(shaved.max_lat())
        ),
    );
    params.insert("predicate", "intersection");
    params.insert("location_precision:list", "precise");
    Ok(params)
}

/// Shortest round-trip decimal, always with a fractional part (`36` -> `36.0`).
fn format_coordinate(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}
