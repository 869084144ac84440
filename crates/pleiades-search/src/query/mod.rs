//! Query construction and compilation to Pleiades wire parameters.
//!
//! A [`Query`] accumulates validated field constraints. Reading
//! [`Query::parameters_for_web`] compiles them, through each field's
//! [`FieldRule`], into the flat parameter set the `search_rss` endpoint
//! understands.

pub use error::{QueryError, Result};
mod fields;
mod value;

use std::collections::BTreeMap;

use pleiades_search_web::normtext;
use tracing::{debug, warn};

pub use fields::{
    BBOX_EPSILON, Field, FieldRule, ListBehavior, OperatorSideEffect, Preprocessor,
    list_supported_fields, rule_for, translate,
};
pub use value::{BoundingBox, Operator, ParamValue, ValueShape};

use crate::wire::{MergePolicy, WireParameterSet};

/// Parameters sent with every search: only published places.
pub const DEFAULT_WEB_PARAMETERS: [(&str, &str); 2] = [
    ("portal_type:list", "Place"),
    ("review_state:list", "published"),
];

/// The fixed parameters every compiled query starts from.
#[must_use]
pub fn default_web_parameters() -> WireParameterSet {
    DEFAULT_WEB_PARAMETERS.into_iter().collect()
}

/// A stored field constraint.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    pub value: ParamValue,
    pub operator: Option<Operator>,
}

/// A set of search constraints, keyed by field.
///
/// ```rust
/// use pleiades_search::{Operator, Query};
///
/// let mut query = Query::new();
/// query.set_parameter("text", ["Zucchabar", "Miliana"], Some(Operator::And))?;
///
/// let params = query.parameters_for_web()?;
/// assert_eq!(params.get_str("SearchableText"), Some("Zucchabar AND Miliana"));
/// assert_eq!(params.get_str("portal_type:list"), Some("Place"));
/// # Ok::<(), pleiades_search::QueryError>(())
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    parameters: BTreeMap<Field, QueryParameter>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the fields a query accepts.
    #[must_use]
    pub fn supported(&self) -> Vec<&'static str> {
        list_supported_fields().into_iter().collect()
    }

    /// Set a field by its logical name, replacing any earlier value.
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: impl Into<ParamValue>,
        operator: Option<Operator>,
    ) -> Result<()> {
        let field = name.parse::<Field>()?;
        self.set(field, value, operator)
    }

    /// Set a field, replacing any earlier value.
    ///
    /// Scalar values are whitespace-normalised before storage. A value of the
    /// wrong shape is rejected and leaves the stored parameters untouched.
    pub fn set(
        &mut self,
        field: Field,
        value: impl Into<ParamValue>,
        operator: Option<Operator>,
    ) -> Result<()> {
        let value = value.into();
        let rule = field.rule();
        if !rule.accepts(value.shape()) {
            return Err(QueryError::InvalidValueType {
                field: field.name(),
                provided: value.shape(),
                expected: rule.expected.to_vec(),
            });
        }

        let value = match value {
            ParamValue::Scalar(text) => ParamValue::Scalar(normtext(&text)),
            other => other,
        };
        debug!(field = %field, ?value, ?operator, "Setting query parameter");
        self.parameters
            .insert(field, QueryParameter { value, operator });
        Ok(())
    }

    #[must_use]
    pub fn parameter(&self, field: Field) -> Option<&QueryParameter> {
        self.parameters.get(&field)
    }

    pub fn parameters(&self) -> impl Iterator<Item = (Field, &QueryParameter)> {
        self.parameters.iter().map(|(field, param)| (*field, param))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Remove every constraint.
    pub fn clear_parameters(&mut self) {
        self.parameters.clear();
    }

    /// Compile the query into wire parameters.
    ///
    /// Computed fresh on every call. Translated parameters are merged over
    /// [`default_web_parameters`] with [`MergePolicy::Overwrite`], so a field
    /// whose wire key collides with a default replaces it.
    pub fn parameters_for_web(&self) -> Result<WireParameterSet> {
        let mut params = default_web_parameters();
        let defaults = params.clone();

        for (field, param) in &self.parameters {
            let translated = translate(*field, &param.value, param.operator)?;
            for key in params.merge(translated, MergePolicy::Overwrite) {
                if defaults.contains_key(&key) {
                    warn!(
                        field = %field,
                        key = %key,
                        "Query parameter overrides a default web parameter"
                    );
                }
            }
        }
        Ok(params)
    }
}

mod error {
    use itertools::Itertools;
    use thiserror::Error;

    use super::ValueShape;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum QueryError {
        #[error("Unexpected parameter name '{name}'. Supported parameters: {supported:?}.")]
        UnknownField {
            name: String,
            supported: Vec<&'static str>,
        },
        #[error(
            "Unexpected type {provided} for parameter '{field}'. Expected type(s): {}.",
            .expected.iter().join(" or ")
        )]
        InvalidValueType {
            field: &'static str,
            provided: ValueShape,
            expected: Vec<ValueShape>,
        },
        #[error("Cannot translate a {shape} value for parameter '{field}'")]
        UnsupportedValueShape { field: String, shape: ValueShape },
        #[error("Invalid bounding box: {0}")]
        InvalidBounds(String),
        #[error("Unknown operator '{0}'. Expected one of AND, OR, NOT.")]
        InvalidOperator(String),
    }

    pub type Result<T> = std::result::Result<T, QueryError>;
}
