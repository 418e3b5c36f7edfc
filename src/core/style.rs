//! Style objects whose fields may depend on the datum and its active state.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::types::Datum;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleScalar {
    Number(f64),
    Text(String),
}

impl StyleScalar {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().trim_end_matches("px").parse().ok(),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }
}

pub type StyleFn = dyn Fn(&Datum, bool) -> StyleScalar + Send + Sync;

#[derive(Clone)]
pub enum StyleValue {
    Number(f64),
    Text(String),
    /// Evaluated per datum; the flag is the datum's active state.
    Computed(Arc<StyleFn>),
}

impl fmt::Debug for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => f.debug_tuple("Number").field(value).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Ordered set of style properties.
#[derive(Debug, Clone, Default)]
pub struct StyleSpec {
    properties: IndexMap<String, StyleValue>,
}

impl StyleSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_computed<F>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&Datum, bool) -> StyleScalar + Send + Sync + 'static,
    {
        self.properties
            .insert(name.into(), StyleValue::Computed(Arc::new(compute)));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A style with every computed field resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedStyle(IndexMap<String, StyleScalar>);

impl ResolvedStyle {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StyleScalar> {
        self.0.get(name)
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(StyleScalar::as_number)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleScalar)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

#[must_use]
pub fn evaluate_style(spec: &StyleSpec, datum: &Datum, active: bool) -> ResolvedStyle {
    ResolvedStyle(
        spec.properties
            .iter()
            .map(|(name, value)| {
                let resolved = match value {
                    StyleValue::Number(number) => StyleScalar::Number(*number),
                    StyleValue::Text(text) => StyleScalar::Text(text.clone()),
                    StyleValue::Computed(compute) => compute(datum, active),
                };
                (name.clone(), resolved)
            })
            .collect(),
    )
}
