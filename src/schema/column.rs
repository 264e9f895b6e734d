use serde::{Deserialize, Serialize};

/// Value type a column is coerced into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredType {
    Int,
    Float,
    #[serde(alias = "str")]
    String,
}

impl DeclaredType {
    /// Type applied when a column does not declare one
    pub const DEFAULT: DeclaredType = DeclaredType::Int;

    pub fn is_numeric(&self) -> bool {
        matches!(self, DeclaredType::Int | DeclaredType::Float)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DeclaredType::Int => "int",
            DeclaredType::Float => "float",
            DeclaredType::String => "str",
        }
    }
}

/// Semantic contract for a single column of a weather file
///
/// `key` is the positional column key used inside a table, `name` is the
/// descriptive name used in quality reports. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, rename = "dtype")]
    pub declared_type: Option<DeclaredType>,
    #[serde(default, rename = "error_value")]
    pub error_sentinel: Option<f64>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
}

impl ColumnSchema {
    /// Create a column whose key and descriptive name are the same
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: name.clone(),
            name,
            unit: unit.into(),
            declared_type: None,
            error_sentinel: None,
            min_value: None,
            max_value: None,
        }
    }

    pub fn with_type(mut self, declared_type: DeclaredType) -> Self {
        self.declared_type = Some(declared_type);
        self
    }

    pub fn with_sentinel(mut self, sentinel: f64) -> Self {
        self.error_sentinel = Some(sentinel);
        self
    }

    pub fn with_min(mut self, min_value: f64) -> Self {
        self.min_value = Some(min_value);
        self
    }

    pub fn with_max(mut self, max_value: f64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    pub fn with_range(self, min_value: f64, max_value: f64) -> Self {
        self.with_min(min_value).with_max(max_value)
    }

    /// Declared type, falling back to [`DeclaredType::DEFAULT`]
    pub fn effective_type(&self) -> DeclaredType {
        self.declared_type.unwrap_or(DeclaredType::DEFAULT)
    }

    pub fn has_bounds(&self) -> bool {
        self.min_value.is_some() || self.max_value.is_some()
    }

    /// True when `value` lies outside the declared bounds
    pub fn is_out_of_range(&self, value: f64) -> bool {
        self.min_value.is_some_and(|min| value < min)
            || self.max_value.is_some_and(|max| value > max)
    }
}
