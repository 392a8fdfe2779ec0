use serde_json::Value as JsonValue;

/// Field equality constraints, combined with logical AND.
///
/// Fields are matched against the entity's serde JSON form, so the names are
/// the serialized field names (`sku`, `email`, `product_sku`, ...). An empty
/// filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, JsonValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field filter.
    pub fn by(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The only clause, when the filter has exactly one.
    pub fn single(&self) -> Option<(&str, &JsonValue)> {
        match self.clauses.as_slice() {
            [(field, value)] => Some((field.as_str(), value)),
            _ => None,
        }
    }

    pub fn matches(&self, row: &JsonValue) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| row.get(field) == Some(expected))
    }
}

impl core::fmt::Display for Filter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("{")?;
        for (idx, (field, value)) in self.clauses.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {value}")?;
        }
        f.write_str("}")
    }
}
