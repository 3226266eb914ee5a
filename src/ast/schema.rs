//! Ordered relation schemas.

use crate::ast::types::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered name → type mapping describing the columns of a relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<(String, DataType)>,
}

impl Schema {
    /// Build a schema, rejecting duplicate column names.
    pub fn new<I, S>(fields: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (S, DataType)>,
        S: Into<String>,
    {
        let mut schema = Schema::default();
        for (name, ty) in fields {
            let name = name.into();
            if schema.contains(&name) {
                return Err(format!("duplicate column name '{}'", name));
            }
            schema.fields.push((name, ty));
        }
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&DataType> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataType)> {
        self.fields.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn fields(&self) -> &[(String, DataType)] {
        &self.fields
    }

    /// Concatenate two schemas. A column of `other` whose name is already
    /// taken gets `suffix` appended.
    pub fn merge(&self, other: &Schema, suffix: &str) -> Result<Schema, String> {
        let renamed = other.fields.iter().map(|(name, ty)| {
            let name = if self.contains(name) {
                format!("{}{}", name, suffix)
            } else {
                name.clone()
            };
            (name, ty.clone())
        });
        Schema::new(self.fields.iter().cloned().chain(renamed))
    }

    /// Whether any column holds geospatial data.
    pub fn geospatial(&self) -> bool {
        self.fields.iter().any(|(_, t)| t.is_geospatial())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.fields.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        for (i, (name, ty)) in self.fields.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:width$}  {}", name, ty, width = width)?;
        }
        Ok(())
    }
}
