//! Field registry: column field name → descriptor.
//!
//! Built once from configuration, read-only afterwards. A column without a
//! descriptor is simply not editable.

use std::collections::HashMap;
use std::sync::Arc;

use crate::field::FieldDescriptor;

/// Error building a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two descriptors share a name
    DuplicateField(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateField(name) => {
                write!(f, "field '{}' is registered more than once", name)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Read-only lookup of editable fields.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<Arc<FieldDescriptor>>,
    by_name: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, RegistryError> {
        let mut by_name = HashMap::with_capacity(fields.len());
        let mut stored = Vec::with_capacity(fields.len());

        for (idx, field) in fields.into_iter().enumerate() {
            if by_name.insert(field.name.clone(), idx).is_some() {
                return Err(RegistryError::DuplicateField(field.name));
            }
            stored.push(Arc::new(field));
        }

        Ok(Self {
            fields: stored,
            by_name,
        })
    }

    /// An empty registry: nothing is editable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up the descriptor bound to a field name.
    pub fn find(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.by_name.get(name).and_then(|&idx| self.fields.get(idx))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().map(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
