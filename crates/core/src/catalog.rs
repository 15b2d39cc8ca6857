//! Type lookup seam between the walker and wherever type metadata comes from.

use std::collections::HashMap;

use crate::error::Result;
use crate::model::BackendType;
use crate::type_expr::TypeExpr;

/// Source of backend type metadata.
pub trait TypeProvider {
    /// Find a type by its qualified base name (no generic arguments).
    fn find(&self, name: &str) -> Option<&BackendType>;
}

/// In-memory catalog built from a description document.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<String, BackendType>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type. Names may carry generic parameters (`MyApp.Page<T>`)
    /// or an arity suffix; either way the catalog is keyed by the base name.
    pub fn insert(&mut self, mut ty: BackendType) -> Result<()> {
        let expr = TypeExpr::parse(&ty.name)?;
        if ty.generic_params.is_empty() {
            ty.generic_params = expr.args().iter().map(|a| a.name().to_string()).collect();
        }
        let key = expr.name().to_string();
        ty.name.clone_from(&key);
        self.types.insert(key, ty);
        Ok(())
    }

    pub fn from_types(types: impl IntoIterator<Item = BackendType>) -> Result<Self> {
        let mut catalog = Self::new();
        for ty in types {
            catalog.insert(ty)?;
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeProvider for TypeCatalog {
    fn find(&self, name: &str) -> Option<&BackendType> {
        self.types.get(name)
    }
}
