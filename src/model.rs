use crate::error::{assure_model, ArchError, Result};
use crate::term::TermType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Physical value kind of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JdbcType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Bytes,
    Date,
    Time,
    Timestamp,
}

impl JdbcType {
    pub fn term_type(self) -> TermType {
        match self {
            JdbcType::Boolean => TermType::Bool,
            JdbcType::Byte
            | JdbcType::Short
            | JdbcType::Int
            | JdbcType::Long
            | JdbcType::Float
            | JdbcType::Double => TermType::Number,
            JdbcType::String | JdbcType::Bytes => TermType::String,
            JdbcType::Date | JdbcType::Time | JdbcType::Timestamp => TermType::Time,
        }
    }

    /// Integer kinds eligible for auto-increment keys
    pub fn is_integral(self) -> bool {
        matches!(self, JdbcType::Int | JdbcType::Long)
    }
}

impl fmt::Display for JdbcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One output column of a custom mapper. `suffix` is appended to the field
/// name when the mapper produces more than one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedColumn {
    pub suffix: String,
    pub jdbc_type: JdbcType,
}

/// A bidirectional mapper whose output shape is trusted as declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperDesc {
    pub name: String,
    pub columns: Vec<MappedColumn>,
}

/// Declared kind of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Primitive { jdbc_type: JdbcType },
    Boxed { jdbc_type: JdbcType },
    /// Atomic wrapper around a scalar, stored as the scalar
    Atomic { jdbc_type: JdbcType },
    Optional { of: Box<FieldKind> },
    /// Stored as the ordinal
    Enum { name: String },
    Mapped { mapper: MapperDesc },
    /// 2-D point stored as `<field>_x`, `<field>_y`
    Point,
    Nested { model: String },
    /// Reference to another model, stored as its primary key
    Foreign { model: String },
}

impl FieldKind {
    pub fn primitive(jdbc_type: JdbcType) -> Self {
        FieldKind::Primitive { jdbc_type }
    }

    pub fn boxed(jdbc_type: JdbcType) -> Self {
        FieldKind::Boxed { jdbc_type }
    }

    pub fn atomic(jdbc_type: JdbcType) -> Self {
        FieldKind::Atomic { jdbc_type }
    }

    pub fn optional(of: FieldKind) -> Self {
        FieldKind::Optional { of: Box::new(of) }
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        FieldKind::Enum { name: name.into() }
    }

    pub fn mapped(name: impl Into<String>, columns: Vec<(&str, JdbcType)>) -> Self {
        let columns = columns
            .into_iter()
            .map(|(suffix, jdbc_type)| MappedColumn {
                suffix: suffix.to_string(),
                jdbc_type,
            })
            .collect();
        FieldKind::Mapped {
            mapper: MapperDesc {
                name: name.into(),
                columns,
            },
        }
    }

    pub fn nested(model: impl Into<String>) -> Self {
        FieldKind::Nested { model: model.into() }
    }

    pub fn foreign(model: impl Into<String>) -> Self {
        FieldKind::Foreign { model: model.into() }
    }
}

/// Declarative per-field attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAttrs {
    pub primary_key: bool,
    pub unique: bool,
    pub nullable: bool,
    pub sql_name: Option<String>,
    pub defaults: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDesc {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub attrs: FieldAttrs,
}

impl FieldDesc {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attrs: FieldAttrs::default(),
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.attrs.primary_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.attrs.unique = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.attrs.nullable = true;
        self
    }

    pub fn sql_name(mut self, name: impl Into<String>) -> Self {
        self.attrs.sql_name = Some(name.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.attrs.defaults.push(Some(value.into()));
        self
    }

    pub fn defaults(mut self, values: Vec<Option<String>>) -> Self {
        self.attrs.defaults = values;
        self
    }
}

/// Structural description of one entity, fields in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDesc {
    pub name: String,
    pub fields: Vec<FieldDesc>,
    /// Overrides the derived table name
    #[serde(default)]
    pub table_name: Option<String>,
}

impl EntityDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            table_name: None,
        }
    }

    pub fn field(mut self, field: FieldDesc) -> Self {
        self.fields.push(field);
        self
    }

    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }
}

/// All entity descriptions known to one compilation, by name.
///
/// `Nested` and `Foreign` kinds refer to other entries by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "CatalogRepr")]
pub struct ModelCatalog {
    models: Vec<EntityDesc>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct CatalogRepr {
    models: Vec<EntityDesc>,
}

impl TryFrom<CatalogRepr> for ModelCatalog {
    type Error = ArchError;

    fn try_from(repr: CatalogRepr) -> Result<Self> {
        repr.models
            .into_iter()
            .try_fold(ModelCatalog::new(), |catalog, model| catalog.with(model))
    }
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model: EntityDesc) -> Result<()> {
        assure_model(!self.index.contains_key(&model.name), || {
            format!("Model {} already registered", model.name)
        })?;
        self.index.insert(model.name.clone(), self.models.len());
        self.models.push(model);
        Ok(())
    }

    pub fn with(mut self, model: EntityDesc) -> Result<Self> {
        self.register(model)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&EntityDesc> {
        self.index.get(name).map(|&i| &self.models[i])
    }

    pub fn require(&self, name: &str) -> Result<&EntityDesc> {
        self.get(name)
            .ok_or_else(|| ArchError::InvalidModel(format!("Unknown model: {}", name)))
    }

    /// Models in registration order
    pub fn models(&self) -> &[EntityDesc] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Loads `{"models": [...]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let repr: CatalogRepr = serde_json::from_str(json)?;
        ModelCatalog::try_from(repr)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
