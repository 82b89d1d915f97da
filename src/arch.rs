use crate::defaults::Defaults;
use crate::model::JdbcType;
use crate::term::{Column, TermType};
use std::fmt;

/// How many columns jointly carry a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConstraintStatus {
    #[default]
    None,
    SingleColumn,
    Composite,
}

impl ConstraintStatus {
    /// Status of a constraint held by `columns` columns
    pub fn for_columns(columns: usize) -> Self {
        match columns {
            0 => ConstraintStatus::None,
            1 => ConstraintStatus::SingleColumn,
            _ => ConstraintStatus::Composite,
        }
    }

    pub fn is_set(self) -> bool {
        self != ConstraintStatus::None
    }

    pub fn is_single(self) -> bool {
        self == ConstraintStatus::SingleColumn
    }

    pub fn is_composite(self) -> bool {
        self == ConstraintStatus::Composite
    }
}

impl fmt::Display for ConstraintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Target of a foreign key column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForeignRef {
    pub table: String,
    pub column: String,
}

/// Compiled, immutable fact about one physical column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    name: String,
    path: Vec<String>,
    jdbc_type: JdbcType,
    primary_key: ConstraintStatus,
    unique: ConstraintStatus,
    nullable: bool,
    default: Option<String>,
    foreign: Option<ForeignRef>,
}

impl ColumnMeta {
    pub fn of(name: impl Into<String>, jdbc_type: JdbcType) -> Self {
        let name = name.into();
        Self {
            path: vec![name.clone()],
            name,
            jdbc_type,
            primary_key: ConstraintStatus::None,
            unique: ConstraintStatus::None,
            nullable: false,
            default: None,
            foreign: None,
        }
    }

    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = path;
        self
    }

    pub fn with_primary_key(mut self, status: ConstraintStatus) -> Self {
        self.primary_key = status;
        self
    }

    pub fn with_unique(mut self, status: ConstraintStatus) -> Self {
        self.unique = status;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_foreign(mut self, foreign: ForeignRef) -> Self {
        self.foreign = Some(foreign);
        self
    }

    /// Re-roots the column under an outer field: `x` becomes `<prefix>_x`.
    pub(crate) fn prefixed(mut self, sql_prefix: &str, field_name: &str) -> Self {
        self.name = crate::naming::concat_sql_names(sql_prefix, &self.name);
        self.path.insert(0, field_name.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical field path from the entity root, e.g. `["foo", "x"]` for `foo_x`
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn jdbc_type(&self) -> JdbcType {
        self.jdbc_type
    }

    pub fn term_type(&self) -> TermType {
        self.jdbc_type.term_type()
    }

    pub fn primary_key(&self) -> ConstraintStatus {
        self.primary_key
    }

    pub fn unique(&self) -> ConstraintStatus {
        self.unique
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key.is_set()
    }

    pub fn is_unique(&self) -> bool {
        self.unique.is_set()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn foreign(&self) -> Option<&ForeignRef> {
        self.foreign.as_ref()
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign.is_some()
    }

    /// Primary or foreign key
    pub fn is_key(&self) -> bool {
        self.is_primary_key() || self.is_foreign_key()
    }

    /// The column as an expression term
    pub fn to_column(&self) -> Column {
        Column::new(self.name.clone(), self.term_type())
    }
}

/// One declared field of an entity and the columns it expands into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableField {
    pub(crate) name: String,
    pub(crate) columns: Vec<ColumnMeta>,
    pub(crate) primary_key: bool,
    pub(crate) unique: bool,
    pub(crate) defaults: Defaults,
    pub(crate) adapter_name: Option<String>,
    pub(crate) foreign_table: Option<String>,
}

impl TableField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_multi_column(&self) -> bool {
        self.columns.len() > 1
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Mapper or nested-structure adapter converting this field, if any
    pub fn adapter_name(&self) -> Option<&str> {
        self.adapter_name.as_deref()
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign_table.is_some()
    }

    pub fn foreign_table(&self) -> Option<&str> {
        self.foreign_table.as_deref()
    }
}

/// Compiled schema of a top-level entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableArch {
    pub(crate) model_name: String,
    pub(crate) sql_name: String,
    pub(crate) adapter_name: String,
    pub(crate) fields: Vec<TableField>,
}

impl TableArch {
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn sql_name(&self) -> &str {
        &self.sql_name
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    pub fn fields(&self) -> &[TableField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&TableField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// All columns in declaration order
    pub fn columns(&self) -> Vec<&ColumnMeta> {
        self.columns_where(|_| true)
    }

    /// Columns of the fields matching `filter`, in declaration order
    pub fn columns_where(&self, filter: impl Fn(&TableField) -> bool) -> Vec<&ColumnMeta> {
        self.fields
            .iter()
            .filter(|&field| filter(field))
            .flat_map(|field| field.columns.iter())
            .collect()
    }

    pub fn columns_with_fields(&self) -> Vec<(&TableField, &ColumnMeta)> {
        self.fields
            .iter()
            .flat_map(|field| field.columns.iter().map(move |column| (field, column)))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.fields
            .iter()
            .flat_map(|field| field.columns.iter())
            .find(|column| column.name == name)
    }

    pub fn primary_key_field(&self) -> Option<&TableField> {
        self.fields.iter().find(|field| field.primary_key)
    }

    pub fn primary_key_columns(&self) -> Vec<&ColumnMeta> {
        self.columns_where(TableField::is_primary_key)
    }

    /// Every column that isn't part of the primary key
    pub fn non_primary_key_columns(&self) -> Vec<&ColumnMeta> {
        self.columns_where(|field| !field.is_primary_key())
    }

    pub fn has_foreign_keys(&self) -> bool {
        self.fields.iter().any(TableField::is_foreign_key)
    }
}

/// Compiled shape of an embedded structure, column names relative to the structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PojoArch {
    pub(crate) model_name: String,
    pub(crate) adapter_name: String,
    pub(crate) columns: Vec<ColumnMeta>,
}

impl PojoArch {
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnMeta::name).collect()
    }
}
