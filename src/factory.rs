use crate::arch::{ColumnMeta, ConstraintStatus, ForeignRef, PojoArch, TableArch, TableField};
use crate::config::ArchConfig;
use crate::defaults::Defaults;
use crate::error::{assure_model, ArchError, Result};
use crate::model::{EntityDesc, FieldDesc, FieldKind, JdbcType, ModelCatalog};
use crate::naming;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Columns produced by one field kind
struct Expansion {
    columns: Vec<ColumnMeta>,
    adapter_name: Option<String>,
    foreign: Option<ForeignRef>,
    optional: bool,
}

impl Expansion {
    fn native(column: ColumnMeta) -> Self {
        Self {
            columns: vec![column],
            adapter_name: None,
            foreign: None,
            optional: false,
        }
    }

    fn adapted(columns: Vec<ColumnMeta>, adapter_name: String) -> Self {
        Self {
            columns,
            adapter_name: Some(adapter_name),
            foreign: None,
            optional: false,
        }
    }
}

/// Models entered during one derivation
#[derive(Default)]
struct Visiting {
    /// Structures being expanded inline
    nested: Vec<String>,
    /// Models whose primary key is being resolved for a foreign reference
    foreign: Vec<String>,
}

impl Visiting {
    fn root(model: &str) -> Self {
        Self {
            nested: vec![model.to_string()],
            foreign: Vec::new(),
        }
    }
}

/// Logical and SQL names of the field being expanded
struct FieldNames<'n> {
    field: &'n str,
    sql: String,
    explicit: bool,
}

impl<'n> FieldNames<'n> {
    fn of(field: &'n FieldDesc) -> Self {
        match &field.attrs.sql_name {
            Some(sql) => Self {
                field: &field.name,
                sql: sql.clone(),
                explicit: true,
            },
            None => Self {
                field: &field.name,
                sql: naming::field_sql_name(&field.name),
                explicit: false,
            },
        }
    }

    fn path(&self) -> Vec<String> {
        vec![self.field.to_string()]
    }

    fn sub(&self, sql_suffix: &str, path_suffix: &str) -> (String, Vec<String>) {
        let name = naming::concat_sql_names(&self.sql, sql_suffix);
        (name, vec![self.field.to_string(), path_suffix.to_string()])
    }
}

/// Compiles entity descriptions of a [`ModelCatalog`] into flat column schemas.
///
/// Derivation walks fields depth-first in declaration order. Nested structures
/// are expanded recursively with their columns prefixed by the outer field name,
/// and a structure that (transitively) nests itself is rejected.
pub struct ArchFactory<'a> {
    catalog: &'a ModelCatalog,
    config: &'a ArchConfig,
}

impl<'a> ArchFactory<'a> {
    pub fn new(catalog: &'a ModelCatalog, config: &'a ArchConfig) -> Self {
        Self { catalog, config }
    }

    /// Compiles every model of the catalog, in registration order
    pub fn build_all(&self) -> Result<Vec<TableArch>> {
        self.catalog
            .models()
            .iter()
            .map(|model| self.build_table_arch(&model.name))
            .collect()
    }

    pub fn build_table_arch(&self, model: &str) -> Result<TableArch> {
        let entity = self.catalog.require(model)?;
        let sql_name = table_sql_name(entity);
        naming::validate_identifier(&sql_name)?;
        assure_model(!entity.fields.is_empty(), || format!("Model {} has no fields", model))?;

        let primary_key = self.primary_key_index(entity)?;
        let mut visiting = Visiting::root(&entity.name);
        let mut fields = Vec::with_capacity(entity.fields.len());
        for (index, field) in entity.fields.iter().enumerate() {
            let table_field = self.build_table_field(field, primary_key == Some(index), &mut visiting)?;
            fields.push(table_field);
        }

        let arch = TableArch {
            model_name: entity.name.clone(),
            sql_name,
            adapter_name: naming::default_adapter_name(&entity.name, &self.config.adapter_suffix),
            fields,
        };
        check_columns(&arch.model_name, arch.columns().into_iter())?;

        debug!(
            model = %arch.model_name,
            table = %arch.sql_name,
            columns = arch.columns().len(),
            "Compiled table arch"
        );
        Ok(arch)
    }

    pub fn build_pojo_arch(&self, model: &str) -> Result<PojoArch> {
        let pojo = self.pojo_arch(model, &mut Visiting::default())?;
        check_columns(&pojo.model_name, pojo.columns.iter())?;
        Ok(pojo)
    }

    fn build_table_field(
        &self,
        field: &FieldDesc,
        is_primary_key: bool,
        visiting: &mut Visiting,
    ) -> Result<TableField> {
        let names = FieldNames::of(field);
        let expansion = self.expand(&field.kind, &names, visiting)?;
        let attrs = &field.attrs;
        let count = expansion.columns.len();

        assure_model(!is_primary_key || !(attrs.nullable || expansion.optional), || {
            format!("Primary key field `{}` can't be nullable", field.name)
        })?;
        assure_model(!is_primary_key || expansion.foreign.is_none(), || {
            format!("Primary key field `{}` can't be a foreign reference", field.name)
        })?;

        let defaults = if count == 1 {
            Defaults::of_one_column(attrs.defaults.iter().cloned())?
        } else {
            Defaults::of_multi_columns(count, attrs.defaults.iter().cloned())?
        };

        let primary_key = if is_primary_key {
            ConstraintStatus::for_columns(count)
        } else {
            ConstraintStatus::None
        };
        let unique = if attrs.unique {
            ConstraintStatus::for_columns(count)
        } else {
            ConstraintStatus::None
        };

        let columns = expansion
            .columns
            .into_iter()
            .enumerate()
            .map(|(index, column)| {
                let column = column.with_primary_key(primary_key).with_unique(unique);
                let column = if attrs.nullable { column.with_nullable(true) } else { column };
                match defaults.at(index) {
                    Some(value) => column.with_default(value),
                    None => column,
                }
            })
            .collect();

        trace!(field = %field.name, columns = count, "Compiled table field");
        Ok(TableField {
            name: field.name.clone(),
            columns,
            primary_key: is_primary_key,
            unique: attrs.unique,
            defaults,
            adapter_name: expansion.adapter_name,
            foreign_table: expansion.foreign.map(|foreign| foreign.table),
        })
    }

    fn expand(&self, kind: &FieldKind, names: &FieldNames<'_>, visiting: &mut Visiting) -> Result<Expansion> {
        let expansion = match kind {
            FieldKind::Primitive { jdbc_type }
            | FieldKind::Boxed { jdbc_type }
            | FieldKind::Atomic { jdbc_type } => {
                Expansion::native(ColumnMeta::of(names.sql.clone(), *jdbc_type).with_path(names.path()))
            }
            FieldKind::Enum { .. } => {
                Expansion::native(ColumnMeta::of(names.sql.clone(), JdbcType::Int).with_path(names.path()))
            }
            FieldKind::Optional { of } => {
                let inner = self.expand(of, names, visiting)?;
                Expansion {
                    columns: inner.columns.into_iter().map(|c| c.with_nullable(true)).collect(),
                    optional: true,
                    ..inner
                }
            }
            FieldKind::Mapped { mapper } => {
                assure_model(!mapper.columns.is_empty(), || {
                    format!("Mapper {} declares no columns for `{}`", mapper.name, names.field)
                })?;
                let columns = if let [single] = mapper.columns.as_slice() {
                    vec![ColumnMeta::of(names.sql.clone(), single.jdbc_type).with_path(names.path())]
                } else {
                    mapper
                        .columns
                        .iter()
                        .enumerate()
                        .map(|(index, mapped)| {
                            assure_model(!mapped.suffix.trim().is_empty(), || {
                                format!(
                                    "Mapper {} column {} of `{}` needs a non-empty suffix",
                                    mapper.name, index, names.field
                                )
                            })?;
                            let (name, path) = names.sub(&naming::field_sql_name(&mapped.suffix), &mapped.suffix);
                            Ok(ColumnMeta::of(name, mapped.jdbc_type).with_path(path))
                        })
                        .collect::<Result<Vec<_>>>()?
                };
                Expansion::adapted(columns, mapper.name.clone())
            }
            FieldKind::Point => {
                let columns = ["x", "y"]
                    .into_iter()
                    .map(|axis| {
                        let (name, path) = names.sub(axis, axis);
                        ColumnMeta::of(name, JdbcType::Int).with_path(path)
                    })
                    .collect();
                Expansion::adapted(
                    columns,
                    naming::default_adapter_name("Point", &self.config.adapter_suffix),
                )
            }
            FieldKind::Nested { model } => {
                let pojo = self.pojo_arch(model, visiting)?;
                let columns = pojo
                    .columns
                    .into_iter()
                    .map(|column| column.prefixed(&names.sql, names.field))
                    .collect();
                Expansion::adapted(columns, pojo.adapter_name)
            }
            FieldKind::Foreign { model } => {
                let (foreign, jdbc_type) = self.foreign_key(model, visiting)?;
                let name = if names.explicit {
                    names.sql.clone()
                } else {
                    naming::concat_sql_names(&names.sql, "id")
                };
                let column = ColumnMeta::of(name, jdbc_type)
                    .with_path(names.path())
                    .with_foreign(foreign.clone());
                Expansion {
                    columns: vec![column],
                    adapter_name: None,
                    foreign: Some(foreign),
                    optional: false,
                }
            }
        };
        Ok(expansion)
    }

    /// Structure columns relative to the structure itself
    fn pojo_arch(&self, model: &str, visiting: &mut Visiting) -> Result<PojoArch> {
        if visiting.nested.iter().any(|nested| nested == model) {
            let mut path = visiting.nested.clone();
            path.push(model.to_string());
            return Err(ArchError::InvalidModel(format!(
                "Model {} nests itself: {}",
                model,
                path.join(" -> ")
            )));
        }

        let entity = self.catalog.require(model)?;
        assure_model(!entity.fields.is_empty(), || format!("Model {} has no fields", model))?;

        visiting.nested.push(entity.name.clone());
        let mut columns = Vec::new();
        for field in &entity.fields {
            let names = FieldNames::of(field);
            let expansion = self.expand(&field.kind, &names, visiting)?;
            let nullable = field.attrs.nullable;
            columns.extend(
                expansion
                    .columns
                    .into_iter()
                    .map(|column| if nullable { column.with_nullable(true) } else { column }),
            );
        }
        visiting.nested.pop();

        trace!(model = %entity.name, columns = columns.len(), "Compiled pojo arch");
        Ok(PojoArch {
            model_name: entity.name.clone(),
            adapter_name: naming::default_adapter_name(&entity.name, &self.config.adapter_suffix),
            columns,
        })
    }

    /// Resolves the single primary key column a foreign reference points at,
    /// without compiling the rest of the referenced model.
    ///
    /// The key must be a plain non-null column. A key that leads back to a model
    /// already being resolved is rejected with the chain of models involved.
    fn foreign_key(&self, model: &str, visiting: &mut Visiting) -> Result<(ForeignRef, JdbcType)> {
        if visiting.foreign.iter().any(|resolving| resolving == model) {
            let mut path = visiting.foreign.clone();
            path.push(model.to_string());
            return Err(ArchError::InvalidModel(format!(
                "Foreign key of {} resolves through itself: {}",
                model,
                path.join(" -> ")
            )));
        }

        let target = self.catalog.require(model)?;
        let index = self.primary_key_index(target)?.ok_or_else(|| {
            ArchError::InvalidModel(format!("Foreign model {} has no primary key", model))
        })?;
        let field = &target.fields[index];

        let mut kind = &field.kind;
        let mut optional = false;
        while let FieldKind::Optional { of } = kind {
            optional = true;
            kind = of;
        }
        assure_model(!optional && !field.attrs.nullable, || {
            format!("Primary key of {} can't be nullable", model)
        })?;
        assure_model(!matches!(kind, FieldKind::Foreign { .. }), || {
            format!("Primary key of {} can't be a foreign reference", model)
        })?;

        visiting.foreign.push(target.name.clone());
        let expansion = self.expand(kind, &FieldNames::of(field), visiting);
        visiting.foreign.pop();
        let expansion = expansion?;
        match expansion.columns.as_slice() {
            [column] => Ok((
                ForeignRef {
                    table: table_sql_name(target),
                    column: column.name().to_string(),
                },
                column.jdbc_type(),
            )),
            columns => Err(ArchError::InvalidModel(format!(
                "Foreign model {} must have a single-column primary key, got {}",
                model,
                columns.len()
            ))),
        }
    }

    /// Explicitly marked field, else `id` / `<model>Id` when inference is on
    fn primary_key_index(&self, entity: &EntityDesc) -> Result<Option<usize>> {
        let marked: Vec<usize> = entity
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.attrs.primary_key)
            .map(|(index, _)| index)
            .collect();
        match marked.as_slice() {
            [] if self.config.infer_primary_keys => {
                let id_name = naming::id_field_name(&entity.name);
                Ok(entity
                    .fields
                    .iter()
                    .position(|field| field.name == "id" || field.name == id_name))
            }
            [] => Ok(None),
            [index] => Ok(Some(*index)),
            _ => {
                let names = marked
                    .iter()
                    .map(|&index| entity.fields[index].name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(ArchError::InvalidModel(format!(
                    "Model {} has multiple primary key fields: {}",
                    entity.name, names
                )))
            }
        }
    }
}

fn table_sql_name(entity: &EntityDesc) -> String {
    entity
        .table_name
        .clone()
        .unwrap_or_else(|| naming::model_sql_name(&entity.name))
}

/// Column names must be valid identifiers and unique within one schema
fn check_columns<'c>(model: &str, columns: impl Iterator<Item = &'c ColumnMeta>) -> Result<()> {
    let mut seen = HashSet::new();
    for column in columns {
        naming::validate_identifier(column.name())?;
        assure_model(seen.insert(column.name()), || {
            format!("Duplicate column `{}` in model {}", column.name(), model)
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityDesc, FieldDesc};
    use crate::term::TermType;

    fn catalog(models: Vec<EntityDesc>) -> ModelCatalog {
        models
            .into_iter()
            .try_fold(ModelCatalog::new(), |catalog, model| catalog.with(model))
            .unwrap()
    }

    fn column_names(arch: &TableArch) -> Vec<String> {
        arch.columns().iter().map(|c| c.name().to_string()).collect()
    }

    fn user() -> EntityDesc {
        EntityDesc::new("User")
            .field(FieldDesc::new("userId", FieldKind::primitive(JdbcType::Int)))
            .field(FieldDesc::new("name", FieldKind::boxed(JdbcType::String)))
    }

    #[test]
    fn test_native_columns() {
        let catalog = catalog(vec![user()]);
        let config = ArchConfig::default();
        let arch = ArchFactory::new(&catalog, &config).build_table_arch("User").unwrap();

        assert_eq!(arch.sql_name(), "user");
        assert_eq!(arch.adapter_name(), "UserJdbcAdapter");
        assert_eq!(column_names(&arch), ["user_id", "name"]);
        let id = arch.column("user_id").unwrap();
        assert_eq!(id.primary_key(), ConstraintStatus::SingleColumn);
        assert!(!id.is_nullable());
        assert_eq!(arch.column("name").unwrap().primary_key(), ConstraintStatus::None);
    }

    #[test]
    fn test_primary_key_inference_disabled() {
        let catalog = catalog(vec![user()]);
        let config = ArchConfig {
            infer_primary_keys: false,
            ..ArchConfig::default()
        };
        let arch = ArchFactory::new(&catalog, &config).build_table_arch("User").unwrap();
        assert!(arch.primary_key_field().is_none());
    }

    #[test]
    fn test_nested_level_one() {
        let foo = EntityDesc::new("Foo")
            .field(FieldDesc::new("x", FieldKind::primitive(JdbcType::Int)))
            .field(FieldDesc::new("y", FieldKind::primitive(JdbcType::Long)));
        let bar = EntityDesc::new("Bar")
            .field(FieldDesc::new("z", FieldKind::primitive(JdbcType::Boolean)))
            .field(FieldDesc::new("foo", FieldKind::nested("Foo")));
        let catalog = catalog(vec![foo, bar]);
        let config = ArchConfig::default();

        let pojo = ArchFactory::new(&catalog, &config).build_pojo_arch("Bar").unwrap();
        assert_eq!(pojo.adapter_name(), "BarJdbcAdapter");
        assert_eq!(pojo.column_names(), ["z", "foo_x", "foo_y"]);
        let types: Vec<_> = pojo.columns().iter().map(ColumnMeta::term_type).collect();
        assert_eq!(types, [TermType::Bool, TermType::Number, TermType::Number]);
        assert_eq!(pojo.columns()[1].path(), ["foo".to_string(), "x".to_string()]);
    }

    #[test]
    fn test_nested_level_two() {
        let inner = EntityDesc::new("Inner").field(FieldDesc::new("a", FieldKind::primitive(JdbcType::Int)));
        let middle = EntityDesc::new("Middle")
            .field(FieldDesc::new("inner", FieldKind::nested("Inner")))
            .field(FieldDesc::new("b", FieldKind::primitive(JdbcType::Int)));
        let outer = EntityDesc::new("Outer")
            .field(FieldDesc::new("id", FieldKind::primitive(JdbcType::Long)))
            .field(FieldDesc::new("middle", FieldKind::nested("Middle")));
        let catalog = catalog(vec![inner, middle, outer]);
        let config = ArchConfig::default();

        let arch = ArchFactory::new(&catalog, &config).build_table_arch("Outer").unwrap();
        assert_eq!(column_names(&arch), ["id", "middle_inner_a", "middle_b"]);
        assert_eq!(arch.field("middle").unwrap().adapter_name(), Some("MiddleJdbcAdapter"));
    }

    #[test]
    fn test_enum_point_optional_atomic() {
        let model = EntityDesc::new("Foo")
            .field(FieldDesc::new("bool", FieldKind::enumeration("OptionalBool")))
            .field(FieldDesc::new("point", FieldKind::Point))
            .field(FieldDesc::new("optional", FieldKind::optional(FieldKind::boxed(JdbcType::Int))))
            .field(FieldDesc::new("atomic", FieldKind::atomic(JdbcType::Long)));
        let catalog = catalog(vec![model]);
        let config = ArchConfig::default();
        let arch = ArchFactory::new(&catalog, &config).build_table_arch("Foo").unwrap();

        assert_eq!(column_names(&arch), ["bool", "point_x", "point_y", "optional", "atomic"]);
        assert_eq!(arch.column("bool").unwrap().jdbc_type(), JdbcType::Int);
        assert_eq!(arch.column("point_y").unwrap().jdbc_type(), JdbcType::Int);
        assert!(arch.column("optional").unwrap().is_nullable());
        assert!(!arch.column("atomic").unwrap().is_nullable());
        assert_eq!(arch.column("atomic").unwrap().jdbc_type(), JdbcType::Long);
    }

    #[test]
    fn test_mapped_columns() {
        let model = EntityDesc::new("Event")
            .field(FieldDesc::new("id", FieldKind::primitive(JdbcType::Int)))
            .field(FieldDesc::new(
                "range",
                FieldKind::mapped("RangeMapper", vec![("from", JdbcType::Long), ("to", JdbcType::Long)]),
            ))
            .field(
                FieldDesc::new("tag", FieldKind::mapped("TagMapper", vec![("value", JdbcType::String)]))
                    .unique(),
            );
        let catalog = catalog(vec![model]);
        let config = ArchConfig::default();
        let arch = ArchFactory::new(&catalog, &config).build_table_arch("Event").unwrap();

        assert_eq!(column_names(&arch), ["id", "range_from", "range_to", "tag"]);
        assert_eq!(arch.field("range").unwrap().adapter_name(), Some("RangeMapper"));
        assert_eq!(arch.column("tag").unwrap().unique(), ConstraintStatus::SingleColumn);
    }

    #[test]
    fn test_multi_column_constraints() {
        let model = EntityDesc::new("Place")
            .field(FieldDesc::new("location", FieldKind::Point).primary_key())
            .field(
                FieldDesc::new("corner", FieldKind::Point)
                    .unique()
                    .defaults(vec![Some("0".to_string()), None]),
            );
        let catalog = catalog(vec![model]);
        let config = ArchConfig::default();
        let arch = ArchFactory::new(&catalog, &config).build_table_arch("Place").unwrap();

        let x = arch.column("location_x").unwrap();
        assert_eq!(x.primary_key(), ConstraintStatus::Composite);
        let corner_x = arch.column("corner_x").unwrap();
        assert_eq!(corner_x.unique(), ConstraintStatus::Composite);
        assert_eq!(corner_x.default_value(), Some("0"));
        assert_eq!(arch.column("corner_y").unwrap().default_value(), None);
        assert_eq!(arch.field("corner").unwrap().defaults().size(), 2);
    }

    #[test]
    fn test_defaults_count_mismatch() {
        let model = EntityDesc::new("Place").field(
            FieldDesc::new("corner", FieldKind::Point).defaults(vec![Some("0".to_string())]),
        );
        let catalog = catalog(vec![model]);
        let config = ArchConfig::default();
        let err = ArchFactory::new(&catalog, &config).build_table_arch("Place").unwrap_err();
        assert!(err.is_model_error());
    }

    #[test]
    fn test_self_nesting_rejected() {
        let node = EntityDesc::new("Node")
            .field(FieldDesc::new("value", FieldKind::primitive(JdbcType::Int)))
            .field(FieldDesc::new("next", FieldKind::nested("Node")));
        let catalog = catalog(vec![node]);
        let config = ArchConfig::default();
        let factory = ArchFactory::new(&catalog, &config);

        let err = factory.build_table_arch("Node").unwrap_err();
        assert!(err.is_model_error());
        assert!(err.to_string().contains("Node -> Node"));
        assert!(factory.build_pojo_arch("Node").is_err());
    }

    #[test]
    fn test_indirect_cycle_rejected() {
        let a = EntityDesc::new("A").field(FieldDesc::new("b", FieldKind::nested("B")));
        let b = EntityDesc::new("B").field(FieldDesc::new("a", FieldKind::optional(FieldKind::nested("A"))));
        let catalog = catalog(vec![a, b]);
        let config = ArchConfig::default();
        let err = ArchFactory::new(&catalog, &config).build_table_arch("A").unwrap_err();
        assert!(err.to_string().contains("A -> B -> A"));
    }

    #[test]
    fn test_optional_foreign_primary_key_cycle_rejected() {
        let a = EntityDesc::new("A")
            .field(FieldDesc::new("id", FieldKind::optional(FieldKind::foreign("B"))).primary_key());
        let b = EntityDesc::new("B")
            .field(FieldDesc::new("id", FieldKind::optional(FieldKind::foreign("A"))).primary_key());
        let c = EntityDesc::new("C")
            .field(FieldDesc::new("cId", FieldKind::primitive(JdbcType::Int)))
            .field(FieldDesc::new("a", FieldKind::foreign("A")));
        let catalog = catalog(vec![a, b, c]);
        let config = ArchConfig::default();
        let factory = ArchFactory::new(&catalog, &config);

        let err = factory.build_table_arch("C").unwrap_err();
        assert!(err.is_model_error());
        assert!(err.to_string().contains("Primary key of A can't be nullable"));
        assert!(factory.build_table_arch("A").unwrap_err().is_model_error());
    }

    #[test]
    fn test_optional_self_foreign_primary_key_rejected() {
        let a = EntityDesc::new("A")
            .field(FieldDesc::new("id", FieldKind::optional(FieldKind::foreign("A"))).primary_key());
        let catalog = catalog(vec![a]);
        let config = ArchConfig::default();
        let err = ArchFactory::new(&catalog, &config).build_table_arch("A").unwrap_err();
        assert!(err.to_string().contains("Primary key of A can't be nullable"));
    }

    #[test]
    fn test_foreign_cycle_through_nested_primary_keys() {
        let a = EntityDesc::new("A").field(FieldDesc::new("id", FieldKind::nested("N")).primary_key());
        let n = EntityDesc::new("N").field(FieldDesc::new("b", FieldKind::foreign("B")));
        let b = EntityDesc::new("B").field(FieldDesc::new("id", FieldKind::nested("M")).primary_key());
        let m = EntityDesc::new("M").field(FieldDesc::new("a", FieldKind::foreign("A")));
        let c = EntityDesc::new("C")
            .field(FieldDesc::new("cId", FieldKind::primitive(JdbcType::Int)))
            .field(FieldDesc::new("a", FieldKind::foreign("A")));
        let catalog = catalog(vec![a, n, b, m, c]);
        let config = ArchConfig::default();

        let err = ArchFactory::new(&catalog, &config).build_table_arch("C").unwrap_err();
        assert!(err.is_model_error());
        assert!(err.to_string().contains("Foreign key of A resolves through itself: A -> B -> A"));
    }

    #[test]
    fn test_foreign_target_with_multi_column_key() {
        let place = EntityDesc::new("Place").field(FieldDesc::new("location", FieldKind::Point).primary_key());
        let visit = EntityDesc::new("Visit")
            .field(FieldDesc::new("visitId", FieldKind::primitive(JdbcType::Long)))
            .field(FieldDesc::new("place", FieldKind::foreign("Place")));
        let catalog = catalog(vec![place, visit]);
        let config = ArchConfig::default();

        let err = ArchFactory::new(&catalog, &config).build_table_arch("Visit").unwrap_err();
        assert!(err.to_string().contains("single-column primary key, got 2"));
    }

    #[test]
    fn test_foreign_target_keyed_by_foreign_reference() {
        let profile = EntityDesc::new("Profile").field(FieldDesc::new("user", FieldKind::foreign("User")).primary_key());
        let post = EntityDesc::new("Post")
            .field(FieldDesc::new("postId", FieldKind::primitive(JdbcType::Long)))
            .field(FieldDesc::new("profile", FieldKind::foreign("Profile")));
        let catalog = catalog(vec![user(), profile, post]);
        let config = ArchConfig::default();

        let err = ArchFactory::new(&catalog, &config).build_table_arch("Post").unwrap_err();
        assert!(err.to_string().contains("Primary key of Profile can't be a foreign reference"));
    }

    #[test]
    fn test_mapper_with_empty_suffix_rejected() {
        let model = EntityDesc::new("Event")
            .field(FieldDesc::new("id", FieldKind::primitive(JdbcType::Int)))
            .field(FieldDesc::new(
                "range",
                FieldKind::mapped("RangeMapper", vec![("from", JdbcType::Long), ("", JdbcType::Long)]),
            ));
        let catalog = catalog(vec![model]);
        let config = ArchConfig::default();

        let err = ArchFactory::new(&catalog, &config).build_table_arch("Event").unwrap_err();
        assert!(err.is_model_error());
        assert!(err.to_string().contains("Mapper RangeMapper column 1 of `range` needs a non-empty suffix"));
    }

    #[test]
    fn test_foreign_key() {
        let session = EntityDesc::new("Session")
            .field(FieldDesc::new("sessionId", FieldKind::primitive(JdbcType::Long)))
            .field(FieldDesc::new("user", FieldKind::foreign("User")))
            .field(FieldDesc::new("parent", FieldKind::optional(FieldKind::foreign("Session"))));
        let catalog = catalog(vec![user(), session]);
        let config = ArchConfig::default();
        let arch = ArchFactory::new(&catalog, &config).build_table_arch("Session").unwrap();

        assert_eq!(column_names(&arch), ["session_id", "user_id", "parent_id"]);
        let user_id = arch.column("user_id").unwrap();
        assert_eq!(user_id.jdbc_type(), JdbcType::Int);
        assert_eq!(
            user_id.foreign(),
            Some(&ForeignRef {
                table: "user".to_string(),
                column: "user_id".to_string()
            })
        );
        assert!(arch.column("parent_id").unwrap().is_nullable());
        assert_eq!(arch.field("parent").unwrap().foreign_table(), Some("session"));
        assert!(arch.has_foreign_keys());
    }

    #[test]
    fn test_foreign_without_primary_key() {
        let tag = EntityDesc::new("Tag").field(FieldDesc::new("label", FieldKind::boxed(JdbcType::String)));
        let post = EntityDesc::new("Post").field(FieldDesc::new("tag", FieldKind::foreign("Tag")));
        let catalog = catalog(vec![tag, post]);
        let config = ArchConfig::default();
        assert!(ArchFactory::new(&catalog, &config).build_table_arch("Post").is_err());
    }

    #[test]
    fn test_invalid_primary_keys() {
        let two = EntityDesc::new("Two")
            .field(FieldDesc::new("a", FieldKind::primitive(JdbcType::Int)).primary_key())
            .field(FieldDesc::new("b", FieldKind::primitive(JdbcType::Int)).primary_key());
        let nullable = EntityDesc::new("Nullable")
            .field(FieldDesc::new("id", FieldKind::optional(FieldKind::boxed(JdbcType::Int))));
        let catalog = catalog(vec![two, nullable]);
        let config = ArchConfig::default();
        let factory = ArchFactory::new(&catalog, &config);

        let err = factory.build_table_arch("Two").unwrap_err();
        assert!(err.to_string().contains("multiple primary key fields: a, b"));
        assert!(factory.build_table_arch("Nullable").unwrap_err().is_model_error());
    }

    #[test]
    fn test_duplicate_and_invalid_columns() {
        let duplicate = EntityDesc::new("Dup")
            .field(FieldDesc::new("fooBar", FieldKind::primitive(JdbcType::Int)))
            .field(FieldDesc::new("foo_bar", FieldKind::primitive(JdbcType::Int)));
        let invalid = EntityDesc::new("Bad")
            .field(FieldDesc::new("x", FieldKind::primitive(JdbcType::Int)).sql_name("my column"));
        let catalog = catalog(vec![duplicate, invalid]);
        let config = ArchConfig::default();
        let factory = ArchFactory::new(&catalog, &config);

        assert!(factory.build_table_arch("Dup").unwrap_err().to_string().contains("Duplicate column"));
        assert!(factory.build_table_arch("Bad").unwrap_err().is_model_error());
        assert!(factory.build_table_arch("Missing").unwrap_err().is_model_error());
    }

    #[test]
    fn test_build_all_deterministic() {
        let catalog = catalog(vec![user()]);
        let config = ArchConfig::default();
        let factory = ArchFactory::new(&catalog, &config);
        let first = factory.build_all().unwrap();
        let second = factory.build_all().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }
}
