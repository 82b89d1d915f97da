use crate::error::{assure_model, Result};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Default values of the columns one field expands into, one nullable slot per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    values: Arc<[Option<String>]>,
}

/// Shared "no defaults" value of a single-column field
pub static EMPTY_COLUMN_DEFAULTS: Lazy<Defaults> = Lazy::new(|| Defaults::new(vec![None]));

impl Defaults {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self {
            values: values.into(),
        }
    }

    pub fn empty() -> Defaults {
        EMPTY_COLUMN_DEFAULTS.clone()
    }

    /// At most one value; absent or null input is [`EMPTY_COLUMN_DEFAULTS`].
    pub fn of_one_column<I, S>(values: I) -> Result<Defaults>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let values = collect(values);
        assure_model(values.len() <= 1, || {
            format!("Single column field can have only one default: {:?}", values)
        })?;
        match values.into_iter().next().flatten() {
            Some(value) => Ok(Defaults::new(vec![Some(value)])),
            None => Ok(Defaults::empty()),
        }
    }

    /// Exactly `columns` values, or none at all
    pub fn of_multi_columns<I, S>(columns: usize, values: I) -> Result<Defaults>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        assure_model(columns > 0, || "Field must have at least one column".to_string())?;
        let values = collect(values);
        if values.is_empty() {
            return Ok(Self::all_null(columns));
        }
        assure_model(values.len() == columns, || {
            format!(
                "Number of defaults doesn't match the number of columns: expected {}, got {:?}",
                columns, values
            )
        })?;
        if values.iter().all(Option::is_none) {
            return Ok(Self::all_null(columns));
        }
        Ok(Defaults::new(values))
    }

    fn all_null(columns: usize) -> Defaults {
        if columns == 1 {
            Defaults::empty()
        } else {
            Defaults::new(vec![None; columns])
        }
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Default of the `index`-th column, `None` when not set
    pub fn at(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|value| value.as_deref())
    }

    pub fn has_any(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }

    /// Whether both share the same storage
    pub fn ptr_eq(&self, other: &Defaults) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

fn collect<I, S>(values: I) -> Vec<Option<String>>
where
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
{
    values.into_iter().map(|value| value.map(Into::into)).collect()
}
