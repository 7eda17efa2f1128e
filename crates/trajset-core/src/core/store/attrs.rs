use super::StoreError;
use toml::Table;

/// Scalar metadata attached to a group or dataset, readable without loading
/// bulk arrays.
///
/// Attributes are deserialized from a TOML table. Accessors are strict: a
/// missing key or a value of the wrong type is an error, never a default.
#[derive(Debug, Clone)]
pub struct Attributes {
    owner: String,
    table: Table,
}

impl Attributes {
    pub(super) fn new(owner: String, table: Table) -> Self {
        Self { owner, table }
    }

    pub(super) fn empty(owner: String) -> Self {
        Self {
            owner,
            table: Table::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn require_u64(&self, name: &str) -> Result<u64, StoreError> {
        let value = self.get(name)?;
        value
            .as_integer()
            .and_then(|i| u64::try_from(i).ok())
            .ok_or_else(|| self.type_error(name, "a non-negative integer"))
    }

    /// Integer values coerce to float; archives commonly store whole-number
    /// fractions without a decimal point.
    pub fn require_f64(&self, name: &str) -> Result<f64, StoreError> {
        let value = self.get(name)?;
        value
            .as_float()
            .or_else(|| value.as_integer().map(|i| i as f64))
            .ok_or_else(|| self.type_error(name, "a float"))
    }

    pub fn require_str(&self, name: &str) -> Result<&str, StoreError> {
        self.get(name)?
            .as_str()
            .ok_or_else(|| self.type_error(name, "a string"))
    }

    pub fn require_str_list(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let values = self
            .get(name)?
            .as_array()
            .ok_or_else(|| self.type_error(name, "an array of strings"))?;
        values
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.type_error(name, "an array of strings"))
            })
            .collect()
    }

    fn get(&self, name: &str) -> Result<&toml::Value, StoreError> {
        self.table
            .get(name)
            .ok_or_else(|| StoreError::MissingAttribute {
                owner: self.owner.clone(),
                name: name.to_string(),
            })
    }

    fn type_error(&self, name: &str, expected: &'static str) -> StoreError {
        StoreError::AttributeType {
            owner: self.owner.clone(),
            name: name.to_string(),
            expected,
        }
    }
}
