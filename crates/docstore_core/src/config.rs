//! Table targeting configuration.
//!
//! Both values are opaque to the access layer and handed to the store client
//! unmodified (prefix first, then name).

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub table_name: String,
    pub table_prefix: String,
}

impl TableConfig {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            table_prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, table_prefix: impl Into<String>) -> Self {
        self.table_prefix = table_prefix.into();
        self
    }

    /// Table name the store client receives.
    pub fn target_table(&self) -> String {
        format!("{}{}", self.table_prefix, self.table_name)
    }
}
