//! External table naming

use crate::constants::{PRIMARY_TABLE, PRIMARY_TABLE_NAME, TABLE_PREFIX};

/// Maps logical table names to destination names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNaming {
    primary_table: String,
    primary_name: String,
    prefix: String,
}

impl Default for TableNaming {
    fn default() -> Self {
        Self::new(PRIMARY_TABLE, PRIMARY_TABLE_NAME, TABLE_PREFIX)
    }
}

impl TableNaming {
    pub fn new(
        primary_table: impl Into<String>,
        primary_name: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            primary_table: primary_table.into(),
            primary_name: primary_name.into(),
            prefix: prefix.into(),
        }
    }

    /// Primary table keeps its fixed name; others become `<prefix><lowercase table>`
    pub fn external_name(&self, table: &str) -> String {
        if table == self.primary_table {
            self.primary_name.clone()
        } else {
            format!("{}{}", self.prefix, table.to_lowercase())
        }
    }
}
