//! Export query builder
//!
//! Read endpoints all live under `GET {base}/export`, selected by `TYPE` and
//! narrowed by a handful of upper-case parameters.

use serde::Deserialize;

// == Transaction Type ==
/// Transaction filter accepted by the `transactions` export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Waiver,
    Trade,
    BbidWaiver,
    Ir,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Waiver => "WAIVER",
            TransactionType::Trade => "TRADE",
            TransactionType::BbidWaiver => "BBID_WAIVER",
            TransactionType::Ir => "IR",
        }
    }
}

/// Query parameters for one `export` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportQuery {
    params: Vec<(&'static str, String)>,
}

impl ExportQuery {
    /// Starts a query for the given export `TYPE`.
    pub fn new(export_type: &str) -> Self {
        Self {
            params: vec![("TYPE", export_type.to_string())],
        }
    }

    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// Adds the parameter only when a value is present.
    pub fn param_opt(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    /// The `TYPE` this query selects.
    pub fn export_type(&self) -> &str {
        &self.params[0].1
    }

    /// Final parameter list, with JSON output requested.
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        let mut params = self.params;
        params.push(("JSON", "1".to_string()));
        params
    }
}
