use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use dictrans_core::errors::BackingStoreError;
use dictrans_core::models::{row_text, DictModel, TableRow};
use dictrans_core::traits::ITransApi;
use dictrans_core::DictTransResult;

use crate::{list_fixtures, load_fixture};

/// One call received by [`RecordingTransApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Dict {
        dict_codes: String,
        keys: Option<String>,
    },
    Table {
        table: String,
        label_column: String,
        code_column: String,
        keys: String,
    },
}

impl ApiCall {
    /// Number of keys passed, 0 for a whole-dictionary fetch.
    pub fn key_count(&self) -> usize {
        let keys = match self {
            ApiCall::Dict { keys, .. } => keys.as_deref().unwrap_or_default(),
            ApiCall::Table { keys, .. } => keys.as_str(),
        };
        keys.split(',').filter(|k| !k.is_empty()).count()
    }
}

/// In-memory backing store that records every call.
#[derive(Default)]
pub struct RecordingTransApi {
    dicts: Vec<DictModel>,
    tables: HashMap<String, Vec<TableRow>>,
    calls: Mutex<Vec<ApiCall>>,
    fail_on: Mutex<HashSet<String>>,
}

impl RecordingTransApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with `data/dicts.json` and every `data/tables/<name>.json`.
    pub fn from_fixtures() -> Self {
        let mut api = Self {
            dicts: load_fixture("dicts.json"),
            ..Self::default()
        };
        for path in list_fixtures("tables") {
            let Some(table) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let rows: Vec<TableRow> = load_fixture(&format!("tables/{table}.json"));
            api.tables.insert(table.to_string(), rows);
        }
        api
    }

    pub fn with_dict(mut self, dict_code: &str, entries: &[(&str, &str)]) -> Self {
        self.dicts.extend(
            entries
                .iter()
                .map(|(code, label)| DictModel::new(dict_code, *code, *label)),
        );
        self
    }

    pub fn with_table(mut self, table: &str, rows: Vec<TableRow>) -> Self {
        self.tables.entry(table.to_string()).or_default().extend(rows);
        self
    }

    /// Make every later call naming `dict_or_table` fail.
    pub fn fail_on(&self, dict_or_table: &str) {
        self.fail_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(dict_or_table.to_string());
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn reset(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, call: ApiCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn should_fail(&self, name: &str) -> bool {
        self.fail_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }
}

fn key_set(keys: &str) -> HashSet<&str> {
    keys.split(',').filter(|k| !k.is_empty()).collect()
}

impl ITransApi for RecordingTransApi {
    fn translate_dict_batch_code2name(
        &self,
        dict_codes: &str,
        keys: Option<&str>,
    ) -> DictTransResult<Vec<DictModel>> {
        self.record(ApiCall::Dict {
            dict_codes: dict_codes.to_string(),
            keys: keys.map(str::to_string),
        });

        let codes = key_set(dict_codes);
        if let Some(code) = codes.iter().find(|c| self.should_fail(c)) {
            return Err(BackingStoreError::DictLookupFailed {
                dict_code: code.to_string(),
                reason: "injected failure".to_string(),
            }
            .into());
        }

        let wanted = keys.map(key_set);
        Ok(self
            .dicts
            .iter()
            .filter(|d| codes.contains(d.dict_code.as_str()))
            .filter(|d| wanted.as_ref().map_or(true, |w| w.contains(d.code.as_str())))
            .cloned()
            .collect())
    }

    fn translate_table_batch_code2name(
        &self,
        table: &str,
        label_column: &str,
        code_column: &str,
        keys: &str,
    ) -> DictTransResult<Vec<TableRow>> {
        self.record(ApiCall::Table {
            table: table.to_string(),
            label_column: label_column.to_string(),
            code_column: code_column.to_string(),
            keys: keys.to_string(),
        });

        if self.should_fail(table) {
            return Err(BackingStoreError::TableLookupFailed {
                table: table.to_string(),
                code_column: code_column.to_string(),
                name_column: label_column.to_string(),
                reason: "injected failure".to_string(),
            }
            .into());
        }

        let wanted = key_set(keys);
        Ok(self
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        row_text(row, code_column).is_some_and(|k| wanted.contains(k.as_str()))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_store_answers_dict_batches() {
        let api = RecordingTransApi::from_fixtures();
        let rows = api
            .translate_dict_batch_code2name("user_role", Some("A,C,Z"))
            .unwrap();
        let labels: Vec<_> = rows.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Gamma"]);
        assert_eq!(api.calls()[0].key_count(), 3);
    }

    #[test]
    fn whole_dictionary_when_keys_absent() {
        let api = RecordingTransApi::from_fixtures();
        let rows = api.translate_dict_batch_code2name("user_status", None).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn table_rows_match_on_either_column() {
        let api = RecordingTransApi::from_fixtures();
        let rows = api
            .translate_table_batch_code2name("sys_dept", "name", "id", "10,30")
            .unwrap();
        assert_eq!(rows.len(), 2);
        let reverse = api
            .translate_table_batch_code2name("sys_dept", "id", "name", "Operations")
            .unwrap();
        assert_eq!(row_text(&reverse[0], "id").as_deref(), Some("20"));
    }

    #[test]
    fn injected_failures_error() {
        let api = RecordingTransApi::from_fixtures();
        api.fail_on("sys_dept");
        assert!(api
            .translate_table_batch_code2name("sys_dept", "name", "id", "10")
            .is_err());
        assert_eq!(api.call_count(), 1);
    }
}
