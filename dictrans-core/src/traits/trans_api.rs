use crate::errors::DictTransResult;
use crate::models::{DictModel, TableRow};

/// Backing store for dictionary lookups.
///
/// Key lists are comma-joined. Implementations must return an empty list,
/// not an error, for an empty key set.
pub trait ITransApi: Send + Sync {
    /// Look up labels for `keys` across one or more comma-joined
    /// dictionary codes.
    ///
    /// `keys == None` asks for every entry of the dictionaries. The engine
    /// sends it for system-dictionary `name2code`, since labels are not keys
    /// of the store. A store that answers `None` with an empty list leaves
    /// those fields untouched.
    fn translate_dict_batch_code2name(
        &self,
        dict_codes: &str,
        keys: Option<&str>,
    ) -> DictTransResult<Vec<DictModel>>;

    /// Look up rows of `table` whose `code_column` is one of `keys`. Each
    /// row carries at least `code_column` and `label_column`.
    fn translate_table_batch_code2name(
        &self,
        table: &str,
        label_column: &str,
        code_column: &str,
        keys: &str,
    ) -> DictTransResult<Vec<TableRow>>;
}
