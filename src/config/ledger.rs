use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Reply with an error instead of recording `0` when a nominal does not parse.
    /// TOML: `ledger.reject_unparsed_nominal`. Default: `false`.
    #[serde(default)]
    pub reject_unparsed_nominal: bool,
}
