//! Bank accounts shown to customers paying by transfer

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: String,
    pub bank_name: String,
    pub account_holder: String,
    pub account_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cci: Option<String>,
}

impl BankAccount {
    pub fn new(id: impl Into<String>, bank_name: impl Into<String>, account_holder: impl Into<String>, account_number: impl Into<String>, cci: Option<String>) -> Self {
        Self {
            id: id.into(), bank_name: bank_name.into(), account_holder: account_holder.into(), account_number: account_number.into(),
            cci: cci.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        }
    }
}
