use chrono::Utc;

use super::Ledger;
use crate::domain::aggregates::BankAccount;
use crate::{LedgerError, Result};

#[derive(Debug, Clone)]
pub struct BankAccountDraft {
    pub bank_name: String,
    pub account_holder: String,
    pub account_number: String,
    pub cci: Option<String>,
}

impl BankAccountDraft {
    fn into_account(self, id: String) -> BankAccount {
        BankAccount::new(id, self.bank_name.trim(), self.account_holder.trim(), self.account_number.trim(), self.cci)
    }
}

impl Ledger {
    pub fn bank_accounts(&self) -> Vec<BankAccount> {
        self.stores.bank_accounts.list()
    }

    /// New accounts are keyed `acc-{unix millis}`.
    #[tracing::instrument(skip(self, draft), fields(bank = %draft.bank_name))]
    pub async fn create_account(&self, draft: BankAccountDraft) -> Result<BankAccount> {
        let _guard = self.write.lock().await;
        let accounts = &self.stores.bank_accounts;
        let mut millis = Utc::now().timestamp_millis();
        while accounts.contains(&format!("acc-{millis}")) {
            millis += 1;
        }
        let account = draft.into_account(format!("acc-{millis}"));
        accounts.append(account.clone());
        tracing::info!(account_id = %account.id, "bank account added");
        Ok(account)
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn update_account(&self, account_id: &str, draft: BankAccountDraft) -> Result<BankAccount> {
        let _guard = self.write.lock().await;
        if !self.stores.bank_accounts.contains(account_id) {
            return Err(LedgerError::AccountNotFound(account_id.to_string()));
        }
        let account = draft.into_account(account_id.to_string());
        self.stores.bank_accounts.replace(account.clone());
        tracing::info!("bank account updated");
        Ok(account)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_account(&self, account_id: &str) -> Result<()> {
        let _guard = self.write.lock().await;
        self.stores.bank_accounts.remove(account_id).ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;
        tracing::info!("bank account removed");
        Ok(())
    }
}
