//! Bank accounts, wallets and cards that hold a balance.

mod db;
mod endpoints;

pub use db::{
    Account, AccountForm, AccountId, create_account, create_account_table, deactivate_account,
    list_accounts, update_account,
};
pub use endpoints::{
    create_account_endpoint, deactivate_account_endpoint, list_accounts_endpoint,
    update_account_endpoint,
};
