pub mod ledger;
pub mod navigator;
pub mod study;
