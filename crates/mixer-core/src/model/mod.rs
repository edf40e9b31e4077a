pub mod ledger;
pub mod participant;
pub mod team;
