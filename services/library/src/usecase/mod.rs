pub mod account;
pub mod admin;
pub mod borrow;
pub mod card_application;
pub mod catalog;
pub mod contact;
pub mod donation;
