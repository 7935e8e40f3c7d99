pub mod appointments;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod expenses;
pub mod reports;
pub mod staff;
pub mod webhook;
