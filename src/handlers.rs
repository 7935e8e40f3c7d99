pub mod appointments;
pub mod auth;
pub mod availability;
pub mod catalog;
pub mod dashboard;
pub mod employees;
pub mod expenses;
pub mod reports;
pub mod webhook;
