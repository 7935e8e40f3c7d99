pub mod appointment_service;
pub mod auth;
pub mod booking_service;
pub mod catalog_service;
pub mod dashboard_service;
pub mod expense_service;
pub mod rate_limit;
pub mod report_service;
pub mod session;
pub mod staff_service;
