pub mod user_repo;
pub use user_repo::UserRepository;
pub mod service_repo;
pub use service_repo::ServiceRepository;
pub mod employee_service_repo;
pub use employee_service_repo::EmployeeServiceRepository;
pub mod availability_repo;
pub use availability_repo::AvailabilityRepository;
pub mod appointment_repo;
pub use appointment_repo::AppointmentRepository;
pub mod expense_repo;
pub use expense_repo::ExpenseRepository;
pub mod booking_store;
pub use booking_store::PgBookingStore;

/// Monta o padrão `%termo%` para ILIKE, escapando os curingas do próprio termo.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(contains_pattern("Corte"), "%Corte%");
        assert_eq!(contains_pattern(" 50%_off "), "%50\\%\\_off%");
    }
}
