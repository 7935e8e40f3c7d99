// src/services/booking_service.rs
//
// Resolve serviço e funcionário de um pedido de agendamento e grava o
// agendamento depois das checagens de habilitação, bloqueio e horário.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        logging::mask_phone,
        validation::{ensure_business_hours, CLOSING_HOUR, OPENING_HOUR},
    },
    models::{
        appointments::{Appointment, AppointmentStatus, NewAppointment},
        catalog::Service,
        staff::{AvailabilityBlock, Employee},
        webhook::BookingRequest,
    },
};

/// Intervalo entre os horários oferecidos na agenda.
pub const SLOT_MINUTES: u32 = 30;

/// Acesso ao banco usado pelo agendamento.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_service(&self, id: Uuid) -> Result<Option<Service>, AppError>;

    /// Primeiro serviço cujo nome contém `term`, sem diferenciar maiúsculas.
    async fn find_service_by_name(&self, term: &str) -> Result<Option<Service>, AppError>;

    async fn first_service(&self) -> Result<Option<Service>, AppError>;

    /// Só devolve usuários do tipo funcionário.
    async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, AppError>;

    /// Funcionários habilitados para o serviço, em ordem de nome.
    async fn eligible_employees(
        &self,
        servico_id: Uuid,
        name_term: Option<&str>,
    ) -> Result<Vec<Employee>, AppError>;

    async fn is_eligible(&self, funcionario_id: Uuid, servico_id: Uuid) -> Result<bool, AppError>;

    async fn blocks_for_day(
        &self,
        funcionario_id: Uuid,
        dia_semana: i16,
    ) -> Result<Vec<AvailabilityBlock>, AppError>;

    async fn booked_times(&self, funcionario_id: Uuid, data: NaiveDate) -> Result<Vec<NaiveTime>, AppError>;

    /// Verifica o horário e insere de forma atômica.
    /// Devolve `AppError::SlotTaken` se já houver agendamento ativo.
    async fn insert_if_slot_free(&self, new: &NewAppointment) -> Result<Appointment, AppError>;
}

/// Pedido vindo do painel, com ids já conhecidos.
#[derive(Debug, Clone)]
pub struct DirectBooking {
    pub cliente_nome: String,
    pub cliente_telefone: String,
    pub funcionario_id: Uuid,
    pub servico_id: Uuid,
    pub data_agendamento: NaiveDate,
    pub hora_agendamento: NaiveTime,
}

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Fluxo do webhook: ids e nomes podem vir parciais ou ausentes.
    pub async fn book_from_webhook(&self, request: BookingRequest) -> Result<Appointment, AppError> {
        ensure_business_hours(request.hora_agendamento)?;

        let service = self.resolve_service(&request).await?;
        let employee = self.resolve_employee(&request, service.id).await?;

        tracing::debug!(
            servico = %service.nome_servico,
            funcionario = %employee.nome,
            "Serviço e funcionário resolvidos"
        );

        self.schedule(NewAppointment {
            cliente_nome: request.cliente_nome,
            cliente_telefone: request.cliente_telefone,
            funcionario_id: employee.id,
            servico_id: service.id,
            data_agendamento: request.data_agendamento,
            hora_agendamento: request.hora_agendamento,
            status: AppointmentStatus::Pendente,
        })
        .await
    }

    /// Fluxo do painel: tudo explícito, já entra confirmado.
    pub async fn book_direct(&self, booking: DirectBooking) -> Result<Appointment, AppError> {
        ensure_business_hours(booking.hora_agendamento)?;

        self.store
            .find_service(booking.servico_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Serviço".to_string()))?;
        self.store
            .find_employee(booking.funcionario_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Funcionário".to_string()))?;

        self.schedule(NewAppointment {
            cliente_nome: booking.cliente_nome,
            cliente_telefone: booking.cliente_telefone,
            funcionario_id: booking.funcionario_id,
            servico_id: booking.servico_id,
            data_agendamento: booking.data_agendamento,
            hora_agendamento: booking.hora_agendamento,
            status: AppointmentStatus::Confirmado,
        })
        .await
    }

    /// Horários livres do funcionário na data, de 30 em 30 minutos.
    pub async fn available_times(&self, funcionario_id: Uuid, data: NaiveDate) -> Result<Vec<String>, AppError> {
        let blocks = self
            .store
            .blocks_for_day(funcionario_id, weekday_index(data))
            .await?;
        let booked = self.store.booked_times(funcionario_id, data).await?;

        let free = day_slots()
            .into_iter()
            .filter(|slot| !blocks.iter().any(|b| b.covers(*slot)))
            .filter(|slot| !booked.iter().any(|t| t.hour() == slot.hour() && t.minute() == slot.minute()))
            .map(|slot| slot.format("%H:%M").to_string())
            .collect();

        Ok(free)
    }

    // id -> nome -> qualquer serviço
    async fn resolve_service(&self, request: &BookingRequest) -> Result<Service, AppError> {
        if let Some(id) = request.servico_id {
            if let Some(service) = self.store.find_service(id).await? {
                return Ok(service);
            }
            tracing::debug!(servico_id = %id, "servico_id informado não existe");
        }

        if let Some(name) = request.servico_nome.as_deref() {
            if let Some(service) = self.store.find_service_by_name(name).await? {
                return Ok(service);
            }
            tracing::debug!(servico = %name, "Nenhum serviço com esse nome");
        }

        self.store
            .first_service()
            .await?
            .ok_or(AppError::NoServicesConfigured)
    }

    // id -> nome entre os habilitados -> qualquer habilitado
    async fn resolve_employee(&self, request: &BookingRequest, servico_id: Uuid) -> Result<Employee, AppError> {
        if let Some(id) = request.funcionario_id {
            if let Some(employee) = self.store.find_employee(id).await? {
                return Ok(employee);
            }
            tracing::debug!(funcionario_id = %id, "funcionario_id informado não existe");
        }

        if let Some(name) = request.funcionario_nome.as_deref() {
            let matches = self.store.eligible_employees(servico_id, Some(name)).await?;
            if let Some(employee) = matches.into_iter().next() {
                return Ok(employee);
            }
            tracing::debug!(funcionario = %name, "Nenhum funcionário habilitado com esse nome");
        }

        self.store
            .eligible_employees(servico_id, None)
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::NoEligibleEmployee)
    }

    async fn schedule(&self, new: NewAppointment) -> Result<Appointment, AppError> {
        if !self.store.is_eligible(new.funcionario_id, new.servico_id).await? {
            return Err(AppError::EmployeeNotEnabled);
        }

        let blocks = self
            .store
            .blocks_for_day(new.funcionario_id, weekday_index(new.data_agendamento))
            .await?;
        if blocks.iter().any(|b| b.covers(new.hora_agendamento)) {
            return Err(AppError::EmployeeUnavailable);
        }

        let appointment = self.store.insert_if_slot_free(&new).await?;

        tracing::info!(
            agendamento_id = %appointment.id,
            funcionario_id = %appointment.funcionario_id,
            telefone = %mask_phone(&appointment.cliente_telefone),
            status = %appointment.status,
            "Agendamento criado"
        );

        Ok(appointment)
    }
}

/// 0 = domingo ... 6 = sábado, como em `disponibilidades.dia_semana`.
pub fn weekday_index(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

fn day_slots() -> Vec<NaiveTime> {
    (OPENING_HOUR * 60..CLOSING_HOUR * 60)
        .step_by(SLOT_MINUTES as usize)
        .filter_map(|minutes| NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;

    /// Banco em memória com a mesma semântica do Postgres.
    #[derive(Default)]
    pub struct FakeStore {
        pub services: Vec<Service>,
        pub employees: Vec<Employee>,
        pub eligibility: Vec<(Uuid, Uuid)>,
        pub blocks: Vec<AvailabilityBlock>,
        pub appointments: Mutex<Vec<Appointment>>,
    }

    impl FakeStore {
        pub fn add_service(&mut self, nome: &str) -> Uuid {
            let id = Uuid::new_v4();
            self.services.push(Service {
                id,
                nome_servico: nome.to_string(),
                descricao: None,
                preco: Decimal::new(5000, 2),
                duracao_minutos: 30,
            });
            id
        }

        pub fn add_employee(&mut self, nome: &str, servicos: &[Uuid]) -> Uuid {
            let id = Uuid::new_v4();
            self.employees.push(Employee {
                id,
                nome: nome.to_string(),
                telefone: None,
            });
            for s in servicos {
                self.eligibility.push((id, *s));
            }
            id
        }

        pub fn block(&mut self, funcionario_id: Uuid, dia_semana: i16, inicio: &str, fim: &str) {
            self.blocks.push(AvailabilityBlock {
                id: Uuid::new_v4(),
                funcionario_id,
                dia_semana,
                hora_inicio: time(inicio),
                hora_fim: time(fim),
            });
        }

        fn sorted_services(&self) -> Vec<&Service> {
            let mut services: Vec<&Service> = self.services.iter().collect();
            services.sort_by(|a, b| a.nome_servico.cmp(&b.nome_servico));
            services
        }
    }

    #[async_trait]
    impl BookingStore for FakeStore {
        async fn find_service(&self, id: Uuid) -> Result<Option<Service>, AppError> {
            Ok(self.services.iter().find(|s| s.id == id).cloned())
        }

        async fn find_service_by_name(&self, term: &str) -> Result<Option<Service>, AppError> {
            let term = term.trim().to_lowercase();
            Ok(self
                .sorted_services()
                .into_iter()
                .find(|s| s.nome_servico.to_lowercase().contains(&term))
                .cloned())
        }

        async fn first_service(&self) -> Result<Option<Service>, AppError> {
            Ok(self.sorted_services().first().map(|s| (*s).clone()))
        }

        async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
            Ok(self.employees.iter().find(|e| e.id == id).cloned())
        }

        async fn eligible_employees(
            &self,
            servico_id: Uuid,
            name_term: Option<&str>,
        ) -> Result<Vec<Employee>, AppError> {
            let term = name_term.map(|t| t.trim().to_lowercase());
            let mut found: Vec<Employee> = self
                .employees
                .iter()
                .filter(|e| self.eligibility.contains(&(e.id, servico_id)))
                .filter(|e| match &term {
                    Some(t) => e.nome.to_lowercase().contains(t),
                    None => true,
                })
                .cloned()
                .collect();
            found.sort_by(|a, b| a.nome.cmp(&b.nome));
            Ok(found)
        }

        async fn is_eligible(&self, funcionario_id: Uuid, servico_id: Uuid) -> Result<bool, AppError> {
            Ok(self.eligibility.contains(&(funcionario_id, servico_id)))
        }

        async fn blocks_for_day(
            &self,
            funcionario_id: Uuid,
            dia_semana: i16,
        ) -> Result<Vec<AvailabilityBlock>, AppError> {
            Ok(self
                .blocks
                .iter()
                .filter(|b| b.funcionario_id == funcionario_id && b.dia_semana == dia_semana)
                .cloned()
                .collect())
        }

        async fn booked_times(&self, funcionario_id: Uuid, data: NaiveDate) -> Result<Vec<NaiveTime>, AppError> {
            Ok(self
                .appointments
                .lock()
                .iter()
                .filter(|a| {
                    a.funcionario_id == funcionario_id
                        && a.data_agendamento == data
                        && a.status != AppointmentStatus::Cancelado
                })
                .map(|a| a.hora_agendamento)
                .collect())
        }

        async fn insert_if_slot_free(&self, new: &NewAppointment) -> Result<Appointment, AppError> {
            let mut appointments = self.appointments.lock();
            let taken = appointments.iter().any(|a| {
                a.funcionario_id == new.funcionario_id
                    && a.data_agendamento == new.data_agendamento
                    && a.hora_agendamento == new.hora_agendamento
                    && a.status != AppointmentStatus::Cancelado
            });
            if taken {
                return Err(AppError::SlotTaken);
            }
            let appointment = Appointment {
                id: Uuid::new_v4(),
                cliente_nome: new.cliente_nome.clone(),
                cliente_telefone: new.cliente_telefone.clone(),
                funcionario_id: new.funcionario_id,
                servico_id: new.servico_id,
                data_agendamento: new.data_agendamento,
                hora_agendamento: new.hora_agendamento,
                status: new.status,
                pago: false,
                criado_em: Utc::now(),
            };
            appointments.push(appointment.clone());
            Ok(appointment)
        }
    }

    pub fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    // 2025-01-21 é uma terça-feira
    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 21).unwrap()
    }

    fn request() -> BookingRequest {
        BookingRequest {
            cliente_nome: "Maria Souza".into(),
            cliente_telefone: "11999999999".into(),
            data_agendamento: tuesday(),
            hora_agendamento: time("10:00"),
            funcionario_id: None,
            funcionario_nome: None,
            servico_id: None,
            servico_nome: None,
        }
    }

    fn service_with(store: FakeStore) -> (BookingService, Arc<FakeStore>) {
        let store = Arc::new(store);
        (BookingService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn explicit_ids_outside_eligibility_are_rejected() {
        let mut store = FakeStore::default();
        let corte = store.add_service("Corte");
        let manicure = store.add_service("Manicure");
        let ana = store.add_employee("Ana", &[corte]);
        store.add_employee("Bia", &[manicure]);
        let (service, fake) = service_with(store);

        let mut req = request();
        req.servico_id = Some(manicure);
        req.funcionario_id = Some(ana);
        req.funcionario_nome = Some("Bia".into());
        req.servico_nome = Some("Corte".into());

        let err = service.book_from_webhook(req).await.unwrap_err();
        assert!(matches!(err, AppError::EmployeeNotEnabled));
        assert!(fake.appointments.lock().is_empty());
    }

    #[tokio::test]
    async fn name_lookup_is_restricted_to_eligible_employees() {
        let mut store = FakeStore::default();
        let corte = store.add_service("Corte");
        let manicure = store.add_service("Manicure");
        let ana = store.add_employee("A", &[corte]);
        let bia = store.add_employee("Bia", &[manicure]);
        let (service, _) = service_with(store);

        let mut req = request();
        req.servico_nome = Some("manicure".into());
        req.funcionario_nome = Some("A".into());

        let appointment = service.book_from_webhook(req).await.unwrap();
        assert_ne!(appointment.funcionario_id, ana);
        assert_eq!(appointment.funcionario_id, bia);
        assert_eq!(appointment.servico_id, manicure);
    }

    #[tokio::test]
    async fn no_eligible_employee_for_service_is_rejected() {
        let mut store = FakeStore::default();
        let corte = store.add_service("Corte");
        store.add_service("Manicure");
        store.add_employee("A", &[corte]);
        let (service, _) = service_with(store);

        let mut req = request();
        req.servico_nome = Some("Manicure".into());
        req.funcionario_nome = Some("A".into());

        let err = service.book_from_webhook(req).await.unwrap_err();
        assert!(matches!(err, AppError::NoEligibleEmployee));
    }

    #[tokio::test]
    async fn without_services_nothing_is_booked() {
        let (service, _) = service_with(FakeStore::default());
        let err = service.book_from_webhook(request()).await.unwrap_err();
        assert!(matches!(err, AppError::NoServicesConfigured));
    }

    #[tokio::test]
    async fn missing_identifiers_fall_back_to_first_by_name() {
        let mut store = FakeStore::default();
        let manicure = store.add_service("Manicure");
        let corte = store.add_service("Corte");
        store.add_employee("Zélia", &[corte, manicure]);
        let carla = store.add_employee("Carla", &[corte]);
        let (service, _) = service_with(store);

        let appointment = service.book_from_webhook(request()).await.unwrap();
        assert_eq!(appointment.servico_id, corte);
        assert_eq!(appointment.funcionario_id, carla);
        assert_eq!(appointment.status, AppointmentStatus::Pendente);
        assert!(!appointment.pago);
    }

    #[tokio::test]
    async fn unknown_ids_fall_through_to_names() {
        let mut store = FakeStore::default();
        let corte = store.add_service("Corte");
        let escova = store.add_service("Escova Progressiva");
        store.add_employee("Ana", &[corte, escova]);
        let bia = store.add_employee("Bia", &[escova]);
        let (service, _) = service_with(store);

        let mut req = request();
        req.servico_id = Some(Uuid::new_v4());
        req.servico_nome = Some("progressiva".into());
        req.funcionario_id = Some(Uuid::new_v4());
        req.funcionario_nome = Some("bi".into());

        let appointment = service.book_from_webhook(req).await.unwrap();
        assert_eq!(appointment.servico_id, escova);
        assert_eq!(appointment.funcionario_id, bia);
    }

    #[tokio::test]
    async fn blocked_window_rejects_only_inside_it() {
        let mut store = FakeStore::default();
        let corte = store.add_service("Corte");
        let ana = store.add_employee("Ana", &[corte]);
        store.block(ana, 2, "09:00", "12:00");
        let (service, _) = service_with(store);

        let err = service.book_from_webhook(request()).await.unwrap_err();
        assert!(matches!(err, AppError::EmployeeUnavailable));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);

        let mut req = request();
        req.hora_agendamento = time("13:00");
        assert!(service.book_from_webhook(req).await.is_ok());
    }

    #[tokio::test]
    async fn same_payload_twice_conflicts() {
        let mut store = FakeStore::default();
        let corte = store.add_service("Corte");
        store.add_employee("Ana", &[corte]);
        let (service, fake) = service_with(store);

        assert!(service.book_from_webhook(request()).await.is_ok());
        let err = service.book_from_webhook(request()).await.unwrap_err();
        assert!(matches!(err, AppError::SlotTaken));
        assert_eq!(fake.appointments.lock().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_appointment_frees_the_slot() {
        let mut store = FakeStore::default();
        let corte = store.add_service("Corte");
        store.add_employee("Ana", &[corte]);
        let (service, fake) = service_with(store);

        service.book_from_webhook(request()).await.unwrap();
        fake.appointments.lock()[0].status = AppointmentStatus::Cancelado;
        assert!(service.book_from_webhook(request()).await.is_ok());
    }

    #[tokio::test]
    async fn out_of_hours_is_rejected_before_any_write() {
        let mut store = FakeStore::default();
        let corte = store.add_service("Corte");
        store.add_employee("Ana", &[corte]);
        let (service, fake) = service_with(store);

        for hora in ["07:59", "20:00", "21:30"] {
            let mut req = request();
            req.hora_agendamento = time(hora);
            let err = service.book_from_webhook(req).await.unwrap_err();
            assert!(matches!(err, AppError::OutsideBusinessHours));
        }
        assert!(fake.appointments.lock().is_empty());
    }

    #[tokio::test]
    async fn direct_booking_is_confirmed_and_checked() {
        let mut store = FakeStore::default();
        let corte = store.add_service("Corte");
        let manicure = store.add_service("Manicure");
        let ana = store.add_employee("Ana", &[corte]);
        let (service, _) = service_with(store);

        let booking = DirectBooking {
            cliente_nome: "Maria Souza".into(),
            cliente_telefone: "11999999999".into(),
            funcionario_id: ana,
            servico_id: corte,
            data_agendamento: tuesday(),
            hora_agendamento: time("15:30"),
        };
        let appointment = service.book_direct(booking.clone()).await.unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Confirmado);

        let err = service
            .book_direct(DirectBooking {
                servico_id: manicure,
                hora_agendamento: time("16:00"),
                ..booking.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmployeeNotEnabled));

        let err = service
            .book_direct(DirectBooking {
                servico_id: Uuid::new_v4(),
                ..booking
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));
    }

    #[tokio::test]
    async fn available_times_skip_blocks_and_bookings() {
        let mut store = FakeStore::default();
        let corte = store.add_service("Corte");
        let ana = store.add_employee("Ana", &[corte]);
        store.block(ana, 2, "09:00", "12:00");
        let (service, _) = service_with(store);

        let mut req = request();
        req.hora_agendamento = time("14:00");
        service.book_from_webhook(req).await.unwrap();

        let horarios = service.available_times(ana, tuesday()).await.unwrap();
        assert_eq!(horarios.first().map(String::as_str), Some("08:00"));
        assert_eq!(horarios.last().map(String::as_str), Some("19:30"));
        assert!(horarios.contains(&"08:30".to_string()));
        assert!(horarios.contains(&"12:00".to_string()));
        assert!(!horarios.contains(&"09:00".to_string()));
        assert!(!horarios.contains(&"11:30".to_string()));
        assert!(!horarios.contains(&"14:00".to_string()));
        // 24 slots no dia, 6 bloqueados, 1 reservado
        assert_eq!(horarios.len(), 17);
    }

    #[test]
    fn weekday_index_starts_on_sunday() {
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2025, 1, 19).unwrap()), 0);
        assert_eq!(weekday_index(tuesday()), 2);
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2025, 1, 25).unwrap()), 6);
    }
}
