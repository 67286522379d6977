pub mod calendar;
pub mod checklist;
pub mod clients;
pub mod elevators;
pub mod emergencies;
pub mod health;
pub mod maintenance;
pub mod reports;
pub mod service_requests;
pub mod users;
pub mod work_orders;
