pub mod building;
pub mod checklist;
pub mod client;
pub mod elevator;
pub mod emergency;
pub mod maintenance;
pub mod service_request;
pub mod user;
pub mod work_order;
