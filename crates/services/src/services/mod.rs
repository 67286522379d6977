pub mod calendar;
pub mod checklist;
pub mod escalation;
pub mod pdf;
pub mod provisioning;
