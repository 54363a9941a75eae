pub mod audit_service;
pub mod notification_models;

pub use audit_service::AuditService;
pub use notification_models::{Notification, TrackedMessage};
