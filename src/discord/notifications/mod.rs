// Discord side of guild notifications: turns gateway events into core
// `Notification`s and delivers them.

pub mod auditor;
pub mod formatter;
pub mod notifier;
