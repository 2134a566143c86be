//! Notifier service: turns email jobs from the bus into outbound mail
//!
//! Consumes `emails.send`, renders the named template, and hands the
//! result to the configured `Mailer`. The bus is fire-and-forget, so
//! rendering is a pure function of the job payload: a duplicate job
//! produces a byte-identical email.

pub mod mailer;
pub mod service;
pub mod template;

pub use mailer::{LogMailer, Mailer};
pub use service::Notifier;
