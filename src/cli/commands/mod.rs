//! CLI command implementations.

mod config;
mod doctor;
mod run;
mod vocab;

pub use config::run_config;
pub use doctor::run_doctor;
pub use run::run_lesson;
pub use vocab::run_vocab;
