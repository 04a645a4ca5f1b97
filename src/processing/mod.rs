pub mod processor;

pub use processor::{EmergencyProcessor, EmergencyUpdate, ReportEmergency};
