pub mod analyze;
pub mod auth;
pub mod capture;
pub mod gallery;
pub mod job;

use qlens_core::event_log::EventLogHandle;

/// Prints the event log the way the UI log panel shows it: newest first.
pub fn print_log(log: &EventLogHandle) {
    for entry in log.snapshot() {
        match &entry.detail {
            Some(detail) => println!("  [{}] {} — {}", entry.category, entry.message, detail),
            None => println!("  [{}] {}", entry.category, entry.message),
        }
    }
}
