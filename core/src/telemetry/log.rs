use log::{info, warn};

/// Tagged logger for the controllers that drive a store. The store itself
/// never logs.
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.component, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.component, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("clicks")
    }
}
