use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::platform::Platform;
use crate::relay::NotificationRelayHandler;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub relay: Arc<NotificationRelayHandler>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, platform: &Platform) -> Self {
        let relay = platform.relay_handler(&settings);
        Self::with_relay(settings, relay)
    }

    /// Build state around an existing relay handler
    pub fn with_relay(settings: Settings, relay: NotificationRelayHandler) -> Self {
        Self {
            settings: Arc::new(settings),
            relay: Arc::new(relay),
            start_time: Instant::now(),
        }
    }
}
