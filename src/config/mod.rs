mod settings;

pub use settings::{
    AuthConfig, FcmConfig, FirebaseConfig, FirestoreConfig, LoggingConfig, NotificationConfig,
    OtelConfig, ServerConfig, Settings,
};
