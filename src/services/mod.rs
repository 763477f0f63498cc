//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod certificate;
pub mod checkin;
pub mod identity;
pub mod lifecycle;
pub mod notification;
pub mod qr;

// Re-export commonly used services
pub use auth::AuthService;
pub use certificate::CertificateService;
pub use checkin::CheckInService;
pub use identity::IdentityService;
pub use lifecycle::LifecycleService;
pub use notification::{LogNotifier, Notification, NotificationService, Notifier};
pub use qr::QrService;

use crate::config::settings::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub lifecycle_service: LifecycleService,
    pub identity_service: IdentityService,
    pub qr_service: QrService,
    pub checkin_service: CheckInService,
    pub certificate_service: CertificateService,
    pub notification_service: NotificationService,
    pub auth_service: AuthService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService, settings: Settings) -> Self {
        let notification_service = NotificationService::new(&settings);
        let identity_service = IdentityService::new(db.clone());
        let lifecycle_service = LifecycleService::new(db.clone(), notification_service.clone());
        let qr_service = QrService::new(db.clone(), settings.qr.clone());
        let checkin_service = CheckInService::new(
            db.clone(),
            identity_service.clone(),
            notification_service.clone(),
            settings.checkin.max_signature_bytes,
        );
        let certificate_service = CertificateService::new(db);

        Self {
            lifecycle_service,
            identity_service,
            qr_service,
            checkin_service,
            certificate_service,
            notification_service,
            auth_service: AuthService::new(),
        }
    }
}
