//! Server state shared by every request handler

use std::path::Path;
use std::sync::Arc;

use super::{Config, EmailBackend, Result};
use crate::db::DbService;
use crate::fulfillment::ports::CheckoutGateway;
use crate::fulfillment::{OrderAssembler, PaymentReconciler, Ports};
use crate::notify::{LogNotifier, Notifier, SesNotifier};
use crate::stripe::{StripeCheckout, StripeClient};

/// Cheap to clone; every field is a handle
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub ports: Ports,
    pub assembler: OrderAssembler,
    pub reconciler: PaymentReconciler,
    pub checkout: Arc<dyn CheckoutGateway>,
}

impl ServerState {
    /// Open the database and wire the configured back-ends
    pub async fn initialize(config: &Config) -> Result<Self> {
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let db = DbService::new(&config.database_path).await?;

        let notifier: Arc<dyn Notifier> = match config.email_backend {
            EmailBackend::Log => Arc::new(LogNotifier),
            EmailBackend::Ses => Arc::new(SesNotifier::from_env(&config.ses_from_email).await),
        };
        tracing::info!(backend = ?config.email_backend, "Notifier ready");

        let checkout = Arc::new(StripeCheckout::new(
            StripeClient::new(&config.stripe_secret_key, &config.stripe_api_base),
            config.checkout_settings(),
        ));

        Ok(Self::with_parts(config.clone(), db, notifier, checkout))
    }

    /// Assemble state from explicit collaborators
    pub fn with_parts(
        config: Config,
        db: DbService,
        notifier: Arc<dyn Notifier>,
        checkout: Arc<dyn CheckoutGateway>,
    ) -> Self {
        let ports = Ports::sqlite(&db, notifier);
        Self {
            config: Arc::new(config),
            assembler: OrderAssembler::new(ports.clone()),
            reconciler: PaymentReconciler::new(ports.clone()),
            db,
            ports,
            checkout,
        }
    }
}
