//! Test context for unified test setup
//!
//! Starts a fake Strapi server and builds every service against it.

use std::sync::Once;

use instructor_hub::{config::Settings, ServiceFactory};
use wiremock::MockServer;

use super::strapi_mock::FakeStrapi;

static LOGGING: Once = Once::new();

/// Unified test context that manages all test components
pub struct TestContext {
    pub server: MockServer,
    pub strapi: FakeStrapi,
    pub settings: Settings,
    pub services: ServiceFactory,
}

impl TestContext {
    /// Create a new test context with default settings
    pub async fn new() -> Self {
        Self::new_with(|_| {}).await
    }

    /// Create a new test context, adjusting settings before services are built
    pub async fn new_with(configure: impl FnOnce(&mut Settings)) -> Self {
        LOGGING.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter("instructor_hub=debug")
                .with_test_writer()
                .try_init();
        });

        let (server, strapi) = FakeStrapi::start().await;

        let mut settings = Settings::default();
        settings.strapi.base_url = server.uri();
        // Small pages so multi-page listings are exercised.
        settings.strapi.page_size = 2;
        configure(&mut settings);

        let services = ServiceFactory::new(settings.clone()).expect("services should build");

        Self {
            server,
            strapi,
            settings,
            services,
        }
    }
}
