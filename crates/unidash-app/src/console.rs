//! Facade assembling the console's collaborators.

use std::sync::Arc;

use tracing::info;
use unidash_config::{
    BuildTimeProvider, Clock, ConfigProvider, ConfigResolver, FileLocalOverride,
    FileSettingsStore, LocalOverride, LocalOverrideProvider, RuntimeInjectedProvider,
    SettingsService, SettingsStore, SettingsStoreProvider, SystemClock,
};
use unidash_core::{ConsoleError, Instance};
use unidash_gateway::{GatewayClient, GatewayTransport, HttpGateway};
use unidash_lifecycle::InstanceLifecycle;

use crate::config::ConsoleConfig;
use crate::dashboard::DashboardSummary;
use crate::error::AppError;

/// Entry point used by the CLI.
pub struct Console {
    resolver: Arc<ConfigResolver>,
    settings: SettingsService,
    lifecycle: InstanceLifecycle,
}

impl Console {
    /// Builds a console over file-backed stores and the HTTP gateway.
    ///
    /// Providers are consulted in order: local override, settings store,
    /// runtime file, build-time values.
    ///
    /// # Errors
    /// Returns [`AppError::Gateway`] when the HTTP client cannot be built.
    pub fn open(config: &ConsoleConfig) -> Result<Self, AppError> {
        let transport: Arc<dyn GatewayTransport> = Arc::new(HttpGateway::new(config.http_timeout)?);
        let store: Arc<dyn SettingsStore> = Arc::new(FileSettingsStore::new(config.settings_path()));
        let local_override: Arc<dyn LocalOverride> =
            Arc::new(FileLocalOverride::new(config.override_path()));

        info!(
            data_dir = %config.data_dir.display(),
            runtime_config = %config.runtime_config_path.display(),
            "opening console"
        );
        Ok(Self::assemble(
            store,
            local_override,
            RuntimeInjectedProvider::new(&config.runtime_config_path),
            BuildTimeProvider::from_build_env(),
            transport,
            Arc::new(SystemClock),
        ))
    }

    /// Builds a console from explicit collaborators.
    pub fn assemble(
        store: Arc<dyn SettingsStore>,
        local_override: Arc<dyn LocalOverride>,
        runtime: RuntimeInjectedProvider,
        build_time: BuildTimeProvider,
        transport: Arc<dyn GatewayTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let providers: Vec<Arc<dyn ConfigProvider>> = vec![
            Arc::new(LocalOverrideProvider::new(local_override.clone())),
            Arc::new(SettingsStoreProvider::new(store.clone())),
            Arc::new(runtime),
            Arc::new(build_time),
        ];
        let resolver = Arc::new(ConfigResolver::new(providers, clock.clone()));
        let settings = SettingsService::new(store, local_override, resolver.clone());
        let lifecycle = InstanceLifecycle::new(GatewayClient::new(resolver.clone(), transport), clock);

        Self {
            resolver,
            settings,
            lifecycle,
        }
    }

    /// Shared configuration resolver.
    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Settings service.
    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    /// Instance lifecycle.
    pub fn lifecycle(&self) -> &InstanceLifecycle {
        &self.lifecycle
    }

    /// Lists instances with headline counts.
    ///
    /// # Errors
    /// Returns [`ConsoleError::Configuration`] when no admin token is set.
    pub async fn dashboard(&self) -> Result<(Vec<Instance>, DashboardSummary), ConsoleError> {
        let instances = self.lifecycle.list_all().await?;
        let summary = DashboardSummary::from_instances(&instances);
        Ok((instances, summary))
    }

    /// Locates an instance for an instance-scoped command.
    ///
    /// With an explicit `token` the instance is read through its own status
    /// endpoint; otherwise it is looked up by id or name in the account list.
    ///
    /// # Errors
    /// - [`AppError::InstanceNotFound`] when nothing matches.
    /// - [`AppError::Console`] when the lookup call fails.
    pub async fn locate(&self, id_or_name: &str, token: Option<&str>) -> Result<Instance, AppError> {
        if let Some(token) = token {
            let probe = Instance::new(id_or_name, id_or_name).with_token(token);
            return Ok(self.lifecycle.fetch_status(&probe).await?);
        }

        self.lifecycle
            .list_all()
            .await?
            .into_iter()
            .find(|instance| instance.id == id_or_name || instance.name == id_or_name)
            .ok_or_else(|| AppError::InstanceNotFound(id_or_name.to_string()))
    }
}
