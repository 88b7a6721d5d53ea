use config::ConfigError;
use k8s_idler_engine::DEFAULT_CPU_ACTIVITY_THRESHOLD;
use k8s_idler_engine::IdlerConfig;
use k8s_idler_kubeapi::Credentials;
use serde::Deserialize;

/// Environment variables read at startup
const VARIABLES: [&str; 6] = [
    "LABEL_SELECTOR",
    "CPU_ACTIVITY_THRESHOLD",
    "LOG_LEVEL",
    "UNIDLER_SERVICE_HOST",
    "KUBE_CREDENTIALS",
    "KUBE_CONTEXT",
];

/// Raw values of [`VARIABLES`], validated by [`Environment::settings`]
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Environment {
    label_selector: Option<String>,
    cpu_activity_threshold: Option<String>,
    log_level: Option<String>,
    unidler_service_host: Option<String>,
    kube_credentials: Option<String>,
    kube_context: Option<String>,
}

#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) idler: IdlerConfig,
    pub(crate) credentials: Credentials,
}

impl Environment {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self, ConfigError> {
        let vars = vars
            .into_iter()
            .filter(|(key, _)| VARIABLES.contains(&key.as_str()))
            .collect::<config::Map<_, _>>();
        config::Config::builder()
            .add_source(config::Environment::default().source(Some(vars)))
            .build()?
            .try_deserialize()
    }

    pub(crate) fn log_level(&self) -> Option<&str> {
        non_empty(self.log_level.as_deref())
    }

    /// Validated settings, invalid values are replaced by defaults with a warning
    pub(crate) fn settings(&self) -> Settings {
        let defaults = IdlerConfig::default();
        let label_selector = self
            .label_selector
            .clone()
            .unwrap_or(defaults.label_selector);
        let unidler_service_host = non_empty(self.unidler_service_host.as_deref())
            .map_or(defaults.unidler_service_host, str::to_string);
        let idler = IdlerConfig {
            label_selector,
            cpu_activity_threshold: self.cpu_activity_threshold(),
            unidler_service_host,
        };
        let credentials = self.credentials();
        Settings { idler, credentials }
    }

    fn cpu_activity_threshold(&self) -> i32 {
        let Some(value) = self.cpu_activity_threshold.as_deref() else {
            return DEFAULT_CPU_ACTIVITY_THRESHOLD;
        };
        value.trim().parse().unwrap_or_else(|err| {
            tracing::warn!(
                value,
                %err,
                "Invalid value for CPU_ACTIVITY_THRESHOLD, using default {DEFAULT_CPU_ACTIVITY_THRESHOLD}"
            );
            DEFAULT_CPU_ACTIVITY_THRESHOLD
        })
    }

    fn credentials(&self) -> Credentials {
        let context = non_empty(self.kube_context.as_deref()).map(str::to_string);
        self.kube_credentials
            .as_deref()
            .unwrap_or_default()
            .parse::<Credentials>()
            .unwrap_or_else(|err| {
                tracing::warn!(%err, "Invalid value for KUBE_CREDENTIALS, using default");
                Credentials::default()
            })
            .with_context(context)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
