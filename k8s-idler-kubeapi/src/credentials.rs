use std::str::FromStr;

use kube::config;

/// Where the cluster credentials come from.
///
/// Selected once at startup and consulted before the batch begins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Credentials {
    /// In-cluster service account if available, local kubeconfig otherwise
    #[default]
    Infer,
    /// Service account token mounted into the pod
    InCluster,
    /// Local kubeconfig, optionally pinned to a context
    Kubeconfig { context: Option<String> },
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("unknown credentials source {0:?}, expected one of: infer, in-cluster, kubeconfig")]
    UnknownSource(String),

    #[error("failed to infer cluster configuration: {0}")]
    Infer(#[from] config::InferConfigError),

    #[error("failed to load in-cluster configuration: {0}")]
    InCluster(#[from] config::InClusterError),

    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] config::KubeconfigError),

    #[error("failed to create client: {0}")]
    Client(#[from] kube::Error),
}

impl Credentials {
    /// Pin a kubeconfig source to `context`, other sources are left untouched
    pub fn with_context(self, context: Option<String>) -> Self {
        match self {
            Self::Kubeconfig { .. } => Self::Kubeconfig { context },
            other => other,
        }
    }

    pub async fn config(&self) -> Result<kube::Config, CredentialsError> {
        let config = match self {
            Self::Infer => kube::Config::infer().await?,
            Self::InCluster => kube::Config::incluster()?,
            Self::Kubeconfig { context } => {
                let options = config::KubeConfigOptions {
                    context: context.clone(),
                    ..config::KubeConfigOptions::default()
                };
                kube::Config::from_kubeconfig(&options).await?
            }
        };
        tracing::debug!(source = ?self, cluster_url = %config.cluster_url, "Loaded cluster configuration");
        Ok(config)
    }

    pub async fn client(&self) -> Result<kube::Client, CredentialsError> {
        let config = self.config().await?;
        let client = kube::Client::try_from(config)?;
        Ok(client)
    }
}

impl FromStr for Credentials {
    type Err = CredentialsError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_ascii_lowercase().as_str() {
            "" | "infer" => Ok(Self::Infer),
            "in-cluster" | "incluster" => Ok(Self::InCluster),
            "kubeconfig" => Ok(Self::Kubeconfig { context: None }),
            _ => Err(CredentialsError::UnknownSource(text.to_string())),
        }
    }
}
