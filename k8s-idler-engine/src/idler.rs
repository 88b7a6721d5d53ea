use super::*;

pub const DEFAULT_CPU_ACTIVITY_THRESHOLD: i32 = 90;
pub const DEFAULT_UNIDLER_SERVICE_HOST: &str = "unidler.default.svc.cluster.local";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdlerConfig {
    /// Base label selector, the "not idled" term is always added
    pub label_selector: String,
    /// Deployments at or below this CPU percentage are idled
    pub cpu_activity_threshold: i32,
    /// `ExternalName` target of redirected Services
    pub unidler_service_host: String,
}

impl Default for IdlerConfig {
    fn default() -> Self {
        Self {
            label_selector: format!("{}=true", labels::IDLEABLE),
            cpu_activity_threshold: DEFAULT_CPU_ACTIVITY_THRESHOLD,
            unidler_service_host: DEFAULT_UNIDLER_SERVICE_HOST.to_string(),
        }
    }
}

/// One deployment that could not be evaluated or idled
#[derive(Debug)]
pub struct Failure {
    pub key: ObjectKey,
    pub error: IdleError,
}

/// Outcome of one pass over all eligible deployments
#[derive(Debug, Default)]
pub struct Report {
    pub idled: Vec<ObjectKey>,
    pub kept: Vec<ObjectKey>,
    pub failures: Vec<Failure>,
}

impl Report {
    pub fn evaluated(&self) -> usize {
        self.idled.len() + self.kept.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit code, 1 as soon as a single deployment failed
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    fn log(&self) {
        tracing::info!(
            evaluated = self.evaluated(),
            idled = self.idled.len(),
            kept = self.kept.len(),
            failed = self.failures.len(),
            "Finished idling"
        );
        if !self.is_success() {
            let failed = self
                .failures
                .iter()
                .map(|failure| failure.key.to_string())
                .collect::<Vec<_>>();
            tracing::error!(?failed, "Failed to idle {} deployments", failed.len());
        }
    }
}

/// Evaluates every eligible deployment once and idles the idle ones.
#[derive(Debug)]
pub struct Idler<A> {
    api: A,
    config: IdlerConfig,
    redirect: ServiceRedirect,
    clock: fn() -> OffsetDateTime,
}

impl<A> Idler<A>
where
    A: ClusterApi,
{
    pub fn new(api: A, config: IdlerConfig) -> Self {
        let redirect = ServiceRedirect::to(&config.unidler_service_host);
        Self {
            api,
            config,
            redirect,
            clock: OffsetDateTime::now_utc,
        }
    }

    /// Replace the wall clock used for the idled-at annotation
    pub fn with_clock(self, clock: fn() -> OffsetDateTime) -> Self {
        Self { clock, ..self }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Single pass over all eligible deployments.
    ///
    /// A failing deployment is logged and recorded in the report, the
    /// remaining deployments are still processed. Only a failure to build
    /// the index aborts the run.
    pub async fn run(&self) -> Result<Report, IndexError> {
        let index = Index::build(&self.api, &self.config.label_selector).await?;
        let transition = Transition::new(&self.api, &self.redirect);
        let mut report = Report::default();

        for workload in index.workloads() {
            let key = ObjectKey::of(&workload.metadata);
            match self.process(&transition, workload, &index).await {
                Ok(true) => report.idled.push(key),
                Ok(false) => report.kept.push(key),
                Err(error) => {
                    tracing::error!(
                        namespace = %key.namespace,
                        name = %key.name,
                        %error,
                        "Failed to idle deployment"
                    );
                    report.failures.push(Failure { key, error });
                }
            }
        }

        report.log();
        Ok(report)
    }

    async fn process(
        &self,
        transition: &Transition<'_, A>,
        workload: &appsv1::Deployment,
        index: &Index,
    ) -> Result<bool, IdleError> {
        if !should_idle(workload, index, self.config.cpu_activity_threshold)? {
            return Ok(false);
        }
        transition.idle(workload, (self.clock)()).await?;
        Ok(true)
    }
}
