use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryApplicationRepository, InMemoryJobPostingRepository, LoggingProvisioner,
};
use crate::routes::with_recruitment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hr_recruitment::config::AppConfig;
use hr_recruitment::error::AppError;
use hr_recruitment::telemetry;
use hr_recruitment::workflows::recruitment::{
    Clock, DivisionRegistry, OffboardingTracker, RecruitmentService, SystemClock,
};
use hr_recruitment::workflows::roster::DivisionRosterImporter;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(roster) = args.roster.take() {
        config.recruitment.division_roster = Some(roster);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let divisions = Arc::new(DivisionRegistry::new());
    if let Some(path) = config.recruitment.division_roster.as_ref() {
        let seeded = DivisionRosterImporter::from_path(path)?.seed_registry(&divisions)?;
        info!(divisions = seeded.len(), roster = %path.display(), "division roster loaded");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.recruitment.utc_offset()));
    let recruitment_service = Arc::new(RecruitmentService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(InMemoryJobPostingRepository::default()),
        Arc::new(LoggingProvisioner::default()),
        divisions.clone(),
        clock.clone(),
    ));
    let offboarding = Arc::new(OffboardingTracker::new(divisions));

    let app = with_recruitment_routes(recruitment_service, offboarding, clock)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "recruitment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
