use std::process::ExitCode;

use isoquest_engine::{run_app, AppError};
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app(app.config, app.game) {
        return report_failure(&err);
    }

    info!("=== Isoquest Shutdown ===");
    ExitCode::SUCCESS
}

pub(crate) fn report_failure(err: &AppError) -> ExitCode {
    error!(error = %err, "startup_failed");
    ExitCode::FAILURE
}
