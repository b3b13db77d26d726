use anyhow::Result;
use kunci::cli::{actions::Action, start::start, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let action = start()?;

    let result = match action {
        Action::Server(args) => kunci::cli::actions::server::execute(args).await,
    };

    telemetry::shutdown_tracer();

    result
}
