//! Health command handler.

use super::ConnectionArgs;
use crate::Settings;
use fanout_client::create_client;
use fanout_error::FanoutResult;
use fanout_interface::GenerationClient;
use tracing::instrument;

/// Handles the health command.
#[instrument(skip_all)]
pub async fn handle_health_command(args: ConnectionArgs) -> FanoutResult<()> {
    let settings = Settings::load(&args.overrides())?;
    let client = create_client(settings.address(), settings.transport(), settings.timeout())?;

    let outcome = client.health().await;
    client.close();
    outcome?;

    println!("{} is ready ({})", settings.address(), settings.transport());
    Ok(())
}
