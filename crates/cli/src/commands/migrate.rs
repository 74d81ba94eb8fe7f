use trimscout_core::config::AppConfig;

use crate::commands::{build_runtime, open_pool, CommandResult};

pub fn run(config: &AppConfig) -> CommandResult {
    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("migrate", error_class, message, exit_code);
        }
    };

    let result = runtime.block_on(async {
        let pool = open_pool(config).await?;
        pool.close().await;
        Ok::<(), crate::commands::StepFailure>(())
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}
