use anyhow::Context;
use chrono::Utc;
use tracing::{error, info};

use kr_realestate_digest::{
    app::ComponentRegistry,
    config::Config,
    delivery::deliver_all,
    observability,
    pipeline::RunOutcome,
    util::time::kst,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("unnamed");
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| {
                panic_info
                    .payload()
                    .downcast_ref::<String>()
                    .map(String::as_str)
            })
            .unwrap_or("unknown panic payload");

        if let Some(location) = panic_info.location() {
            error!(
                thread = thread_name,
                file = location.file(),
                line = location.line(),
                column = location.column(),
                message,
                "panic occurred"
            );
        } else {
            error!(
                thread = thread_name,
                message, "panic occurred without location information"
            );
        }
    }));

    observability::init().context("failed to initialize tracing")?;
    let config = Config::from_env().context("failed to load configuration")?;
    let registry =
        ComponentRegistry::build(&config).context("failed to build component registry")?;

    let now = Utc::now().with_timezone(&kst());
    match registry.pipeline().run(now).await {
        RunOutcome::Digest(digest) => {
            println!("{}", digest.text);
            let delivered = deliver_all(registry.sinks(), &digest).await;
            info!(
                articles = digest.articles.len(),
                delivered,
                "run finished with digest"
            );
        }
        RunOutcome::NoCandidates => {
            info!(outcome = "no_candidates", "run finished, nothing to report");
        }
        RunOutcome::NothingSelected => {
            info!(outcome = "nothing_selected", "run finished, nothing to report");
        }
    }

    Ok(())
}
