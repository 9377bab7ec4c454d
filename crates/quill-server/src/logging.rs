use tracing_subscriber::EnvFilter;

use crate::config::Env;

/// Install the global subscriber. `RUST_LOG` wins over the per-env default.
/// Local runs get human-readable output; dev and prod emit JSON lines.
pub fn init(env: Env) {
    let default_filter = match env {
        Env::Local | Env::Dev => "quill=debug,quill_api=debug,quill_db=debug,quill_auth=debug,tower_http=debug",
        Env::Prod => "info,tower_http=info",
    };

    let builder = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
    );

    match env {
        Env::Local => builder.init(),
        Env::Dev | Env::Prod => builder.json().init(),
    }
}
