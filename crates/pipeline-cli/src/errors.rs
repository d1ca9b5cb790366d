//! Terminal error reporting setup, mirroring the workspace's `color-eyre`
//! convention.

use eyre::Result;
use itertools::Itertools;

/// Configure `color-eyre`'s report sections.
///
/// `details` is a comma-separated list drawn from `location`, `span`,
/// `env`, or the shorthand values `auto` (all sections in debug builds,
/// none in release) and `all`/`none`.
pub fn setup(details: &str) -> Result<()> {
    let all = vec!["location", "span", "env"];

    let sections = match details {
        "auto" => {
            if cfg!(debug_assertions) {
                all
            } else {
                vec![]
            }
        }
        "all" => all,
        "none" => vec![],
        other => other.split(',').collect_vec(),
    };

    if !sections.contains(&"span") {
        std::env::set_var("RUST_SPANTRACE", "0");
    }

    color_eyre::config::HookBuilder::default()
        .display_location_section(sections.contains(&"location"))
        .display_env_section(sections.contains(&"env"))
        .install()?;

    Ok(())
}
