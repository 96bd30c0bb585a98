mod logging;

pub use logging::init_logging;

use kdc_proxy_domain::{CliOverrides, Config};

/// Runs before logging exists; failures surface through the returned error.
pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)?;
    config.validate()?;
    Ok(config)
}
