use log::warn;

use crate::config::Settings;

/// Load settings, falling back to defaults when the config is unreadable
/// or fails validation.
pub fn load_settings() -> Settings {
    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            warn!("could not load config, using defaults: {e}");
            Settings::default()
        }
    };

    if let Err(e) = settings.validate() {
        warn!("invalid config, using defaults: {e}");
        return Settings::default();
    }

    settings
}
