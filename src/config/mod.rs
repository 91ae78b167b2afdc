mod runner;
mod settings;

pub use runner::{CategoryOverride, RunnerConfig};
pub use settings::{
    ParserSettings, SearchSettings, SortOrder, Structure, WebhookSettings, Whitelist,
    DEFAULT_SETTINGS_PATH, SETTINGS_PATH_ENV,
};
