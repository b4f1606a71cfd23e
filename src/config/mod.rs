mod settings;

pub use settings::{
    LoggingConfig, PlacesConfig, RegionConfig, SearchConfig, Settings, WeatherConfig,
};
