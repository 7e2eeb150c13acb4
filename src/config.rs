use std::sync::LazyLock;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::time::{FestivalWeek, Weekday};
use crate::views::Zoom;

static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    let config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file("encore.toml"))
        .merge(Env::prefixed("ENCORE_"))
        .extract::<Config>();
    match config {
        Ok(config) => config,
        Err(err) => {
            panic!("CONFIG ERROR: {err}");
        }
    }
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bind_address: String,
    /// Location of the festival schedule JSON document.
    pub schedule_path: String,
    /// Location of the persisted like blob.
    pub likes_path: String,
    pub default_set_length_minutes: u32,
    /// Ordered days the festival spans; the first entry is the week origin.
    pub festival_days: Vec<Weekday>,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8650".to_string(),
            schedule_path: "festival_schedule.json".to_string(),
            likes_path: "liked_performances.json".to_string(),
            default_set_length_minutes: 90,
            festival_days: vec![
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
                Weekday::Saturday,
                Weekday::Sunday,
                Weekday::Monday,
            ],
            zoom_min: 0.5,
            zoom_max: 2.0,
            zoom_step: 0.25,
        }
    }
}

impl Config {
    pub fn week(&self) -> FestivalWeek {
        FestivalWeek::new(self.festival_days.clone())
    }

    pub fn zoom(&self) -> Zoom {
        Zoom::new(self.zoom_min, self.zoom_max, self.zoom_step)
    }
}

pub fn get_config() -> &'static Config {
    &*CONFIG
}
