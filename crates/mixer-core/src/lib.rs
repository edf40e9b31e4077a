#![deny(warnings)]
pub mod game;
pub mod mix;
pub mod model;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "team-mixer"
    }

    pub const fn title() -> &'static str {
        "Team Mixer"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
