//! Mapping from the TOML schema (`balancer_config`) to the runtime
//! `SessionCfg`.

use crate::config::SessionCfg;

impl From<&balancer_config::Config> for SessionCfg {
    fn from(cfg: &balancer_config::Config) -> Self {
        Self {
            tick_ms: cfg.trajectory.tick_ms,
            default_frequency_hz: cfg.trajectory.default_frequency_hz,
            radius_margin: cfg.trajectory.radius_margin,
            target_step: cfg.ui.target_step,
            series_capacity: cfg.series.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_all_runtime_knobs() {
        let toml = r#"
[trajectory]
tick_ms = 20
default_frequency_hz = 2.0
radius_margin = 3.0

[ui]
target_step = 1.0

[series]
capacity = 64
"#;
        let file_cfg = balancer_config::load_toml(toml).unwrap();
        let cfg = SessionCfg::from(&file_cfg);
        assert_eq!(cfg.tick_ms, 20);
        assert_eq!(cfg.default_frequency_hz, 2.0);
        assert_eq!(cfg.radius_margin, 3.0);
        assert_eq!(cfg.target_step, 1.0);
        assert_eq!(cfg.series_capacity, 64);
        cfg.validate().unwrap();
    }
}
