#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Arbitrary TOML must either parse into a Config or fail cleanly;
    // validation of a parsed Config must never panic either.
    if let Ok(cfg) = toml::from_str::<balancer_config::Config>(data) {
        let _ = cfg.validate();
    }
});
