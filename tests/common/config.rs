//! Scan configuration pointed at a mock Web API and a temporary output directory

use std::path::Path;
use std::time::Duration;

use steam_sweep::Config;
use wiremock::MockServer;

/// API key every mock expects
pub const TEST_KEY: &str = "TESTKEY";

/// A fast configuration scanning `start..=end` against `server`
pub fn test_config(server: &MockServer, output_dir: &Path, start: u32, end: u32) -> Config {
    let mut config = Config::default();
    config.scan.start_sequence = start;
    config.scan.end_sequence = end;
    config.scan.worker_count = 2;
    config.scan.pacing_delay = Duration::from_millis(1);
    config.api.api_key = TEST_KEY.to_string();
    config.api.base_url = format!("{}/", server.uri());
    config.api.request_timeout = Duration::from_secs(2);
    config.api.rate_limit_cooldown = Duration::from_millis(50);
    config.retry.max_attempts = 1;
    config.retry.initial_delay = Duration::from_millis(10);
    config.retry.max_delay = Duration::from_millis(10);
    config.output.output_dir = output_dir.to_path_buf();
    config
}
