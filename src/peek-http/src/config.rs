// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration for a Peek controller client.
//!
//! Loaded from the `[peek-http]` section of `peek-rs.toml`:
//!
//! ```toml
//! [peek-http.device]
//! host = "10.179.107.129"
//! host_id = "2406"
//!
//! [peek-http.inputs]
//! all = ["MPP_MAN", "MPP_PH1", "MPP_PH2"]
//! stages = ["MPP_PH1", "MPP_PH2"]
//! manual = "MPP_MAN"
//! phase_prefix = "MPP_PH"
//! field_prefix = "SIGNAL_"
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use peek_app::ConfigFile;
use peek_core::{
    ControllerProfile, Credentials, FixedAttempts, NoRetry, PageParsers, ProfileError,
    RetryPolicy,
};

use crate::controller::{PeekController, SetupError};
use crate::page::PeekRoutes;
use crate::transport::{HttpTransport, DEFAULT_MAX_IN_FLIGHT, DEFAULT_REQUEST_DEADLINE};

/// Top-level client configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeekClientConfig {
    pub general: GeneralConfig,
    pub device: DeviceConfig,
    pub inputs: InputsConfig,
    pub credentials: CredentialsConfig,
    pub transport: TransportConfig,
    pub routes: PeekRoutes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Host, `host:port` or base URL of the controller web UI.
    pub host: Option<String>,
    /// Identifier reported alongside results.
    pub host_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    /// Every input name on the inputs page.
    pub all: Vec<String>,
    /// Stage inputs; phase number is the trailing digits of the name.
    pub stages: Vec<String>,
    /// Manual override input.
    pub manual: String,
    /// Prefix of stage input names (`MPP_PH` for `MPP_PH3`).
    pub phase_prefix: String,
    /// Prefix of `par_name` in set-inputs commands.
    pub field_prefix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub cookie_name: String,
    pub cookie_value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Simultaneous requests allowed against the device.
    pub max_in_flight: usize,
    /// Connection setup limit for page polls.
    pub get_connect_timeout_ms: u64,
    /// Connection setup limit for set-inputs commands.
    pub post_connect_timeout_ms: u64,
    /// Limit on a whole exchange once connected.
    pub request_deadline_ms: u64,
    /// Attempts per command batch, including the first.
    pub batch_attempts: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            get_connect_timeout_ms: 400,
            post_connect_timeout_ms: 1000,
            request_deadline_ms: DEFAULT_REQUEST_DEADLINE.as_millis() as u64,
            batch_attempts: 1,
        }
    }
}

impl ConfigFile for PeekClientConfig {
    fn section_key() -> &'static str {
        "peek-http"
    }
}

impl PeekClientConfig {
    pub fn profile(&self) -> Result<ControllerProfile, ProfileError> {
        ControllerProfile::new(
            self.inputs.all.iter().cloned(),
            &self.inputs.stages,
            self.inputs.manual.clone(),
            self.inputs.phase_prefix.clone(),
            self.inputs.field_prefix.clone(),
            Credentials::new(
                self.credentials.cookie_name.clone(),
                self.credentials.cookie_value.clone(),
            ),
        )
    }

    pub fn retry_policy(&self) -> Arc<dyn RetryPolicy> {
        if self.transport.batch_attempts <= 1 {
            Arc::new(NoRetry)
        } else {
            Arc::new(FixedAttempts::new(self.transport.batch_attempts))
        }
    }

    /// Install the global subscriber at `general.log_level`.
    pub fn init_logging(&self) -> bool {
        peek_app::init_logging(self.general.log_level.as_deref())
    }

    pub fn build_transport(&self) -> Result<HttpTransport, SetupError> {
        let transport = HttpTransport::with_connect_timeouts(
            self.transport.max_in_flight,
            Duration::from_millis(self.transport.get_connect_timeout_ms),
            Duration::from_millis(self.transport.post_connect_timeout_ms),
        )
        .map_err(|e| SetupError::Client(e.to_string()))?;
        Ok(transport.with_deadline(Duration::from_millis(self.transport.request_deadline_ms)))
    }

    /// Build a controller with its own HTTP sessions.
    pub fn build_controller(&self, parsers: PageParsers) -> Result<PeekController, SetupError> {
        let host = self.device.host.clone().ok_or(SetupError::MissingHost)?;
        let profile = Arc::new(self.profile()?);
        let transport = self.build_transport()?;

        let mut controller = PeekController::new(host, transport, profile, parsers)
            .with_routes(self.routes.clone())
            .with_retry(self.retry_policy());
        if let Some(host_id) = &self.device.host_id {
            controller = controller.with_host_id(host_id.clone());
        }
        Ok(controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_parsers;
    use peek_app::config::parse_section;
    use std::path::Path;

    const SAMPLE: &str = r#"
[peek-http.general]
log_level = "debug"

[peek-http.device]
host = "10.179.107.129"
host_id = "2406"

[peek-http.inputs]
all = ["MPP_MAN", "MPP_PH1", "MPP_PH2", "MPP_PH3", "MPP_FL"]
stages = ["MPP_PH1", "MPP_PH2", "MPP_PH3"]
manual = "MPP_MAN"
phase_prefix = "MPP_PH"
field_prefix = "SIGNAL_"

[peek-http.credentials]
cookie_name = "session"
cookie_value = "secret"

[peek-http.transport]
batch_attempts = 2
"#;

    fn sample() -> PeekClientConfig {
        parse_section(SAMPLE, PeekClientConfig::section_key(), Path::new("peek-rs.toml"))
            .expect("parse")
            .expect("section present")
    }

    #[test]
    fn test_defaults() {
        let cfg = PeekClientConfig::default();
        assert_eq!(cfg.transport.max_in_flight, 6);
        assert_eq!(cfg.transport.get_connect_timeout_ms, 400);
        assert_eq!(cfg.transport.post_connect_timeout_ms, 1000);
        assert_eq!(cfg.transport.request_deadline_ms, 30_000);
        assert_eq!(cfg.transport.batch_attempts, 1);
        assert_eq!(cfg.retry_policy().max_attempts(), 1);
        assert_eq!(cfg.routes, PeekRoutes::default());
    }

    #[test]
    fn test_sample_profile() {
        let cfg = sample();
        assert_eq!(cfg.general.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.transport.max_in_flight, 6);
        assert_eq!(cfg.retry_policy().max_attempts(), 2);

        let profile = cfg.profile().expect("profile");
        assert_eq!(profile.stage_inputs().len(), 3);
        assert_eq!(
            profile.credentials().cookie_header().as_deref(),
            Some("session=secret")
        );
    }

    #[test]
    fn test_build_controller() {
        let controller = sample().build_controller(fixture_parsers()).expect("controller");
        assert_eq!(controller.base_url(), "http://10.179.107.129");
        assert_eq!(controller.host_id(), Some("2406"));
    }

    #[test]
    fn test_init_logging_from_general() {
        let cfg = sample();
        let _ = cfg.init_logging();
        // A subscriber is installed by now; later calls keep it.
        assert!(!cfg.init_logging());
    }

    #[test]
    fn test_build_transport_uses_pool_size() {
        let mut cfg = sample();
        cfg.transport.max_in_flight = 3;
        let transport = cfg.build_transport().expect("transport");
        assert_eq!(transport.available_permits(), 3);
    }

    #[test]
    fn test_missing_host() {
        let mut cfg = sample();
        cfg.device.host = None;
        assert!(matches!(
            cfg.build_controller(fixture_parsers()),
            Err(SetupError::MissingHost)
        ));
    }

    #[test]
    fn test_invalid_profile() {
        let mut cfg = sample();
        cfg.inputs.manual = "NOPE".into();
        assert!(matches!(
            cfg.build_controller(fixture_parsers()),
            Err(SetupError::Profile(ProfileError::ManualNotInInputs(_)))
        ));
    }
}
