//! Environment overrides for the settings file
//!
//! Kept in its own test binary: it mutates process environment.

use loganalytics_rs::{LogAnalyticsClient, Settings};

const SECRET_VAR: &str = "LOGANALYTICS__LOG_ANALYTICS__CLIENT_SECRET";

/// Removes the variable again even if an assertion fails
struct EnvVarGuard(&'static str);

impl EnvVarGuard {
    fn set(name: &'static str, value: &str) -> Self {
        std::env::set_var(name, value);
        Self(name)
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        std::env::remove_var(self.0);
    }
}

#[test]
fn test_settings_file_and_environment_override() {
    let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    std::fs::write(
        file.path(),
        r#"
[log_analytics]
client_id = "client"
client_secret = ""
tenant_id = "tenant"
dce = "https://dce.example.com"
dcr_immutable_id = "dcr-1"
dcr_aggregate_stream = "Custom-Agg_CL"
dcr_forensic_stream = "Custom-For_CL"

[publish]
save_aggregate = false
"#,
    )
    .unwrap();

    let settings = {
        let _guard = EnvVarGuard::set(SECRET_VAR, "from-env");
        Settings::load(file.path()).unwrap()
    };

    assert!(std::env::var(SECRET_VAR).is_err());
    assert_eq!(settings.log_analytics.client_secret, "from-env");
    assert_eq!(settings.log_analytics.dcr_immutable_id, "dcr-1");
    assert!(!settings.publish.save_aggregate);
    assert!(settings.publish.save_forensic);
    assert!(LogAnalyticsClient::new(settings.log_analytics).is_ok());
}
