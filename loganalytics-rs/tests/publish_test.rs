use async_trait::async_trait;
use loganalytics_rs::ingestion::IngestionError;
use loganalytics_rs::{
    IngestionConnector, LogAnalyticsClient, LogAnalyticsConfig, LogAnalyticsError, LogsIngestion,
    ParsingResults, Settings,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Connector recording every upload made through the clients it hands out
#[derive(Clone, Default)]
struct Recorder {
    connects: Arc<AtomicUsize>,
    uploads: Arc<Mutex<Vec<(String, String, Vec<Value>)>>>,
    failing_stream: Option<String>,
}

struct RecordingClient {
    recorder: Recorder,
}

#[async_trait]
impl LogsIngestion for RecordingClient {
    async fn upload(
        &self,
        rule_id: &str,
        stream_name: &str,
        logs: &[Value],
    ) -> Result<(), IngestionError> {
        if self.recorder.failing_stream.as_deref() == Some(stream_name) {
            return Err(IngestionError::Response {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        self.recorder.uploads.lock().unwrap().push((
            rule_id.to_string(),
            stream_name.to_string(),
            logs.to_vec(),
        ));
        Ok(())
    }
}

impl IngestionConnector for Recorder {
    fn connect(&self, _config: &LogAnalyticsConfig) -> Box<dyn LogsIngestion> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Box::new(RecordingClient {
            recorder: self.clone(),
        })
    }
}

fn config() -> LogAnalyticsConfig {
    LogAnalyticsConfig::new(
        "client",
        "secret",
        "tenant",
        "https://dce.example.com",
        "dcr-1",
        "Custom-Agg_CL",
        "Custom-For_CL",
    )
}

#[tokio::test]
async fn test_aggregate_only_scenario() {
    let recorder = Recorder::default();
    let client =
        LogAnalyticsClient::with_connector(config(), Arc::new(recorder.clone())).unwrap();

    let record_a = json!({"report_metadata": {"report_id": "A"}});
    let results = ParsingResults::new(vec![record_a.clone()], vec![]);

    client.publish_results(&results, true, true).await.unwrap();

    assert_eq!(recorder.connects.load(Ordering::SeqCst), 1);
    let uploads = recorder.uploads.lock().unwrap().clone();
    assert_eq!(
        uploads,
        vec![(
            "dcr-1".to_string(),
            "Custom-Agg_CL".to_string(),
            vec![record_a]
        )]
    );
}

#[tokio::test]
async fn test_forensic_still_uploaded_when_aggregate_disabled() {
    let recorder = Recorder::default();
    let client =
        LogAnalyticsClient::with_connector(config(), Arc::new(recorder.clone())).unwrap();

    let results = ParsingResults::new(
        vec![json!({"report_id": "A"})],
        vec![json!({"feedback_type": "auth-failure"})],
    );

    client.publish_results(&results, false, true).await.unwrap();

    let uploads = recorder.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].1, "Custom-For_CL");
}

#[tokio::test]
async fn test_failed_aggregate_upload_is_reported() {
    let recorder = Recorder {
        failing_stream: Some("Custom-Agg_CL".to_string()),
        ..Recorder::default()
    };
    let client =
        LogAnalyticsClient::with_connector(config(), Arc::new(recorder.clone())).unwrap();

    let results = ParsingResults::new(
        vec![json!({"report_id": "A"})],
        vec![json!({"feedback_type": "auth-failure"})],
    );

    let err = client.publish_results(&results, true, true).await.unwrap_err();

    assert_eq!(err.to_string(), "Upload failed: (500) Internal Server Error");
    assert!(recorder.uploads.lock().unwrap().is_empty());
}

#[test]
fn test_incomplete_config_rejected_before_any_connection() {
    let recorder = Recorder::default();
    let mut conf = config();
    conf.dce = String::new();

    let result = LogAnalyticsClient::with_connector(conf, Arc::new(recorder.clone()));

    assert!(matches!(result, Err(LogAnalyticsError::Configuration(_))));
    assert_eq!(recorder.connects.load(Ordering::SeqCst), 0);
}

#[test]
fn test_malformed_settings_file() {
    let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    std::fs::write(file.path(), "[log_analytics]\nclient_id = \n").unwrap();

    let err = Settings::load(file.path()).unwrap_err();
    assert!(matches!(err, LogAnalyticsError::Configuration(_)));
}
