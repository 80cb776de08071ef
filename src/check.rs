use log::info;
use serde::Serialize;

use crate::{
    catalog::ImageCatalog, config::Config, pipeline::PipelineTrigger, pointer::PointerStore,
};

/// Machine-readable counterpart to [`Report::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The stored pointer already names the latest available image.
    NoChange,
    /// The pointer was updated and a pipeline execution was started.
    Triggered,
    /// The pointer was updated but starting the pipeline failed. The update
    /// is not rolled back: the parameter is the source of truth for the last
    /// known image, independent of whether a build actually ran.
    TriggerFailed,
    /// Writing the pointer failed. No trigger was attempted and the
    /// parameter still holds the previous value.
    UpdateFailed,
    /// The image lookup or the pointer read failed before any comparison.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub status: Status,
    pub message: String,
}

/// Runs one check. Every failure is folded into the report rather than
/// returned; the invocation contract is a 200 response no matter what
/// happened.
pub async fn run_check(
    config: &Config,
    catalog: &impl ImageCatalog,
    store: &impl PointerStore,
    trigger: &impl PipelineTrigger,
) -> Report {
    let available = match catalog.find_latest_available_image().await {
        Ok(id) => id,
        Err(error) => {
            return Report {
                status: Status::Failed,
                message: format!("Image lookup failed: {error}"),
            }
        }
    };

    let known = match store.read(&config.parameter_name).await {
        Ok(value) => value,
        Err(error) => {
            return Report {
                status: Status::Failed,
                message: format!("Parameter read failed: {error}"),
            }
        }
    };

    if known == available {
        info!("no new base image, {known} is still the latest");
        return Report {
            status: Status::NoChange,
            message: "No new image found".to_owned(),
        };
    }

    info!("new base image released: {available} (previously {known})");

    if let Err(error) = store.write(&config.parameter_name, &available).await {
        return Report {
            status: Status::UpdateFailed,
            message: format!("New image found. Error updating parameter: {error}"),
        };
    }

    info!(
        "parameter {name} updated, starting pipeline {pipeline}",
        name = config.parameter_name,
        pipeline = config.pipeline_name
    );

    match trigger.start(&config.pipeline_name).await {
        Ok(execution_id) => {
            info!("pipeline execution {execution_id} started");
            Report {
                status: Status::Triggered,
                message: format!(
                    "New image found. Parameter updated successfully. Pipeline[{name}] successfully triggered",
                    name = config.pipeline_name
                ),
            }
        }
        Err(error) => Report {
            status: Status::TriggerFailed,
            message: format!(
                "New image found. Parameter updated successfully. Error triggering pipeline[{name}]: {error}",
                name = config.pipeline_name
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Mutex,
    };

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{Error, Result};

    struct FakeCatalog {
        id: Option<&'static str>,
    }

    #[async_trait]
    impl ImageCatalog for FakeCatalog {
        async fn find_latest_available_image(&self) -> Result<String> {
            self.id.map(str::to_owned).ok_or(Error::NoMatchingImage)
        }
    }

    struct FakeStore {
        value: Mutex<String>,
        fail_read: bool,
        fail_write: bool,
        writes: AtomicU32,
    }

    impl FakeStore {
        fn holding(value: &str) -> Self {
            Self {
                value: Mutex::new(value.to_owned()),
                fail_read: false,
                fail_write: false,
                writes: AtomicU32::new(0),
            }
        }

        fn value(&self) -> String {
            self.value.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PointerStore for FakeStore {
        async fn read(&self, name: &str) -> Result<String> {
            if self.fail_read {
                return Err(Error::ParameterAccess {
                    name: name.to_owned(),
                    source: "access denied".into(),
                });
            }
            Ok(self.value())
        }

        async fn write(&self, name: &str, value: &str) -> Result<()> {
            if self.fail_write {
                return Err(Error::ParameterWrite {
                    name: name.to_owned(),
                    source: "rejected".into(),
                });
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            *self.value.lock().unwrap() = value.to_owned();
            Ok(())
        }
    }

    struct FakeTrigger {
        fail: bool,
        starts: AtomicU32,
    }

    impl FakeTrigger {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                starts: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PipelineTrigger for FakeTrigger {
        async fn start(&self, name: &str) -> Result<String> {
            if self.fail {
                return Err(Error::PipelineStart {
                    name: name.to_owned(),
                    source: "rejected".into(),
                });
            }
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok("execution-1".to_owned())
        }
    }

    fn config() -> Config {
        Config {
            region: "eu-west-1".to_owned(),
            parameter_name: "/images/base-ami-id".to_owned(),
            pipeline_name: "custom-ami-build".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_no_change() {
        let catalog = FakeCatalog { id: Some("ami-NEW") };
        let store = FakeStore::holding("ami-NEW");
        let trigger = FakeTrigger::new(false);

        let report = run_check(&config(), &catalog, &store, &trigger).await;

        assert_eq!(report.status, Status::NoChange);
        assert_eq!(report.message, "No new image found");
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert_eq!(trigger.starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_new_image_updates_pointer_and_triggers_pipeline() {
        let catalog = FakeCatalog { id: Some("ami-NEW") };
        let store = FakeStore::holding("ami-OLD");
        let trigger = FakeTrigger::new(false);

        let report = run_check(&config(), &catalog, &store, &trigger).await;

        assert_eq!(report.status, Status::Triggered);
        assert_eq!(
            report.message,
            "New image found. Parameter updated successfully. \
             Pipeline[custom-ami-build] successfully triggered"
        );
        assert_eq!(store.value(), "ami-NEW");
        assert_eq!(trigger.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_trigger_failure_keeps_pointer_update() {
        let catalog = FakeCatalog { id: Some("ami-NEW") };
        let store = FakeStore::holding("ami-OLD");
        let trigger = FakeTrigger::new(true);

        let report = run_check(&config(), &catalog, &store, &trigger).await;

        assert_eq!(report.status, Status::TriggerFailed);
        assert!(report.message.starts_with("New image found. Parameter updated successfully."));
        assert!(report.message.contains("Error triggering pipeline[custom-ami-build]"));
        // The pointer write is not rolled back.
        assert_eq!(store.value(), "ami-NEW");
    }

    #[tokio::test]
    async fn test_write_failure_skips_trigger() {
        let catalog = FakeCatalog { id: Some("ami-NEW") };
        let mut store = FakeStore::holding("ami-OLD");
        store.fail_write = true;
        let trigger = FakeTrigger::new(false);

        let report = run_check(&config(), &catalog, &store, &trigger).await;

        assert_eq!(report.status, Status::UpdateFailed);
        assert!(report.message.starts_with("New image found. Error updating parameter"));
        assert_eq!(store.value(), "ami-OLD");
        assert_eq!(trigger.starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_folded_into_report() {
        let catalog = FakeCatalog { id: None };
        let store = FakeStore::holding("ami-OLD");
        let trigger = FakeTrigger::new(false);

        let report = run_check(&config(), &catalog, &store, &trigger).await;

        assert_eq!(report.status, Status::Failed);
        assert!(report.message.starts_with("Image lookup failed"));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert_eq!(trigger.starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_read_failure_is_folded_into_report() {
        let catalog = FakeCatalog { id: Some("ami-NEW") };
        let mut store = FakeStore::holding("ami-OLD");
        store.fail_read = true;
        let trigger = FakeTrigger::new(false);

        let report = run_check(&config(), &catalog, &store, &trigger).await;

        assert_eq!(report.status, Status::Failed);
        assert!(report.message.starts_with("Parameter read failed"));
        assert_eq!(trigger.starts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_report_serializes_with_snake_case_status() {
        let report = Report {
            status: Status::NoChange,
            message: "No new image found".to_owned(),
        };

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({ "status": "no_change", "message": "No new image found" })
        );
    }
}
