use async_trait::async_trait;
use log::debug;

use crate::{Error, Result};

/// Starts an execution of the downstream build pipeline. Fire and forget:
/// the caller never waits on the execution's outcome.
#[async_trait]
pub trait PipelineTrigger {
    async fn start(&self, name: &str) -> Result<String>;
}

pub struct CodePipelineTrigger {
    client: aws_sdk_codepipeline::Client,
}

impl CodePipelineTrigger {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_codepipeline::Client::new(config),
        }
    }
}

#[async_trait]
impl PipelineTrigger for CodePipelineTrigger {
    async fn start(&self, name: &str) -> Result<String> {
        let response = self
            .client
            .start_pipeline_execution()
            .name(name)
            .send()
            .await
            .map_err(|error| Error::PipelineStart {
                name: name.to_owned(),
                source: error.into(),
            })?;

        let execution_id = response.pipeline_execution_id.unwrap_or_default();
        debug!("pipeline {name} started, execution id {execution_id}");

        Ok(execution_id)
    }
}
