use async_trait::async_trait;
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use log::debug;

use crate::{Error, Result};

/// Read and overwrite the single parameter recording the last base image id
/// this automation has seen.
#[async_trait]
pub trait PointerStore {
    async fn read(&self, name: &str) -> Result<String>;

    /// Overwrites any existing value; last write wins. Failures are surfaced
    /// to the caller, never retried.
    async fn write(&self, name: &str, value: &str) -> Result<()>;
}

pub struct SsmPointerStore {
    client: aws_sdk_ssm::Client,
}

impl SsmPointerStore {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ssm::Client::new(config),
        }
    }
}

#[async_trait]
impl PointerStore for SsmPointerStore {
    async fn read(&self, name: &str) -> Result<String> {
        let response = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(false)
            .send()
            .await
            .map_err(|error| {
                if error
                    .as_service_error()
                    .is_some_and(GetParameterError::is_parameter_not_found)
                {
                    Error::ParameterNotFound {
                        name: name.to_owned(),
                    }
                } else {
                    Error::ParameterAccess {
                        name: name.to_owned(),
                        source: error.into(),
                    }
                }
            })?;

        let value = response
            .parameter
            .and_then(|parameter| parameter.value)
            .ok_or_else(|| Error::ParameterNotFound {
                name: name.to_owned(),
            })?;

        debug!("parameter {name} holds {value}");

        Ok(value)
    }

    async fn write(&self, name: &str, value: &str) -> Result<()> {
        let response = self
            .client
            .put_parameter()
            .name(name)
            .value(value)
            .overwrite(true)
            .send()
            .await
            .map_err(|error| Error::ParameterWrite {
                name: name.to_owned(),
                source: error.into(),
            })?;

        debug!(
            "parameter {name} updated to {value} (version {version})",
            version = response.version
        );

        Ok(())
    }
}
