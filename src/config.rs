use crate::{Error, Result};

const REGION_VAR: &str = "REGION";
const PARAMETER_NAME_VAR: &str = "SSM_PARAMETER_NAME_BASE_AMI_ID";
const PIPELINE_NAME_VAR: &str = "CODEPIPELINE_PIPELINE_NAME";

#[derive(Debug, Clone)]
pub struct Config {
    pub region: String,
    pub parameter_name: String,
    pub pipeline_name: String,
}

impl Config {
    /// Reads the configuration from the process environment. Fails on the
    /// first missing variable so a misdeployed function dies at startup
    /// instead of halfway through a check.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self> {
        let var = |name| lookup(name).ok_or(Error::MissingEnvVar(name));

        Ok(Self {
            region: var(REGION_VAR)?,
            parameter_name: var(PARAMETER_NAME_VAR)?,
            pipeline_name: var(PIPELINE_NAME_VAR)?,
        })
    }
}
