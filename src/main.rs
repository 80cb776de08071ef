use aws_config::{BehaviorVersion, Region};
use lambda_runtime::{service_fn, LambdaEvent};
use serde::Serialize;
use serde_json::Value;

use ami_watch::{
    catalog::Ec2Catalog, check, config::Config, pipeline::CodePipelineTrigger,
    pointer::SsmPointerStore,
};

/// The envelope the scheduler sees. Always `statusCode: 200`; the outcome of
/// the check lives in the JSON-encoded body.
#[derive(Serialize)]
struct Response {
    #[serde(rename = "statusCode")]
    status_code: u16,
    body: String,
}

async fn handle(
    _event: LambdaEvent<Value>,
    config: &Config,
    catalog: &Ec2Catalog,
    store: &SsmPointerStore,
    trigger: &CodePipelineTrigger,
) -> Result<Response, lambda_runtime::Error> {
    let report = check::run_check(config, catalog, store, trigger).await;

    Ok(Response {
        status_code: 200,
        body: serde_json::to_string(&report)?,
    })
}

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;

    let aws = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await;
    let catalog = Ec2Catalog::new(&aws);
    let store = SsmPointerStore::new(&aws);
    let trigger = CodePipelineTrigger::new(&aws);

    lambda_runtime::run(service_fn(|event| {
        handle(event, &config, &catalog, &store, &trigger)
    }))
    .await
}
