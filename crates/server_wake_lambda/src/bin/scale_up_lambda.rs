use aws_config::{BehaviorVersion, Region};
use aws_sdk_ecs::error::DisplayErrorContext;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use server_wake_core::config::ServiceIdentity;
use server_wake_core::contract::InvocationResponse;
use server_wake_lambda::adapters::orchestrator::ServiceOrchestrator;
use server_wake_lambda::handlers::scale_up::handle_payload;
use server_wake_lambda::logging::init_logging;
use tracing::info;

struct EcsOrchestrator {
    ecs_client: aws_sdk_ecs::Client,
}

impl ServiceOrchestrator for EcsOrchestrator {
    fn desired_count(&self, identity: &ServiceIdentity) -> Result<u32, String> {
        let client = self.ecs_client.clone();
        let cluster = identity.cluster.clone();
        let service = identity.service.clone();

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .describe_services()
                    .cluster(cluster)
                    .services(service)
                    .send()
                    .await
                    .map_err(|error| {
                        format!("describe services failed: {}", DisplayErrorContext(&error))
                    })
            })
        })?;

        let Some(described) = output.services().first() else {
            let failures: Vec<String> = output
                .failures()
                .iter()
                .map(|failure| {
                    format!(
                        "{} ({})",
                        failure.arn().unwrap_or("unknown arn"),
                        failure.reason().unwrap_or("no reason given"),
                    )
                })
                .collect();
            return Err(if failures.is_empty() {
                format!("service {} not found", identity.service)
            } else {
                format!("service {} not found: {}", identity.service, failures.join("; "))
            });
        };

        u32::try_from(described.desired_count())
            .map_err(|_| format!("negative desired count {}", described.desired_count()))
    }

    fn set_desired_count(
        &self,
        identity: &ServiceIdentity,
        desired_count: u32,
    ) -> Result<(), String> {
        let client = self.ecs_client.clone();
        let cluster = identity.cluster.clone();
        let service = identity.service.clone();
        let desired_count = i32::try_from(desired_count)
            .map_err(|_| format!("desired count {desired_count} exceeds the ECS limit"))?;

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .update_service()
                    .cluster(cluster)
                    .service(service)
                    .desired_count(desired_count)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!("update service failed: {}", DisplayErrorContext(&error))
                    })
            })
        })
    }
}

async fn handle_request(
    identity: &ServiceIdentity,
    orchestrator: &EcsOrchestrator,
    event: LambdaEvent<Value>,
) -> Result<InvocationResponse, Error> {
    Ok(handle_payload(identity, orchestrator, &event.payload)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging()?;

    let identity = ServiceIdentity::from_env()?;
    info!(
        component = "scale_up_lambda",
        event = "config_loaded",
        region = %identity.region,
        cluster = %identity.cluster,
        service = %identity.service,
    );

    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(identity.region.clone()))
        .load()
        .await;
    let orchestrator = EcsOrchestrator {
        ecs_client: aws_sdk_ecs::Client::new(&aws_config),
    };

    let identity = &identity;
    let orchestrator = &orchestrator;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(identity, orchestrator, event).await
    }))
    .await
}
