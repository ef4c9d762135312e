use serde_json::Value;
use server_wake_core::config::ServiceIdentity;
use server_wake_core::contract::{InvocationOutcome, InvocationResponse, RUNNING_DESIRED_COUNT};
use server_wake_core::event::InvocationEvent;
use tracing::{error, info, warn};

use crate::adapters::orchestrator::ServiceOrchestrator;

const COMPONENT: &str = "scale_up_handler";

#[derive(Debug, thiserror::Error)]
pub enum ScaleUpError {
    #[error("failed to read desired count of {service} in cluster {cluster}: {message}")]
    DescribeFailed {
        cluster: String,
        service: String,
        message: String,
    },
    #[error(
        "failed to set desired count of {service} in cluster {cluster} to {desired_count}: {message}"
    )]
    UpdateFailed {
        cluster: String,
        service: String,
        desired_count: u32,
        message: String,
    },
    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reads the desired count and raises it to one if the service is scaled to
/// zero. At most one write is issued; nothing is retried.
pub fn ensure_running(
    identity: &ServiceIdentity,
    orchestrator: &impl ServiceOrchestrator,
) -> Result<InvocationOutcome, ScaleUpError> {
    let desired_count =
        orchestrator
            .desired_count(identity)
            .map_err(|message| ScaleUpError::DescribeFailed {
                cluster: identity.cluster.clone(),
                service: identity.service.clone(),
                message,
            })?;
    info!(
        component = COMPONENT,
        event = "desired_count_read",
        cluster = %identity.cluster,
        service = %identity.service,
        desired_count,
    );

    let outcome = InvocationOutcome::from_desired_count(desired_count);
    match outcome {
        InvocationOutcome::Started => {
            orchestrator
                .set_desired_count(identity, RUNNING_DESIRED_COUNT)
                .map_err(|message| ScaleUpError::UpdateFailed {
                    cluster: identity.cluster.clone(),
                    service: identity.service.clone(),
                    desired_count: RUNNING_DESIRED_COUNT,
                    message,
                })?;
            info!(
                component = COMPONENT,
                event = "desired_count_updated",
                from = desired_count,
                to = RUNNING_DESIRED_COUNT,
                "Updated desiredCount to {RUNNING_DESIRED_COUNT}"
            );
        }
        InvocationOutcome::AlreadyRunning => {
            info!(
                component = COMPONENT,
                event = "already_running",
                desired_count,
                "desiredCount already at {desired_count}"
            );
        }
    }

    Ok(outcome)
}

pub fn handle_invocation(
    identity: &ServiceIdentity,
    orchestrator: &impl ServiceOrchestrator,
    event: &InvocationEvent,
) -> Result<InvocationResponse, ScaleUpError> {
    let outcome = ensure_running(identity, orchestrator).inspect_err(|failure| {
        error!(
            component = COMPONENT,
            event = "scale_up_failed",
            error = %failure,
        );
    })?;

    let http = event.is_http();
    info!(
        component = COMPONENT,
        event = "invocation_answered",
        outcome = outcome.as_str(),
        http,
    );

    Ok(InvocationResponse::for_outcome(outcome, http)?)
}

/// Entry point for raw Lambda payloads. Payloads whose shape cannot be read
/// are answered as direct invocations.
pub fn handle_payload(
    identity: &ServiceIdentity,
    orchestrator: &impl ServiceOrchestrator,
    payload: &Value,
) -> Result<InvocationResponse, ScaleUpError> {
    let event = InvocationEvent::from_value(payload).unwrap_or_else(|unrecognized| {
        warn!(
            component = COMPONENT,
            event = "event_shape_unrecognized",
            reason = %unrecognized.reason,
        );
        InvocationEvent::default()
    });

    handle_invocation(identity, orchestrator, &event)
}
