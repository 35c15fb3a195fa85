//! Terminal rendering of workflow events.

use console::style;
use events::{Event, EventBus};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::task::JoinHandle;

/// One-line description of an event.
pub fn describe(event: &Event) -> String {
    match event {
        Event::WorkflowStarted {
            property_id,
            entry_stage,
        } => format!("Property #{}: starting at {}", property_id, entry_stage),
        Event::StageChanged { to_stage, .. } => format!("Stage: {}", to_stage),
        Event::StepSubmitted { method, attempt, .. } if *attempt > 1 => {
            format!("Submitting {} (attempt {})", method, attempt)
        }
        Event::StepSubmitted { method, .. } => format!("Submitting {}", method),
        Event::StepConfirmed {
            method,
            transaction_hash,
            ..
        } => format!("{} confirmed in {}", method, transaction_hash),
        Event::WaitStarted {
            target_status,
            timeout_secs,
            ..
        } => format!(
            "Waiting for status {} (up to {}s)",
            target_status, timeout_secs
        ),
        Event::WaitSatisfied {
            target_status,
            elapsed_ms,
            ..
        } => format!(
            "Status {} reached after {}s",
            target_status,
            elapsed_ms / 1000
        ),
        Event::MetadataPublished { uri, inline, .. } if *inline => {
            format!("Metadata embedded inline ({} bytes)", uri.len())
        }
        Event::MetadataPublished { uri, .. } => format!("Metadata stored at {}", uri),
        Event::WorkflowCompleted { .. } => "Workflow complete".to_string(),
        Event::WorkflowFailed { stage, message, .. } => {
            format!("Failed during {}: {}", stage, message)
        }
    }
}

/// Print bus events under a spinner until the workflow reaches a terminal event.
pub fn spawn_progress(bus: &EventBus) -> JoinHandle<()> {
    let mut events = Box::pin(bus.stream());

    tokio::spawn(async move {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner);
        }
        pb.enable_steady_tick(Duration::from_millis(120));

        while let Some(envelope) = events.next().await {
            let event = envelope.event;
            let line = describe(&event);

            match event {
                Event::WaitStarted { .. } | Event::StepSubmitted { .. } => pb.set_message(line),
                Event::WorkflowCompleted { .. } => {
                    pb.finish_and_clear();
                    println!("{} {}", style("✔").green(), line);
                    break;
                }
                Event::WorkflowFailed { .. } => {
                    pb.finish_and_clear();
                    println!("{} {}", style("✘").red(), line);
                    break;
                }
                _ => pb.println(format!("  {}", line)),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use propchain_core::PropertyId;

    #[test]
    fn test_describe_retry_attempt() {
        let line = describe(&Event::StepSubmitted {
            property_id: PropertyId::new(1),
            method: "processPropertyData".to_string(),
            attempt: 2,
        });
        assert_eq!(line, "Submitting processPropertyData (attempt 2)");
    }

    #[test]
    fn test_describe_failure() {
        let line = describe(&Event::WorkflowFailed {
            property_id: PropertyId::new(1),
            stage: "verifying".to_string(),
            last_status: Some("pending".to_string()),
            message: "Rejected by signer: denied".to_string(),
        });
        assert_eq!(line, "Failed during verifying: Rejected by signer: denied");
    }
}
