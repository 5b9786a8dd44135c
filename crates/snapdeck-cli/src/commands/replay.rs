use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tokio::time::{sleep_until, Instant};

use snapdeck_core::trace::{replay, ReplayReport, Replayer, Trace};
use snapdeck_core::{AppConfig, Capabilities, EngineEvent};

pub async fn run(config: &AppConfig, path: &Path, realtime: bool, json: bool) -> Result<()> {
    let trace = Trace::load(path)?;
    tracing::info!(
        path = %path.display(),
        events = trace.events.len(),
        duration_ms = trace.duration().as_millis() as u64,
        "replaying trace"
    );

    let capabilities = Capabilities::detect();
    let report = if realtime {
        replay_paced(&trace, config, capabilities).await?
    } else {
        replay(&trace, config.engine.clone(), capabilities)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Feed events at the pace they were recorded, showing the state as it moves
async fn replay_paced(
    trace: &Trace,
    config: &AppConfig,
    capabilities: Capabilities,
) -> Result<ReplayReport> {
    let mut replayer = Replayer::new(trace, config.engine.clone(), capabilities)?;
    let start = Instant::now();

    for event in &trace.events {
        sleep_until(start + Duration::from_millis(event.t_ms)).await;
        replayer.apply(event);

        let state = replayer.engine().state();
        eprintln!(
            "{:>7}ms  slide {:<3} progress {:>8.1}{}",
            event.t_ms,
            state.current_index,
            state.horizontal_progress,
            if state.control_released { "  released" } else { "" }
        );
    }

    Ok(replayer.finish())
}

fn print_report(report: &ReplayReport) {
    for entry in &report.entries {
        println!("{:>7}ms  {}", entry.t_ms, describe(&entry.event));
    }

    let state = &report.final_state;
    println!();
    println!(
        "final: slide {} progress {:.1} released {}",
        state.current_index, state.horizontal_progress, state.control_released
    );
    println!(
        "input: {} captured, {} passed through",
        report.captured, report.passed_through
    );
}

fn describe(event: &EngineEvent) -> String {
    match event {
        EngineEvent::IndexChanged { from, to } => format!("slide {} -> {}", from, to),
        EngineEvent::ProgressChanged { index, from, to } => {
            format!("slide {} progress {:.1} -> {:.1}", index, from, to)
        }
        EngineEvent::RubberBand { distance } => format!("rubber band ({:.1})", distance),
        EngineEvent::ControlReleased => "control released".to_string(),
        EngineEvent::ControlResumed => "control resumed".to_string(),
        EngineEvent::HandoffRequested { target } => format!("handoff to #{}", target),
        EngineEvent::WidthResolved {
            item_id,
            width,
            source,
        } => format!("{} width {:.1} ({:?})", item_id, width, source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_events() {
        assert_eq!(
            describe(&EngineEvent::IndexChanged { from: 0, to: 1 }),
            "slide 0 -> 1"
        );
        assert_eq!(
            describe(&EngineEvent::HandoffRequested {
                target: "after-deck".to_string()
            }),
            "handoff to #after-deck"
        );
    }
}
