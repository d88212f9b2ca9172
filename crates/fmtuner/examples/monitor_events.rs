//! Monitor real-time tuner events.
//!
//! Demonstrates subscribing to the tuner event stream and printing all
//! events as they arrive. This is the pattern a media daemon uses to
//! update now-playing metadata from RDS without polling.
//!
//! The example runs against the scriptable mock chip from
//! `fmtuner-test-harness`, so it works without tuner hardware: the mock
//! acknowledges every command and the example injects a handful of RDS
//! indications itself.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p fmtuner --example monitor_events
//! ```

use std::sync::Arc;
use std::time::Duration;

use fmtuner::chip::ChipEvent;
use fmtuner::{Caller, ChipStatus, CommandKind, FmReceiverBuilder, MonoStereoMode, TunerEvent};
use fmtuner_test_harness::MockChip;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (chip, chip_events) = MockChip::new();

    // Script the completions the lifecycle and tune commands wait for.
    chip.complete(CommandKind::Enable, ChipStatus::Success, 0);
    chip.complete(CommandKind::Tune, ChipStatus::Success, 94_100);

    let receiver = FmReceiverBuilder::new().build(Arc::new(chip.clone()), chip_events)?;
    let caller = Caller::admin("monitor-example");

    let mut events = receiver.subscribe();

    receiver.enable(&caller).await?;
    println!("Tuner enabling...");

    // Wait for the enable completion to land.
    while !receiver.is_enabled() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    println!("Tuner enabled.\n");

    receiver.tune(&caller, 94_100).await?;

    // Pretend the station starts broadcasting RDS.
    chip.inject(ChipEvent::PiCodeChanged {
        status: ChipStatus::Success,
        pi: 0xC201,
    });
    chip.inject(ChipEvent::PsChanged {
        status: ChipStatus::Success,
        frequency_khz: 94_100,
        name: b"RADIO 1".to_vec(),
        repertoire: 0,
    });
    chip.inject(ChipEvent::RadioText {
        status: ChipStatus::Success,
        reset_display: true,
        text: b"Now playing: the evening show".to_vec(),
        repertoire: 0,
    });
    chip.inject(ChipEvent::MonoStereoChanged {
        status: ChipStatus::Success,
        mode: MonoStereoMode::Stereo,
    });

    println!("{:<12} Event", "Timestamp");
    println!("{:-<12} {:-<50}", "", "");

    let start = tokio::time::Instant::now();
    let deadline = start + Duration::from_secs(2);

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }

        match tokio::time::timeout(remaining, events.recv()).await {
            Ok(Ok(event)) => {
                let elapsed = start.elapsed();
                let timestamp = format!("{:>6}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis());

                match event {
                    TunerEvent::Enabled => {
                        println!("{} Enabled", timestamp);
                    }
                    TunerEvent::TuneComplete {
                        frequency_khz,
                        status,
                    } => {
                        println!(
                            "{} TuneComplete      {:.1} MHz ({})",
                            timestamp,
                            frequency_khz as f64 / 1_000.0,
                            status
                        );
                    }
                    TunerEvent::PiCodeChanged { pi } => {
                        println!("{} PiCodeChanged     0x{:04X}", timestamp, pi);
                    }
                    TunerEvent::PsChanged {
                        frequency_khz,
                        name,
                        ..
                    } => {
                        println!(
                            "{} PsChanged         {:.1} MHz -> \"{}\"",
                            timestamp,
                            frequency_khz as f64 / 1_000.0,
                            name
                        );
                    }
                    TunerEvent::RadioText { text, .. } => {
                        println!("{} RadioText         \"{}\"", timestamp, text);
                    }
                    TunerEvent::MonoStereoChanged { mode } => {
                        println!("{} MonoStereoChanged {}", timestamp, mode);
                    }
                    other => {
                        println!("{} {:?}", timestamp, other);
                    }
                }
            }
            Ok(Err(tokio::sync::broadcast::error::RecvError::Lagged(n))) => {
                println!("(missed {} events due to lag)", n);
            }
            Ok(Err(tokio::sync::broadcast::error::RecvError::Closed)) => {
                println!("Event channel closed.");
                break;
            }
            Err(_) => break,
        }
    }

    println!("\nMonitoring complete.");
    Ok(())
}
