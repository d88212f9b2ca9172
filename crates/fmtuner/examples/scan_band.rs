//! Full-band scan with signal-strength readings.
//!
//! Demonstrates the scan workflow: start a full-band scan, wait for the
//! station list on the event stream, then tune each hit and read its
//! RSSI. This is the flow behind a head unit's "station list" button.
//!
//! The example runs against the scriptable mock chip from
//! `fmtuner-test-harness`, so it works without tuner hardware.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p fmtuner --example scan_band
//! ```

use std::sync::Arc;
use std::time::Duration;

use fmtuner::chip::ChipEvent;
use fmtuner::{Caller, ChipStatus, CommandKind, FmReceiverBuilder, TunerEvent};
use fmtuner_test_harness::MockChip;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (chip, chip_events) = MockChip::new();

    chip.complete(CommandKind::Enable, ChipStatus::Success, 0);

    let receiver = FmReceiverBuilder::new().build(Arc::new(chip.clone()), chip_events)?;
    let caller = Caller::admin("scan-example");

    let mut events = receiver.subscribe();

    receiver.enable(&caller).await?;
    while !receiver.is_enabled() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    println!("Tuner enabled, starting full-band scan...\n");

    receiver.complete_scan(&caller).await?;

    // The mock has no RF front end; play the part of the hardware and
    // report three stations.
    chip.inject(ChipEvent::ScanDone {
        status: ChipStatus::Success,
        channels_khz: vec![89_100, 94_100, 101_300],
    });

    // Wait for the station list on the event stream.
    let channels = loop {
        match events.recv().await? {
            TunerEvent::ScanDone {
                channels_khz,
                status,
            } => {
                println!("Scan finished ({}): {} stations\n", status, channels_khz.len());
                break channels_khz;
            }
            _ => continue,
        }
    };

    println!("{:<12} {:>10}", "Frequency", "RSSI");
    println!("{:-<12} {:-<10}", "", "");

    for (i, frequency_khz) in channels.iter().copied().enumerate() {
        // Script each tune completion and a falling RSSI per station.
        chip.complete(CommandKind::Tune, ChipStatus::Success, frequency_khz as i64);
        chip.complete(
            CommandKind::GetRssi,
            ChipStatus::Success,
            0xFFB0 + (i as i64) * 8,
        );

        receiver.tune(&caller, frequency_khz).await?;
        let rssi = receiver.get_rssi(&caller).await?;

        let bar_len = ((rssi + 100).max(0) / 2) as usize;
        let bar: String = "#".repeat(bar_len.min(40));

        println!(
            "{:>8.1} MHz {:>6} dBm  {}",
            frequency_khz as f64 / 1_000.0,
            rssi,
            bar
        );
    }

    Ok(())
}
