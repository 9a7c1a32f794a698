//! Recording commands: record, stop, status

use crate::audio::recorder::{Recorder, MAX_CLIP_SECS};
use crate::chain::WalletSession;
use tracing::error;

/// Handle `record`: begin a capped capture session
pub fn handle_record(recorder: &mut Recorder) {
    if recorder.is_recording() {
        println!("Already recording ({}s elapsed).", recorder.elapsed_secs());
        return;
    }

    match recorder.start() {
        Ok(()) => println!(
            "Recording... speak now (auto-stops at {}s). `stop` when done.",
            MAX_CLIP_SECS
        ),
        Err(e) => {
            error!("Could not start recording: {}", e);
            println!("Could not start recording: {}", e);
        }
    }
}

/// Handle `stop`: finalize the clip; a no-op when nothing is recording
pub fn handle_stop(recorder: &mut Recorder) {
    if !recorder.is_recording() {
        println!("Nothing is recording.");
        return;
    }

    recorder.stop();
    println!(
        "Stopped at {}s. `post` to publish the clip.",
        recorder.elapsed_secs()
    );
}

/// Handle `status`: session, clip, and wallet state at a glance
pub fn handle_status(recorder: &Recorder, wallet: Option<&WalletSession>) {
    if recorder.is_recording() {
        println!(
            "Recording: {}s / {}s",
            recorder.elapsed_secs(),
            MAX_CLIP_SECS
        );
    } else if recorder.has_clip() {
        println!("Clip ready to post ({}s).", recorder.elapsed_secs());
    } else {
        println!("Idle. `record` to capture a clip.");
    }

    match wallet {
        Some(wallet) => println!("Wallet: {}", wallet.address),
        None => println!("Wallet: not connected (`connect`)."),
    }
}
