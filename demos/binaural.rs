//! Binaural beats from the terminal.
//!
//! Run with: cargo run --example binaural --features cpal_sink
//!
//! Commands:
//!   play [left right]   start the tone, optionally at new frequencies
//!   stop | reset
//!   left <hz> | right <hz>
//!   vol l|r <0..1>      per-ear volume
//!   link on|off         right ear follows the left slider
//!   load <path>         loop an audio file underneath
//!   loopvol <0..1>
//!   quit

use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread::{self, sleep};
use std::time::{Duration, Instant};

use schwebung::{LoopEvent, Session, SessionConfig, View, BLOCK_SIZE};

fn show(view: &View) {
    println!("{}  (beat {})", view.status, view.difference);
    println!(
        "  volume L {:.2} R {:.2}{}  loop {:.2}",
        view.left_volume,
        view.right_volume,
        if view.volumes_linked { " [linked]" } else { "" },
        view.loop_volume
    );
}

/// Returns false once the user asked to quit.
fn handle(session: &mut Session, line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    let view = match words.as_slice() {
        ["quit"] | ["exit"] => return false,
        ["play"] => session.play(),
        ["play", left, right] => session.play_with(left, right),
        ["stop"] => Ok(session.stop()),
        ["reset"] => Ok(session.reset()),
        ["left", hz] => Ok(session.set_left_frequency(hz)),
        ["right", hz] => Ok(session.set_right_frequency(hz)),
        ["vol", ear, v] => {
            let v: f32 = v.parse().unwrap_or(f32::NAN);
            match *ear {
                "l" => Ok(session.set_left_volume(v)),
                "r" => Ok(session.set_right_volume(v)),
                _ => Ok(session.view()),
            }
        }
        ["link", state] => Ok(session.set_volumes_linked(*state == "on")),
        ["loopvol", v] => Ok(session.set_loop_volume(v.parse().unwrap_or(f32::NAN))),
        ["load", path] => {
            match std::fs::read(path) {
                Ok(bytes) => match session.load_file(bytes) {
                    Ok(generation) => println!("decoding {path} (#{generation})..."),
                    Err(e) => println!("{e}"),
                },
                Err(e) => println!("could not read {path}: {e}"),
            }
            return true;
        }
        [] => return true,
        _ => {
            println!("unknown command: {line}");
            return true;
        }
    };

    match view {
        Ok(view) => show(&view),
        Err(e) => println!("{e}"),
    }
    true
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut session = Session::with_default_output(SessionConfig::default());
    show(&session.view());
    if let Some(url) = session.share_url() {
        println!("share: {url}");
    }

    let (lines_tx, lines) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(Result::ok) {
            if lines_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut started: Option<(Instant, u32)> = None;
    let mut samples_generated: u64 = 0;
    let buffer_ahead = 880u64;

    loop {
        while let Ok(line) = lines.try_recv() {
            if !handle(&mut session, &line) {
                return;
            }
        }

        for event in session.poll() {
            match event {
                LoopEvent::Started { generation } => println!("loop #{generation} playing"),
                LoopEvent::DecodeFailed { generation, error } => {
                    println!("loop #{generation} failed: {error}")
                }
            }
        }

        // Pace rendering against the device once something started the engine
        let Some(sample_rate) = session.engine().map(|e| e.sample_rate()) else {
            sleep(Duration::from_millis(10));
            continue;
        };
        let (audio_start, sample_rate) = *started.get_or_insert((Instant::now(), sample_rate));

        let elapsed = audio_start.elapsed().as_secs_f64();
        let samples_should_have_played = (elapsed * sample_rate as f64 * 2.0) as u64;

        if samples_generated < samples_should_have_played + buffer_ahead {
            session.process();
            samples_generated += BLOCK_SIZE as u64 * 2;
        } else {
            sleep(Duration::from_micros(500));
        }
    }
}
