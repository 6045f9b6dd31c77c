mod common;

use approx::assert_relative_eq;
use common::*;
use schwebung::{LoadError, LoopEvent, SessionConfig, MAX_UPLOAD_BYTES};

#[test]
/// Defaults, play, stop: the status lines and the beat the UI shows.
fn play_then_stop_with_defaults() {
    let (mut session, _out) = capture_session(SessionConfig::default());

    let view = session.play().unwrap();
    assert_eq!(view.status, "Playing: Left - 220 Hz, Right - 210 Hz");
    assert_eq!(view.difference, "10 Hz");
    assert!(!view.play_visible && view.stop_visible);

    let view = session.stop();
    assert_eq!(view.status, "Binaural beats stopped.");
    assert_eq!(view.difference, "0 Hz");
    assert!(view.play_visible && !view.stop_visible);
}

#[test]
fn playing_renders_one_tone_per_ear() {
    let (mut session, mut out) = capture_session(SessionConfig::default());
    session.play().unwrap();

    let (left, right) = render(&mut session, &mut out, 200);
    assert_relative_eq!(peak(&left), 0.5, epsilon = 0.01);
    assert_relative_eq!(peak(&right), 0.5, epsilon = 0.01);

    // Left ear alone at 220 Hz: count rising zero crossings over the capture
    session.set_right_volume(0.0);
    render(&mut session, &mut out, 100);
    let (mut left, mut right) = (Vec::new(), Vec::new());
    for _ in 0..3 {
        let (l, r) = render(&mut session, &mut out, 250);
        left.extend(l);
        right.extend(r);
    }
    assert_eq!(left.len(), SAMPLE_RATE as usize);
    assert!(peak(&right) < 1e-4);
    let crossings = left.windows(2).filter(|w| w[0] < 0.0 && w[1] >= 0.0).count();
    assert!((219..=221).contains(&crossings), "{crossings} crossings");
}

#[test]
fn play_twice_builds_one_voice() {
    let (mut session, _out) = capture_session(SessionConfig::default());

    session.play().unwrap();
    let nodes = session.engine().unwrap().node_count();
    let view = session.play().unwrap();

    assert_eq!(session.engine().unwrap().node_count(), nodes);
    assert!(session.tone().is_active());
    assert!(view.stop_visible);
}

#[test]
fn stop_while_stopped_is_a_no_op() {
    let (mut session, _out) = capture_session(SessionConfig::default());
    let before = session.view();

    let after = session.stop();
    assert_eq!(before, after);
    assert_eq!(after.status, "Ready to play binaural beats.");
    assert!(!session.is_playing());
}

#[test]
fn stop_releases_tone_nodes() {
    let (mut session, mut out) = capture_session(SessionConfig::default());
    session.play().unwrap();
    session.stop();

    assert!(!session.tone().is_active());
    assert_eq!(session.engine().unwrap().node_count(), 2);
    let (left, right) = render(&mut session, &mut out, 4);
    assert_eq!(peak(&left), 0.0);
    assert_eq!(peak(&right), 0.0);
}

#[test]
fn reset_from_playing_restores_defaults() {
    let (mut session, _out) = capture_session(SessionConfig::default());
    session.set_left_frequency("300");
    session.set_right_frequency("296");
    session.set_left_volume(0.9);
    session.set_right_volume(0.1);
    session.set_loop_volume(0.7);
    session.set_volumes_linked(true);
    session.play().unwrap();

    let view = session.reset();
    let state = session.state();

    assert!(!state.playing);
    assert_eq!(state.left_frequency_hz, 220.0);
    assert_eq!(state.right_frequency_hz, 210.0);
    assert_eq!(state.left_volume, 0.5);
    assert_eq!(state.right_volume, 0.5);
    assert_eq!(state.loop_volume, 0.3);
    assert!(!state.volumes_linked);
    assert!(!session.tone().is_active());
    assert_eq!(view.status, "Ready to play binaural beats.");
    assert_eq!(view.difference, "10 Hz");
    assert!(view.play_visible);
}

#[test]
fn reset_while_stopped_is_allowed() {
    let (mut session, _out) = capture_session(SessionConfig::default());
    session.set_left_frequency("100");
    let view = session.reset();
    assert_eq!(session.state().left_frequency_hz, 220.0);
    assert_eq!(view.difference, "10 Hz");
}

#[test]
fn difference_tracks_every_frequency_edit() {
    let (mut session, _out) = capture_session(SessionConfig::default());

    for (left, right) in [(440.0_f64, 432.0_f64), (100.0, 140.5), (7.5, 7.5), (1000.0, 1.0)] {
        session.set_left_frequency(&left.to_string());
        let view = session.set_right_frequency(&right.to_string());
        let expected = (left - right).abs();
        assert_eq!(session.state().frequency_difference(), expected);
        assert_eq!(view.difference, format!("{expected} Hz"));
    }

    // Also while playing, after a stop zeroed the display
    session.play().unwrap();
    session.stop();
    let view = session.set_left_frequency("1010");
    assert_eq!(view.difference, "1009 Hz");
}

#[test]
fn bad_frequency_input_falls_back_to_defaults() {
    let (mut session, _out) = capture_session(SessionConfig::default());

    let view = session.play_with("abc", "-12").unwrap();
    assert_eq!(view.status, "Playing: Left - 220 Hz, Right - 210 Hz");

    session.stop();
    let view = session.play_with("7.83", "14.3").unwrap();
    assert_eq!(view.status, "Playing: Left - 7.83 Hz, Right - 14.3 Hz");
}

#[test]
fn retune_while_playing_updates_status() {
    let (mut session, _out) = capture_session(SessionConfig::default());
    session.play().unwrap();

    let view = session.set_right_frequency("216");
    assert_eq!(view.status, "Playing: Left - 220 Hz, Right - 216 Hz");
    assert_eq!(view.difference, "4 Hz");
}

#[test]
fn linked_volumes_follow_the_left_slider() {
    let (mut session, _out) = capture_session(SessionConfig::default());

    let view = session.set_volumes_linked(true);
    assert!(view.volumes_linked);
    let view = session.set_left_volume(0.8);
    assert_eq!(view.right_volume, 0.8);

    // Right slider is ignored while linked
    let view = session.set_right_volume(0.2);
    assert_eq!(view.right_volume, 0.8);

    session.set_volumes_linked(false);
    let view = session.set_left_volume(0.3);
    assert_eq!(view.left_volume, 0.3);
    assert_eq!(view.right_volume, 0.8);
}

#[test]
fn linking_snaps_right_to_left() {
    let (mut session, _out) = capture_session(SessionConfig::default());
    session.set_left_volume(0.6);
    session.set_right_volume(0.1);

    let view = session.set_volumes_linked(true);
    assert_eq!(view.right_volume, 0.6);
}

#[test]
fn linking_snaps_the_rendered_right_ear() {
    let (mut session, mut out) = capture_session(SessionConfig::default());
    session.set_left_volume(0.8);
    session.set_right_volume(0.2);
    session.play().unwrap();

    let (_, right) = render(&mut session, &mut out, 50);
    assert_relative_eq!(peak(&right), 0.2, epsilon = 0.01);

    session.set_volumes_linked(true);
    // Let the gain ramp settle before measuring
    render(&mut session, &mut out, 100);
    let (left, right) = render(&mut session, &mut out, 100);
    assert_relative_eq!(peak(&left), 0.8, epsilon = 0.01);
    assert_relative_eq!(peak(&right), 0.8, epsilon = 0.01);
}

#[test]
fn upload_size_limit() {
    let (mut session, _out) = capture_session(SessionConfig::default());

    let err = session.load_file(vec![0; MAX_UPLOAD_BYTES + 1]).unwrap_err();
    assert!(matches!(
        err,
        LoadError::FileTooLarge { size, limit } if size == MAX_UPLOAD_BYTES + 1 && limit == MAX_UPLOAD_BYTES
    ));
    assert_eq!(session.looper().pending(), 0);
    assert_eq!(session.looper().generation(), 0);

    // Exactly at the limit is accepted (and then fails to decode, it's zeros)
    let generation = session.load_file(vec![0; MAX_UPLOAD_BYTES]).unwrap();
    let events = drain_events(&mut session);
    assert!(matches!(events.as_slice(), [LoopEvent::DecodeFailed { generation: g, .. }] if *g == generation));
}

#[test]
fn oversized_upload_is_refused_before_the_engine_starts() {
    let mut session = unsupported_session();

    let err = session.load_file(vec![0; MAX_UPLOAD_BYTES + 1]).unwrap_err();
    assert!(matches!(err, LoadError::FileTooLarge { .. }));
    // The failing engine was never asked for
    assert!(session.view().controls_enabled);
}

#[test]
fn uploaded_clip_loops_and_stop_silences_it() {
    let (mut session, mut out) = capture_session(SessionConfig::default());
    session.play().unwrap();

    let generation = session.load_file(wav_bytes(22_050, 2, 2_205)).unwrap();
    let events = drain_events(&mut session);
    assert!(matches!(events.as_slice(), [LoopEvent::Started { generation: g }] if *g == generation));
    assert!(session.looper().is_playing());

    session.stop();
    assert!(!session.looper().is_playing());
    let (left, right) = render(&mut session, &mut out, 4);
    assert_eq!(peak(&left), 0.0);
    assert_eq!(peak(&right), 0.0);
}

#[test]
fn loop_plays_without_the_tone() {
    let (mut session, mut out) = capture_session(SessionConfig::default().with_loop_volume(1.0));

    session.load_file(wav_bytes(48_000, 1, 4_800)).unwrap();
    drain_events(&mut session);
    assert!(!session.is_playing());

    let (left, right) = render(&mut session, &mut out, 100);
    assert!(peak(&left) > 0.4);
    assert_eq!(left, right);
}

#[test]
fn decode_landing_after_stop_is_discarded() {
    let (mut session, _out) = capture_session(SessionConfig::default());
    session.play().unwrap();

    session.load_file(wav_bytes(48_000, 1, 48_000)).unwrap();
    session.stop();
    let events = drain_events(&mut session);

    assert!(events.is_empty());
    assert!(!session.looper().is_playing());
}

#[test]
fn decode_landing_after_reset_is_discarded() {
    let (mut session, mut out) = capture_session(SessionConfig::default());
    session.play().unwrap();

    let generation = session.load_file(wav_bytes(48_000, 1, 48_000)).unwrap();
    session.reset();
    let events = drain_events(&mut session);

    assert!(events.is_empty());
    assert!(!session.looper().is_playing());
    assert!(session.looper().generation() > generation);
    let (left, right) = render(&mut session, &mut out, 4);
    assert_eq!(peak(&left), 0.0);
    assert_eq!(peak(&right), 0.0);
}

#[test]
fn loop_volume_is_clamped_and_kept() {
    let (mut session, _out) = capture_session(SessionConfig::default());
    assert_eq!(session.set_loop_volume(1.5).loop_volume, 1.0);
    assert_eq!(session.set_loop_volume(f32::NAN).loop_volume, 1.0);
    assert_eq!(session.looper().volume(), 1.0);
}

#[test]
fn unsupported_platform_disables_controls() {
    let mut session = unsupported_session();

    assert!(session.play().is_err());
    assert!(!session.is_playing());
    let view = session.view();
    assert!(!view.controls_enabled);
    assert_eq!(view.status, "Ready to play binaural beats.");

    assert!(matches!(session.load_file(vec![1, 2, 3]), Err(LoadError::Engine(_))));
    // Nothing to stop or reset, still fine
    session.stop();
    session.reset();
    session.process();
    assert!(session.poll().is_empty());
}

#[test]
fn share_url_is_independent_of_state() {
    let (mut session, _out) =
        capture_session(SessionConfig::default().with_share_url("https://example.org/beats"));
    assert_eq!(session.share_url(), Some("https://example.org/beats"));
    session.play().unwrap();
    assert_eq!(session.share_url(), Some("https://example.org/beats"));

    let (bare, _out) = capture_session(SessionConfig::default());
    assert_eq!(bare.share_url(), None);
}
