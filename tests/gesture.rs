use konami_dashboard::sequence::{Sequence, Snapshot, Step, KONAMI_CODE};

const AXES: usize = 2;

/// A reading that satisfies `step` on a two-axis pad.
fn reading_for(step: &Step) -> Snapshot {
    match *step {
        Step::Idle => Snapshot::neutral(AXES),
        Step::Directional { axis, positive } => {
            let mut snapshot = Snapshot::neutral(AXES);
            snapshot.axes[axis] = if positive { 32767 } else { -32767 };
            snapshot
        }
        Step::ButtonPress { button } => Snapshot::new(1 << button, vec![0; AXES]),
    }
}

/// Something that breaks every step: two buttons and a tilted stick.
fn mash() -> Snapshot {
    Snapshot::new(0b1010, vec![200, 200])
}

/// Enter step `i`, then leave it with the reading of the following step
/// (or a neutral/other reading after the last one).
fn release_reading(i: usize) -> Snapshot {
    match KONAMI_CODE.get(i + 1) {
        Some(next) => reading_for(next),
        None => Snapshot::neutral(AXES),
    }
}

#[test]
fn konami_code_shape() {
    assert_eq!(KONAMI_CODE.len(), 19);
    assert_eq!(
        KONAMI_CODE[0],
        Step::Directional {
            axis: 1,
            positive: false
        }
    );
    assert_eq!(KONAMI_CODE[16], Step::ButtonPress { button: 2 });
    assert_eq!(KONAMI_CODE[18], Step::ButtonPress { button: 0 });
    for i in (1..18).step_by(2) {
        assert_eq!(KONAMI_CODE[i], Step::Idle, "step {}", i);
    }
}

#[test]
fn full_gesture_triggers_once() {
    let mut seq = Sequence::konami();
    let mut triggers = Vec::new();

    for (i, step) in KONAMI_CODE.iter().enumerate() {
        let adv = seq.advance(&reading_for(step));
        assert!(!adv.triggered);
        assert_eq!(adv.status, format!("now matching step {}", i));
        assert_eq!(seq.current(), i);

        let adv = seq.advance(&release_reading(i));
        if adv.triggered {
            triggers.push(i);
            assert_eq!(adv.status, "trigger event");
        } else {
            assert_eq!(adv.status, format!("advancing to next step {}", i + 1));
        }
    }

    assert_eq!(triggers, vec![18]);
    assert_eq!(seq.current(), 0);
    assert!(!seq.is_matching());
}

#[test]
fn holding_each_step_does_not_skip_ahead() {
    let mut seq = Sequence::konami();

    for (i, step) in KONAMI_CODE.iter().enumerate() {
        for _ in 0..5 {
            assert!(!seq.advance(&reading_for(step)).triggered);
            assert_eq!(seq.current(), i);
        }
        let triggered = seq.advance(&release_reading(i)).triggered;
        assert_eq!(triggered, i == KONAMI_CODE.len() - 1);
    }
}

#[test]
fn rearms_after_trigger() {
    let mut seq = Sequence::konami();

    for round in 0..3 {
        let mut triggered = 0;
        for (i, step) in KONAMI_CODE.iter().enumerate() {
            seq.advance(&reading_for(step));
            if seq.advance(&release_reading(i)).triggered {
                triggered += 1;
            }
        }
        assert_eq!(triggered, 1, "round {}", round);
    }

    let adv = seq.advance(&reading_for(&KONAMI_CODE[0]));
    assert_eq!(adv.status, "now matching step 0");
    assert!(seq.is_matching());
}

#[test]
fn break_at_any_step_cancels() {
    for k in 1..KONAMI_CODE.len() {
        let mut seq = Sequence::konami();

        for (i, step) in KONAMI_CODE.iter().take(k).enumerate() {
            seq.advance(&reading_for(step));
            seq.advance(&release_reading(i));
        }
        assert_eq!(seq.current(), k);
        assert!(!seq.is_matching());

        let adv = seq.advance(&mash());
        assert!(!adv.triggered);
        assert_eq!(adv.status, format!("cancelled at step {}", k));
        assert_eq!(seq.current(), 0);
    }
}

#[test]
fn wrong_direction_cancels_after_idle() {
    let mut seq = Sequence::konami();
    let up = reading_for(&KONAMI_CODE[0]);
    let down = reading_for(&KONAMI_CODE[4]);

    seq.advance(&up);
    seq.advance(&Snapshot::neutral(AXES));
    seq.advance(&Snapshot::neutral(AXES));
    assert_eq!(seq.current(), 1);
    assert!(seq.is_matching());

    // leaving idle completes step 1, then the tilt is wrong for step 2
    seq.advance(&down);
    assert_eq!(seq.current(), 2);
    let adv = seq.advance(&down);
    assert_eq!(adv.status, "cancelled at step 2");
    assert_eq!(seq.current(), 0);
}

#[test]
fn idle_stream_is_silent() {
    let mut seq = Sequence::konami();

    for _ in 0..100 {
        let adv = seq.advance(&Snapshot::neutral(AXES));
        assert!(adv.status.is_empty());
        assert!(!adv.triggered);
    }
    assert_eq!(seq.current(), 0);
    assert!(!seq.is_matching());
}

#[test]
fn button_with_stick_still_counts() {
    let mut seq = Sequence::new(vec![Step::ButtonPress { button: 2 }, Step::Idle]).unwrap();

    seq.advance(&Snapshot::new(0b111, vec![-500, 9000]));
    assert!(seq.is_matching());
    seq.advance(&Snapshot::neutral(AXES));
    assert_eq!(seq.current(), 1);
}
