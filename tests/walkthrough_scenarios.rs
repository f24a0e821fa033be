//! End-to-end behavior of walkthrough navigation, triggers and authoring files.
//!
//! Everything here drives the public library API the way a host would:
//! build a walkthrough, poke scene handles, tick, and observe.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use walkthrough::clock::{Clock, ManualClock};
use walkthrough::definition;
use walkthrough::scene::{ButtonHandle, EntityHandle, TransformHandle};
use walkthrough::spatial::Vec3;
use walkthrough::triggers::{
    ButtonPressTrigger, DelayTrigger, ProximityTrigger, Trigger, TriggerKind,
};
use walkthrough::{Step, Walkthrough};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn gated(name: &str, button: &ButtonHandle) -> Step {
    Step::new(name).with_trigger(ButtonPressTrigger::new(Some(button.clone())))
}

fn counted(walkthrough: &mut Walkthrough) -> Rc<Cell<u32>> {
    let count = Rc::new(Cell::new(0));
    let inner = Rc::clone(&count);
    walkthrough.subscribe(move || inner.set(inner.get() + 1));
    count
}

/// A trigger that records how often it is consulted
#[derive(Debug)]
struct Probe {
    usable: bool,
    met: Rc<Cell<bool>>,
    resets: Rc<Cell<u32>>,
    checks: Rc<Cell<u32>>,
}

impl Trigger for Probe {
    fn reset_trigger(&mut self) -> bool {
        self.resets.set(self.resets.get() + 1);
        self.usable && !self.met.get()
    }

    fn check(&self) -> bool {
        self.checks.set(self.checks.get() + 1);
        self.met.get()
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::Custom
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn delay_step_auto_progresses_after_timeout() {
    let clock = Arc::new(ManualClock::new());
    let shared: Arc<dyn Clock> = clock.clone();
    let mut walkthrough = Walkthrough::new(
        "timed",
        vec![
            Step::new("wait").with_trigger(DelayTrigger::new(shared, 2.0)),
            Step::new("one").with_trigger(DelayTrigger::new(clock.clone(), 60.0)),
            Step::new("two"),
        ],
    );
    assert_eq!(walkthrough.current_step(), 0);

    clock.advance_secs(1.0);
    walkthrough.tick();
    assert_eq!(walkthrough.current_step(), 0);

    clock.advance_secs(1.5);
    walkthrough.tick();
    assert_eq!(walkthrough.current_step(), 1);
    assert!(walkthrough.steps()[0].completed());
}

#[test]
fn blocking_step_refuses_skip_until_completed() {
    let a = ButtonHandle::new("a");
    let b = ButtonHandle::new("b");
    let mut walkthrough = Walkthrough::new(
        "gate",
        vec![
            gated("zero", &a),
            gated("one", &b).block_until_complete(true),
            Step::new("two").auto_progress_on_complete(false),
        ],
    );
    let notified = counted(&mut walkthrough);

    walkthrough.skip_to_step(2, false);
    assert_eq!(walkthrough.current_step(), 0);
    // A refused skip still notifies observers
    assert_eq!(notified.get(), 1);

    walkthrough.skip_to_step(1, false);
    assert_eq!(walkthrough.current_step(), 1);
    assert!(!walkthrough.steps()[1].can_skip());
    assert!(!walkthrough.steps()[1].can_progress());
    assert!(!walkthrough.next_available());

    b.click();
    walkthrough.tick();
    assert_eq!(walkthrough.current_step(), 2);

    // Completed once, step one no longer blocks a forward jump
    walkthrough.skip_to_step(0, false);
    walkthrough.skip_to_step(2, false);
    assert_eq!(walkthrough.current_step(), 2);
}

#[test]
fn skip_to_current_step_is_silent() {
    let button = ButtonHandle::new("go");
    let mut first = gated("first", &button);
    let begins = Rc::new(Cell::new(0));
    let inner = Rc::clone(&begins);
    first.on_step_begin().subscribe(move || inner.set(inner.get() + 1));

    let mut walkthrough = Walkthrough::builder("same")
        .step(first.with_visual(EntityHandle::new("arrow", false)))
        .step(Step::new("second"))
        .build();
    let notified = counted(&mut walkthrough);
    let revision = walkthrough.revision();
    assert_eq!(begins.get(), 1);

    walkthrough.skip_to_step(0, false);
    walkthrough.skip_to_step(0, true);

    assert_eq!(notified.get(), 0);
    assert_eq!(walkthrough.revision(), revision);
    assert_eq!(begins.get(), 1);
    assert!(walkthrough.steps()[0].is_started());
}

#[test]
fn skip_to_current_step_is_silent_once_finished() {
    let button = ButtonHandle::new("go");
    let mut walkthrough = Walkthrough::new("done", vec![gated("a", &button), gated("b", &button)]);

    button.click();
    walkthrough.tick();
    button.click();
    walkthrough.tick();
    assert!(walkthrough.is_finished());
    assert_eq!(walkthrough.current_step(), walkthrough.len());

    let notified = counted(&mut walkthrough);
    walkthrough.skip_to_step(walkthrough.current_step(), false);
    walkthrough.next_step();

    assert_eq!(notified.get(), 0);
    assert!(walkthrough.is_finished());
    assert!(!walkthrough.steps()[1].is_started());
}

#[test]
fn previous_from_finished_restarts_last_step() {
    let button = ButtonHandle::new("go");
    let mut walkthrough = Walkthrough::new(
        "back",
        vec![gated("a", &button), gated("b", &button), gated("c", &button)],
    );
    for _ in 0..3 {
        button.click();
        walkthrough.tick();
    }
    assert!(walkthrough.is_finished());
    assert_eq!(walkthrough.progress_label(), "Step 2 / 2");

    walkthrough.previous_step();
    assert_eq!(walkthrough.current_step(), 2);
    assert!(!walkthrough.is_finished());
    assert!(walkthrough.steps()[2].is_started());
}

#[test]
fn next_step_begins_before_previous_step_hides() {
    let button = ButtonHandle::new("go");
    let arrow = EntityHandle::new("arrow", false);
    let events = Rc::new(RefCell::new(Vec::new()));

    let mut steps = Vec::new();
    for name in ["a", "b"] {
        let mut step = gated(name, &button).with_visual(arrow.clone());
        let begin = Rc::clone(&events);
        step.on_step_begin().subscribe(move || begin.borrow_mut().push(format!("{name} begin")));
        let end = Rc::clone(&events);
        step.on_step_complete().subscribe(move || end.borrow_mut().push(format!("{name} complete")));
        steps.push(step);
    }
    let mut walkthrough = Walkthrough::new("shared", steps);

    button.click();
    walkthrough.tick();

    assert_eq!(walkthrough.current_step(), 1);
    assert_eq!(*events.borrow(), vec!["a begin", "b begin", "a complete"]);
    // The outgoing step hides the shared visual last
    assert!(!arrow.active_self());
}

#[test]
fn proximity_threshold_tracks_moving_transforms() {
    let source = TransformHandle::at("source", Vec3::ZERO);
    let target = TransformHandle::at("target", Vec3::new(0.5, 0.0, 0.0));
    let trigger = ProximityTrigger::new(Some(source), Some(target.clone()), 1.0);

    assert!(trigger.check());
    target.set_position(Vec3::new(2.0, 0.0, 0.0));
    assert!(!trigger.check());
}

#[test]
fn out_of_range_skips_are_ignored() {
    let button = ButtonHandle::new("x");
    let mut walkthrough = Walkthrough::new("bounds", vec![gated("a", &button), gated("b", &button)]);
    let notified = counted(&mut walkthrough);

    walkthrough.skip_to_step(walkthrough.len(), false);
    walkthrough.skip_to_step(usize::MAX, true);
    walkthrough.previous_step();

    assert_eq!(walkthrough.current_step(), 0);
    assert_eq!(notified.get(), 0);
}

// ─── Properties ──────────────────────────────────────────────────────────────

#[test]
fn unusable_trigger_is_never_consulted() {
    let checks = Rc::new(Cell::new(0));
    let resets = Rc::new(Cell::new(0));
    let button = ButtonHandle::new("b");

    let probe = Probe {
        usable: false,
        met: Rc::new(Cell::new(false)),
        resets: Rc::clone(&resets),
        checks: Rc::clone(&checks),
    };

    let mut walkthrough = Walkthrough::new(
        "probe",
        vec![
            Step::new("mixed")
                .with_trigger(probe)
                .with_trigger(ButtonPressTrigger::new(Some(button.clone()))),
            Step::new("end").auto_progress_on_complete(false),
        ],
    );

    assert_eq!(resets.get(), 1);
    assert_eq!(walkthrough.steps()[0].pending_trigger_count(), 1);

    for _ in 0..5 {
        walkthrough.tick();
    }
    button.click();
    walkthrough.tick();

    assert_eq!(walkthrough.current_step(), 1);
    assert_eq!(checks.get(), 0);
}

#[test]
fn step_without_usable_triggers_completes_on_start() {
    let met = Rc::new(Cell::new(true));
    let probe = Probe {
        usable: true,
        met: Rc::clone(&met),
        resets: Rc::new(Cell::new(0)),
        checks: Rc::new(Cell::new(0)),
    };

    let walkthrough = Walkthrough::new(
        "instant",
        vec![
            Step::new("already met").with_trigger(probe),
            Step::new("empty"),
            Step::new("dead reference").with_trigger(ButtonPressTrigger::new(None)),
            Step::new("stop").auto_progress_on_complete(false),
        ],
    );

    assert_eq!(walkthrough.current_step(), 3);
    assert!(walkthrough.steps().iter().all(|s| s.completed()));
    assert!(!walkthrough.is_finished());
}

#[test]
fn completion_survives_cancel_and_revisit() {
    let button = ButtonHandle::new("b");
    let mut walkthrough = Walkthrough::new(
        "sticky",
        vec![gated("a", &button), gated("b", &button), gated("c", &button)],
    );

    button.click();
    walkthrough.tick();
    assert_eq!(walkthrough.current_step(), 1);

    walkthrough.previous_step();
    walkthrough.next_step();
    walkthrough.skip_to_step(0, false);

    assert!(walkthrough.steps()[0].completed());
    assert_eq!(
        walkthrough.steps()[0].description(),
        walkthrough::walkthrough::COMPLETE_MARKER.to_string()
    );
}

#[test]
fn current_step_stays_in_range_under_arbitrary_navigation() {
    let buttons: Vec<ButtonHandle> = (0..5).map(|i| ButtonHandle::new(format!("b{i}"))).collect();
    let steps: Vec<Step> = buttons
        .iter()
        .enumerate()
        .map(|(i, b)| {
            gated(&format!("s{i}"), b)
                .block_until_complete(i % 2 == 1)
                .auto_progress_on_complete(i != 3)
        })
        .collect();
    let mut walkthrough = Walkthrough::new("fuzz", steps);

    // Small LCG keeps the sequence reproducible
    let mut seed: u64 = 0x5eed;
    let mut next = move || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) as usize
    };

    for _ in 0..2_000 {
        let before = walkthrough.current_step();
        match next() % 6 {
            0 => walkthrough.next_step(),
            1 => walkthrough.previous_step(),
            2 => {
                let target = next() % 7;
                let blocked = target > before
                    && target < walkthrough.len()
                    && walkthrough.steps()[before..target].iter().any(|s| !s.can_skip());
                walkthrough.skip_to_step(target, next() % 2 == 0);
                if blocked {
                    assert_eq!(walkthrough.current_step(), before);
                }
            }
            3 => buttons[next() % buttons.len()].click(),
            _ => walkthrough.tick(),
        }

        assert!(walkthrough.current_step() <= walkthrough.len());
        assert_eq!(
            walkthrough.is_finished(),
            walkthrough.current_step() == walkthrough.len()
        );
        let completed: Vec<bool> = walkthrough.steps().iter().map(|s| s.completed()).collect();
        walkthrough.tick();
        for (was, step) in completed.iter().zip(walkthrough.steps()) {
            assert!(!was || step.completed());
        }
    }
}

#[test]
fn clicks_from_another_thread_are_seen_by_tick() {
    let button = ButtonHandle::new("remote");
    let mut walkthrough = Walkthrough::new(
        "threads",
        vec![gated("wait", &button), Step::new("done").auto_progress_on_complete(false)],
    );

    let remote = button.clone();
    std::thread::spawn(move || remote.click()).join().unwrap();

    walkthrough.tick();
    assert_eq!(walkthrough.current_step(), 1);
}

// ─── Authoring Files ─────────────────────────────────────────────────────────

#[test]
fn authoring_file_with_every_trigger_type() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("training.toml");
    std::fs::write(
        &path,
        r#"
name = "Training"

[[entities]]
name = "panel"
active = false

[[entities]]
name = "arrow"
parent = "panel"

[[transforms]]
name = "camera"
position = [0.0, 1.6, 0.0]

[[transforms]]
name = "station"
position = [0.0, 1.6, 4.0]

[[buttons]]
name = "continue"

[[proxies]]
name = "table"

[[steps]]
name = "welcome"
description = "Press continue"
visuals = ["arrow"]
[[steps.triggers]]
type = "button_press"
button = "continue"

[[steps]]
name = "pause"
[[steps.triggers]]
type = "delay"
seconds = 1.5

[[steps]]
name = "look"
[[steps.triggers]]
type = "gaze"
eye = "camera"
target = "station"
fov = 30.0

[[steps]]
name = "approach"
[[steps.triggers]]
type = "proximity"
source = "camera"
target = "station"
distance = 0.5

[[steps]]
name = "open"
block_until_complete = true
[[steps.triggers]]
type = "object_active"
entity = "panel"

[[steps]]
name = "locate"
auto_progress_on_complete = false
[[steps.triggers]]
type = "proxy_found"
proxy = "table"
"#,
    )
    .unwrap();

    let clock = Arc::new(ManualClock::new());
    let loaded = definition::load_file(&path, clock.clone()).unwrap();
    let mut walkthrough = loaded.walkthrough;
    let scene = loaded.scene;
    assert!(loaded.unresolved.is_empty());

    let kinds: Vec<TriggerKind> = walkthrough
        .steps()
        .iter()
        .flat_map(|s| s.trigger_kinds())
        .collect();
    assert_eq!(
        kinds,
        vec![
            TriggerKind::ButtonPress,
            TriggerKind::Delay,
            TriggerKind::Gaze,
            TriggerKind::Proximity,
            TriggerKind::ObjectActive,
            TriggerKind::ProxyFound,
        ]
    );

    // Visuals are shown on start, but the hidden parent keeps them out of view
    let arrow = scene.entity("arrow").unwrap();
    assert!(arrow.active_self());
    assert!(!arrow.active_in_hierarchy());

    scene.button("continue").unwrap().click();
    walkthrough.tick();
    assert_eq!(walkthrough.current_step(), 1);
    assert!(!arrow.active_self());

    clock.advance_secs(2.0);
    walkthrough.tick();
    // Camera faces +z toward the station, so gaze passes on start
    assert_eq!(walkthrough.current_step(), 3);

    scene
        .transform("camera")
        .unwrap()
        .set_position(Vec3::new(0.0, 1.6, 3.75));
    walkthrough.tick();
    assert_eq!(walkthrough.current_step(), 4);

    walkthrough.skip_to_step(5, false);
    assert_eq!(walkthrough.current_step(), 4);
    scene.entity("panel").unwrap().set_active(true);
    walkthrough.tick();
    assert_eq!(walkthrough.current_step(), 5);

    scene.proxy("table").unwrap().set_tracking(true);
    walkthrough.tick();
    assert!(walkthrough.steps()[5].completed());
    assert!(!walkthrough.is_finished());
    assert_eq!(walkthrough.progress_label(), "Step 5 / 5");
}

#[test]
fn authoring_file_errors_are_reported() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "name = \"broken\"\n[[steps]]\ndescription = \"no name\"\n").unwrap();

    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new());
    let err = definition::load_file(&path, clock).unwrap_err();
    assert!(matches!(err, walkthrough::DefinitionError::Parse(_)));
}
