use std::{cell::RefCell, rc::Rc};

use instant::Duration;
use shiftview::flow::{FrameScheduler, FrameTarget, drive_frame};

type Calls = Rc<RefCell<Vec<String>>>;

struct Scheduler(Calls);

impl FrameScheduler for Scheduler {
    fn request_next_frame(&self) {
        self.0.borrow_mut().push("request".to_string());
    }
}

struct Target {
    calls: Calls,
    fail: bool,
}

impl FrameTarget for Target {
    type Error = String;

    fn tick(&mut self, dt: Duration) {
        self.calls
            .borrow_mut()
            .push(format!("tick {}ms", dt.as_millis()));
    }

    fn render(&mut self) -> Result<(), String> {
        self.calls.borrow_mut().push("render".to_string());
        if self.fail {
            Err("surface lost".to_string())
        } else {
            Ok(())
        }
    }
}

#[test]
fn each_frame_schedules_then_ticks_then_renders() {
    let calls = Calls::default();
    let scheduler = Scheduler(calls.clone());
    let mut target = Target {
        calls: calls.clone(),
        fail: false,
    };

    for _ in 0..3 {
        drive_frame(&scheduler, &mut target, Duration::from_millis(16)).unwrap();
    }

    let expected: Vec<String> = ["request", "tick 16ms", "render"]
        .repeat(3)
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(*calls.borrow(), expected);
}

#[test]
fn failed_render_still_schedules_next_frame() {
    let calls = Calls::default();
    let scheduler = Scheduler(calls.clone());
    let mut target = Target {
        calls: calls.clone(),
        fail: true,
    };

    let result = drive_frame(&scheduler, &mut target, Duration::ZERO);

    assert_eq!(result, Err("surface lost".to_string()));
    assert_eq!(calls.borrow().first().map(String::as_str), Some("request"));
}
