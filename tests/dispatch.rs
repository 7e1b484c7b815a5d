use std::cell::RefCell;
use std::rc::Rc;

use morpheas::prelude::*;

const REGION: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 800.0,
    height: 600.0,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn left(down: bool, x: f32, y: f32) -> InputEvent {
    if down {
        InputEvent::MouseDown {
            x,
            y,
            button: MouseButton::Left,
        }
    } else {
        InputEvent::MouseUp {
            x,
            y,
            button: MouseButton::Left,
        }
    }
}

#[test]
fn test_drag_follows_pointer() {
    init();
    let mut world = World::default();
    let button = world
        .add(Morph::button().position(10.0, 10.0).size(50.0, 50.0))
        .unwrap();

    assert!(world.on_event(left(true, 30.0, 30.0), REGION));
    assert!(world.consumed_event());
    let morph = world.morph(button).unwrap();
    assert!(morph.is_dragging());
    assert_eq!(morph.drag_anchor(), Some(Point::new(30.0, 30.0)));

    world.on_event(InputEvent::MouseMove { x: 40.0, y: 45.0 }, REGION);
    let morph = world.morph(button).unwrap();
    assert_eq!(morph.get_position(), Point::new(20.0, 25.0));
    assert_eq!(morph.drag_anchor(), Some(Point::new(40.0, 45.0)));

    assert!(world.on_event(left(false, 40.0, 45.0), REGION));
    assert!(!world.morph(button).unwrap().is_dragging());
}

#[test]
fn test_drag_ends_when_pointer_leaves() {
    let mut world = World::default();
    let button = world
        .add(Morph::button().position(0.0, 0.0).size(20.0, 20.0))
        .unwrap();

    world.on_event(left(true, 10.0, 10.0), REGION);
    assert!(world.morph(button).unwrap().is_dragging());

    // A jump larger than the morph: the drag translates it first, so the
    // pointer is still inside afterwards
    world.on_event(InputEvent::MouseMove { x: 100.0, y: 100.0 }, REGION);
    assert_eq!(
        world.morph(button).unwrap().get_position(),
        Point::new(90.0, 90.0)
    );
    assert!(world.morph(button).unwrap().is_dragging());

    // Dragging stops tracking once the pointer is outside after the update
    world.morph_mut(button).unwrap().set_position(Point::new(300.0, 300.0));
    world.on_event(InputEvent::MouseMove { x: 101.0, y: 101.0 }, REGION);
    assert!(!world.morph(button).unwrap().is_dragging());
}

#[test]
fn test_press_on_edge_is_not_consumed() {
    let mut world = World::default();
    world
        .add(Morph::button().position(10.0, 10.0).size(50.0, 50.0))
        .unwrap();

    assert!(!world.on_event(left(true, 10.0, 10.0), REGION));
    assert!(!world.on_event(left(true, 60.0, 30.0), REGION));
}

#[test]
fn test_bound_action_replaces_drag() {
    let clicks = Rc::new(RefCell::new(0));
    let counter = clicks.clone();

    let mut world = World::default();
    let button = world
        .add(
            Morph::button()
                .size(50.0, 50.0)
                .on(ActionKind::LeftClick, move |_: &mut ActionContext<'_>| {
                    *counter.borrow_mut() += 1;
                    Reply::Handled
                }),
        )
        .unwrap();

    world.on_event(left(true, 5.0, 5.0), REGION);
    world.on_event(left(true, 6.0, 6.0), REGION);

    assert_eq!(*clicks.borrow(), 2);
    assert!(!world.morph(button).unwrap().is_dragging());
    assert!(world.morph(button).unwrap().actions().is_bound(ActionKind::LeftClick));
}

#[test]
fn test_right_click_actions() {
    let seen = Rc::new(RefCell::new(Vec::new()));

    let mut world = World::default();
    let log_press = seen.clone();
    let log_release = seen.clone();
    world
        .add(
            Morph::button()
                .size(50.0, 50.0)
                .on(ActionKind::RightClick, move |ctx: &mut ActionContext<'_>| {
                    log_press.borrow_mut().push("press");
                    ctx.pass_through()
                })
                .on(
                    ActionKind::RightClickReleased,
                    move |_: &mut ActionContext<'_>| {
                        log_release.borrow_mut().push("release");
                        Reply::Handled
                    },
                ),
        )
        .unwrap();

    let right = |down: bool| {
        let (x, y, button) = (5.0, 5.0, MouseButton::Right);
        if down {
            InputEvent::MouseDown { x, y, button }
        } else {
            InputEvent::MouseUp { x, y, button }
        }
    };
    assert!(world.on_event(right(true), REGION));
    assert!(world.on_event(right(false), REGION));
    assert_eq!(*seen.borrow(), vec!["press", "release"]);
}

#[test]
fn test_topmost_sibling_consumes_first() {
    let mut world = World::default();
    let bottom = world.add(Morph::button().size(50.0, 50.0)).unwrap();
    let top = world.add(Morph::button().size(50.0, 50.0)).unwrap();

    world.on_event(left(true, 10.0, 10.0), REGION);

    assert!(world.morph(top).unwrap().is_dragging());
    assert!(!world.morph(bottom).unwrap().is_dragging());
}

#[test]
fn test_moves_reach_every_hovered_sibling() {
    let entered = Rc::new(RefCell::new(Vec::new()));

    let mut world = World::default();
    for name in ["a", "b"] {
        let log = entered.clone();
        world
            .add(
                Morph::button()
                    .name(name)
                    .size(50.0, 50.0)
                    .on(ActionKind::MouseIn, move |ctx: &mut ActionContext<'_>| {
                        let name = ctx.morph().and_then(|m| m.get_name()).map(str::to_string);
                        log.borrow_mut().extend(name);
                        Reply::Handled
                    }),
            )
            .unwrap();
    }

    world.on_event(InputEvent::MouseMove { x: 10.0, y: 10.0 }, REGION);
    assert_eq!(*entered.borrow(), vec!["b".to_string(), "a".to_string()]);
}

#[test]
fn test_mouse_in_runs_without_hover_flag() {
    let entered = Rc::new(RefCell::new(0));
    let counter = entered.clone();

    let mut world = World::default();
    world
        .add(
            Morph::new()
                .size(50.0, 50.0)
                .flags(EventFlags::EVENTS)
                .on(ActionKind::MouseIn, move |_: &mut ActionContext<'_>| {
                    *counter.borrow_mut() += 1;
                    Reply::Handled
                }),
        )
        .unwrap();

    world.on_event(InputEvent::MouseMove { x: 10.0, y: 10.0 }, REGION);
    assert_eq!(*entered.borrow(), 1);
}

#[test]
fn test_mouse_down_morph_drags_by_default() {
    let mut world = World::default();
    let id = world
        .add(
            Morph::new()
                .position(10.0, 10.0)
                .size(50.0, 50.0)
                .flags(EventFlags::EVENTS | EventFlags::MOUSE_DOWN),
        )
        .unwrap();

    assert!(world.on_event(left(true, 30.0, 30.0), REGION));
    assert!(world.morph(id).unwrap().is_dragging());

    world.on_event(InputEvent::MouseMove { x: 40.0, y: 45.0 }, REGION);
    assert_eq!(world.morph(id).unwrap().get_position(), Point::new(20.0, 25.0));
}

#[test]
fn test_action_can_remove_its_morph() {
    let mut world = World::default();
    let id = world
        .add(
            Morph::button()
                .size(50.0, 50.0)
                .on(ActionKind::LeftClick, |ctx: &mut ActionContext<'_>| {
                    let node = ctx.node();
                    let _ = ctx.world_mut().remove(node);
                    Reply::Handled
                }),
        )
        .unwrap();

    assert!(world.on_event(left(true, 10.0, 10.0), REGION));
    assert!(!world.contains(id));
}

#[test]
fn test_region_offset_translates_pointer() {
    let mut world = World::default();
    let button = world
        .add(Morph::button().position(10.0, 10.0).size(20.0, 20.0))
        .unwrap();

    // The event region sits 100px to the right of the draw region
    let region = Rect::new(100.0, 0.0, 200.0, 200.0);
    assert!(!world.on_event(left(true, 15.0, 15.0), region));
    assert!(world.on_event(left(true, -85.0, 15.0), region));
    assert_eq!(world.pointer_absolute(), Point::new(15.0, 15.0));
    assert!(world.morph(button).unwrap().is_dragging());
}
