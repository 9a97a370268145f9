use floater_wm::canvas::{CloseOutcome, WindowCanvas};
use floater_wm::config::FloaterConfig;
use floater_wm::floater::{Capabilities, ChromeButton, FloaterId, FloaterParams, ViewId};
use floater_wm::geometry::Rect;
use floater_wm::host::InsertionPoint;
use floater_wm::input::PointerEvent;
use floater_wm::persist::{JsonRectStore, RectStore};
use pretty_assertions::assert_eq;

fn canvas() -> WindowCanvas {
    WindowCanvas::new(FloaterConfig::default(), 800, 600)
}

fn open_at(canvas: &mut WindowCanvas, title: &str, rect: Rect) -> FloaterId {
    let id = canvas.create_floater(FloaterParams::new(title).with_rect(rect));
    canvas.open_floater(id);
    id
}

fn button_rect(canvas: &mut WindowCanvas, id: FloaterId, button: ChromeButton) -> Option<Rect> {
    let list = canvas.draw_tick();
    list.item(id)?
        .buttons
        .iter()
        .find(|(b, _)| *b == button)
        .map(|(_, rect)| *rect)
}

#[test]
fn pointer_drag_snaps_to_the_screen_edge() {
    let mut canvas = canvas();
    let w = open_at(&mut canvas, "w", Rect::new(400, 100, 600, 300));

    assert!(canvas.handle_pointer(PointerEvent::down(500, 105)));
    assert!(canvas.drag_session().is_some());
    assert!(canvas.handle_pointer(PointerEvent::drag(705, 105)));
    assert_eq!(canvas.floater(w).unwrap().rect(), Rect::new(600, 100, 800, 300));

    assert!(canvas.handle_pointer(PointerEvent::up(705, 105)));
    assert!(canvas.drag_session().is_none());
    assert_eq!(canvas.mouse_capture(), None);
    assert_eq!(canvas.focused_floater(), Some(w));
}

#[test]
fn minimize_and_restore_through_title_buttons() {
    let mut canvas = canvas();
    let w = open_at(&mut canvas, "w", Rect::new(100, 100, 400, 300));

    let minimize = button_rect(&mut canvas, w, ChromeButton::Minimize).unwrap();
    canvas.handle_pointer(PointerEvent::down(minimize.left, minimize.top));
    canvas.handle_pointer(PointerEvent::up(minimize.left, minimize.top));
    let tile = canvas.floater(w).unwrap().rect();
    assert!(canvas.floater(w).unwrap().is_minimized());
    assert_eq!((tile.left, tile.bottom), (0, 600));
    assert_eq!(canvas.focused_floater(), None);

    let restore = button_rect(&mut canvas, w, ChromeButton::Restore).unwrap();
    assert_eq!(button_rect(&mut canvas, w, ChromeButton::Minimize), None);
    canvas.handle_pointer(PointerEvent::down(restore.left, restore.top));
    assert!(!canvas.floater(w).unwrap().is_minimized());
    assert_eq!(canvas.floater(w).unwrap().rect(), Rect::new(100, 100, 400, 300));
    assert_eq!(canvas.focused_floater(), Some(w));
}

#[test]
fn clicking_a_tab_label_selects_it() {
    let mut canvas = canvas();
    let host = canvas.create_host(
        FloaterParams::new("host").with_rect(Rect::from_origin_size(50, 50, 100, 60)),
        true,
    );
    canvas.open_floater(host);
    let tabs: Vec<FloaterId> = ["a", "b"]
        .iter()
        .map(|title| {
            let id = canvas.create_floater(
                FloaterParams::new(*title)
                    .with_rect(Rect::from_origin_size(300, 300, 200, 100))
                    .with_capabilities(Capabilities::all() - Capabilities::DOCK),
            );
            canvas.add_hosted(host, id, true, InsertionPoint::End);
            id
        })
        .collect();

    let list = canvas.draw_tick();
    let labels = &list.item(host).unwrap().tabs;
    assert_eq!(labels.len(), 2);
    assert!(labels[1].active);
    let first = labels[0].rect;

    canvas.handle_pointer(PointerEvent::down(first.left + 1, first.top));
    assert_eq!(canvas.focused_floater(), Some(tabs[0]));
    assert!(canvas.floater(tabs[0]).unwrap().is_visible());
    assert!(!canvas.floater(tabs[1]).unwrap().is_visible());

    let list = canvas.draw_tick();
    let hosted: Vec<FloaterId> = list
        .items
        .iter()
        .filter(|item| item.hosted)
        .map(|item| item.id)
        .collect();
    assert_eq!(hosted, vec![tabs[0]]);
}

#[test]
fn modal_dialog_swallows_clicks_outside_it() {
    let mut canvas = canvas();
    let w = open_at(&mut canvas, "w", Rect::new(10, 10, 210, 160));
    let dialog = canvas.create_modal_dialog(
        FloaterParams::new("dialog").with_rect(Rect::from_origin_size(0, 0, 200, 100)),
    );
    assert!(canvas.start_modal(dialog));
    assert_eq!(canvas.floater(dialog).unwrap().rect(), Rect::new(300, 250, 500, 350));

    // A title drag on the background window is swallowed.
    assert!(canvas.handle_pointer(PointerEvent::down(100, 15)));
    assert!(canvas.drag_session().is_none());
    assert_eq!(canvas.focused_floater(), Some(dialog));

    // The dialog itself can still be dragged.
    assert!(canvas.handle_pointer(PointerEvent::down(400, 255)));
    canvas.handle_pointer(PointerEvent::drag(410, 255));
    canvas.handle_pointer(PointerEvent::up(410, 255));
    assert_eq!(canvas.floater(dialog).unwrap().rect(), Rect::new(310, 250, 510, 350));

    let list = canvas.draw_tick();
    assert!(list.modal_active);
    assert_eq!(list.items.last().map(|item| item.id), Some(dialog));
    assert_eq!(canvas.mouse_capture(), Some(ViewId::Floater(dialog)));

    assert_eq!(canvas.close_floater(dialog), CloseOutcome::Closed);
    assert!(!canvas.is_modal_active());
    assert_eq!(canvas.focused_floater(), Some(w));
}

#[test]
fn rects_persist_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("positions.json");

    let mut first = canvas().with_rect_store(Box::new(JsonRectStore::open(&path).unwrap()));
    let id = first.create_floater(
        FloaterParams::new("notes")
            .with_rect(Rect::new(100, 100, 300, 250))
            .with_persist_key("notes"),
    );
    first.open_floater(id);
    first.reshape_floater(id, Rect::new(150, 120, 400, 320), true);
    first.shutdown().unwrap();

    let store = JsonRectStore::open(&path).unwrap();
    assert_eq!(store.get_rect("notes"), Some(Rect::new(150, 120, 400, 320)));

    let mut second = canvas().with_rect_store(Box::new(store));
    let id = second.create_floater(FloaterParams::new("notes").with_persist_key("notes"));
    second.open_floater(id);
    assert_eq!(second.floater(id).unwrap().rect(), Rect::new(150, 120, 400, 320));
}

#[test]
fn cascade_positions_repeat_for_a_fresh_canvas() {
    let positions = |canvas: &mut WindowCanvas| -> Vec<Rect> {
        (0..4)
            .map(|i| {
                let id = canvas.create_floater(FloaterParams::new(format!("w{i}")));
                canvas.open_floater(id);
                canvas.floater(id).unwrap().rect()
            })
            .collect()
    };
    let first = positions(&mut canvas());
    let second = positions(&mut canvas());
    assert_eq!(first, second);
    assert_eq!(first[0], Rect::from_origin_size(16, 16, 300, 200));
    assert_eq!(first[1].left - first[0].left, 25);
    assert_eq!(first[1].top - first[0].top, 25);
}
