//! End-to-end tests for the paint-bucket tool: painting defaults, gradient
//! removal, and the control-point drag loop (preview, commit, cancel).

use futures::executor::block_on;
use smallvec::smallvec;
use tinta::{
    compile, is_control_point, is_gradient_effect, BlendMode, BucketTool, Color,
    GradientMetadata, GradientShape, GradientStop, Item, ItemKind, ItemStore, MemoryStore,
    Modifiers, Pattern, SceneChange, Style, ToolConfig, ToolEvent, UniformValue, Vec2,
    WatcherDispatcher,
};

fn stop(color: Color, alpha: f32, left: f32) -> GradientStop {
    GradientStop { color, alpha, left }
}

fn two_stop_metadata() -> GradientMetadata {
    GradientMetadata {
        shape: GradientShape::Linear,
        control_point_offsets: smallvec![Vec2::new(0.0, -20.0), Vec2::new(0.0, 20.0)],
        stops: vec![stop(Color::BLACK, 1.0, 0.0), stop(Color::WHITE, 1.0, 1.0)],
        ..GradientMetadata::default()
    }
}

/// A 100x40 shape centered at (50, 20) with a red fill.
fn seed_shape(store: &MemoryStore, painted: bool) -> Item {
    let mut shape = Item::builder(ItemKind::Shape(Style {
        fill_color: Color::rgb(200, 0, 0),
        fill_opacity: 1.0,
    }))
    .name("Lake")
    .position(Vec2::new(50.0, 20.0))
    .size(Vec2::new(100.0, 40.0))
    .build();
    if painted {
        shape.set_gradient_metadata(two_stop_metadata());
    }
    store.insert(shape.clone());
    shape
}

fn click_on(target: &Item) -> ToolEvent {
    ToolEvent {
        target: Some(target.clone()),
        pointer_position: target.position,
        modifiers: Modifiers::default(),
    }
}

fn assert_close(a: Vec2, b: Vec2) {
    assert!(
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3,
        "{a:?} != {b:?}",
    );
}

/// Spins up a painted, watched shape with visible handles, the full tool
/// environment, and returns the handle for axis endpoint 1.
fn dragged_handle(
    store: &MemoryStore,
    dispatcher: &mut WatcherDispatcher,
    tool: &mut BucketTool,
) -> (Item, Item) {
    let shape = seed_shape(store, true);
    block_on(dispatcher.handle_change(store, &SceneChange::added([shape.clone()]))).unwrap();
    block_on(tool.on_activate(store, dispatcher)).unwrap();
    let handle = block_on(
        store.local_items(|item| is_control_point(item) && item.control_point_index() == Some(1)),
    )
    .unwrap()
    .remove(0);
    (shape, handle)
}

#[test]
fn activation_loads_config_and_shows_handles() {
    let store = MemoryStore::new();
    let config = ToolConfig {
        shape: GradientShape::Linear,
        ..ToolConfig::default()
    };
    block_on(store.set_tool_config(config.clone())).unwrap();
    let shape = seed_shape(&store, true);

    let mut dispatcher = WatcherDispatcher::new();
    block_on(dispatcher.handle_change(&store, &SceneChange::added([shape]))).unwrap();

    let mut tool = BucketTool::new();
    block_on(tool.on_activate(&store, &mut dispatcher)).unwrap();
    assert_eq!(tool.config(), Some(&config));
    let handles = block_on(store.local_items(|item| is_control_point(item))).unwrap();
    assert_eq!(handles.len(), 2);

    block_on(tool.on_deactivate(&store, &mut dispatcher)).unwrap();
    let handles = block_on(store.local_items(|item| is_control_point(item))).unwrap();
    assert!(handles.is_empty());
}

/// A plain click with no stored configuration installs the radial
/// white-to-fill default and dims the native fill.
#[test]
fn plain_click_installs_default_gradient() {
    let store = MemoryStore::new();
    let shape = seed_shape(&store, false);
    let mut tool = BucketTool::new();

    block_on(tool.on_click(&store, &click_on(&shape))).unwrap();

    let painted = store.item(shape.id).unwrap();
    let style = painted.style().unwrap();
    assert_eq!(style.fill_color, Color::BLACK);
    assert!((style.fill_opacity - 0.01).abs() < 1e-6);

    let metadata = painted.gradient_metadata().unwrap();
    assert_eq!(metadata.shape, GradientShape::Radial);
    assert_eq!(metadata.pattern, None);
    assert_eq!(metadata.stops.len(), 2);
    assert_eq!(metadata.stops[0].color, Color::WHITE);
    assert_eq!(metadata.stops[0].alpha, 0.0);
    assert_eq!(metadata.stops[1].color, Color::rgb(200, 0, 0));
    assert_eq!(metadata.stops[1].alpha, 1.0);
    // Bounds center to half the smaller extent, in the shape's local space.
    assert_close(metadata.control_point_offsets[0], Vec2::ZERO);
    assert_close(metadata.control_point_offsets[1], Vec2::new(0.0, 20.0));

    // The metadata compiles as-is.
    assert!(compile(metadata).is_some());

    // The follow-up change batch derives the effect.
    let mut dispatcher = WatcherDispatcher::new();
    block_on(dispatcher.handle_change(&store, &SceneChange::updated([painted]))).unwrap();
    let effects = block_on(store.local_items(|item| is_gradient_effect(item))).unwrap();
    assert_eq!(effects.len(), 1);
}

/// A click with a stored configuration applies it wholesale.
#[test]
fn click_applies_stored_configuration() {
    let store = MemoryStore::new();
    let config = ToolConfig {
        shape: GradientShape::Linear,
        angle: 0.0,
        pattern: Some(Pattern::Checker),
        blend_mode: Some(BlendMode::Multiply),
        stops: vec![stop(Color::rgb(0, 0, 255), 1.0, 0.25), stop(Color::WHITE, 0.5, 1.0)],
    };
    block_on(store.set_tool_config(config)).unwrap();
    let shape = seed_shape(&store, false);

    let mut dispatcher = WatcherDispatcher::new();
    let mut tool = BucketTool::new();
    block_on(tool.on_activate(&store, &mut dispatcher)).unwrap();
    block_on(tool.on_click(&store, &click_on(&shape))).unwrap();

    let metadata = store.item(shape.id).unwrap().gradient_metadata().cloned().unwrap();
    assert_eq!(metadata.shape, GradientShape::Linear);
    assert_eq!(metadata.pattern, Some(Pattern::Checker));
    assert_eq!(metadata.blend_mode, Some(BlendMode::Multiply));
    assert_eq!(metadata.stops[0].color, Color::rgb(0, 0, 255));
    // Linear: symmetric endpoints around the bounds center.
    assert_close(metadata.control_point_offsets[0], Vec2::new(0.0, 20.0));
    assert_close(metadata.control_point_offsets[1], Vec2::new(0.0, -20.0));
}

/// Re-painting an already-painted shape keeps the aim the user set up.
#[test]
fn repainting_keeps_existing_control_points() {
    let store = MemoryStore::new();
    let shape = seed_shape(&store, true);
    let mut tool = BucketTool::new();

    block_on(tool.on_click(&store, &click_on(&shape))).unwrap();

    let metadata = store.item(shape.id).unwrap().gradient_metadata().cloned().unwrap();
    assert_close(metadata.control_point_offsets[0], Vec2::new(0.0, -20.0));
    assert_close(metadata.control_point_offsets[1], Vec2::new(0.0, 20.0));
    // But the stops are re-derived from the (still red) fill.
    assert_eq!(metadata.stops[1].color, Color::rgb(200, 0, 0));
}

#[test]
fn modifier_click_and_double_click_remove_the_gradient() {
    let store = MemoryStore::new();
    let shape = seed_shape(&store, true);
    let mut tool = BucketTool::new();

    let mut event = click_on(&shape);
    event.modifiers.shift = true;
    block_on(tool.on_click(&store, &event)).unwrap();
    assert!(store.item(shape.id).unwrap().gradient_metadata().is_none());

    let shape2 = seed_shape(&store, true);
    block_on(tool.on_double_click(&store, &click_on(&shape2))).unwrap();
    assert!(store.item(shape2.id).unwrap().gradient_metadata().is_none());
}

/// Clicks on control points never (re)paint.
#[test]
fn clicks_on_control_points_are_ignored() {
    let store = MemoryStore::new();
    let mut dispatcher = WatcherDispatcher::new();
    let mut tool = BucketTool::new();
    let (shape, handle) = dragged_handle(&store, &mut dispatcher, &mut tool);

    block_on(tool.on_click(&store, &click_on(&handle))).unwrap();

    // The shape still carries its original two stops, not a repaint.
    let metadata = store.item(shape.id).unwrap().gradient_metadata().cloned().unwrap();
    assert_eq!(metadata, two_stop_metadata());
}

/// Dragging previews locally: the handle and the shader uniform move, the
/// persisted metadata does not.
#[test]
fn drag_moves_are_preview_only() {
    let store = MemoryStore::new();
    let mut dispatcher = WatcherDispatcher::new();
    let mut tool = BucketTool::new();
    let (shape, handle) = dragged_handle(&store, &mut dispatcher, &mut tool);

    let mut event = click_on(&handle);
    event.pointer_position = handle.position;
    block_on(tool.on_drag_start(&store, &event)).unwrap();
    assert!(tool.is_dragging());

    block_on(tool.on_drag_move(&store, Vec2::new(80.0, 50.0))).unwrap();
    block_on(tool.on_drag_move(&store, Vec2::new(90.0, 60.0))).unwrap();

    // Handle follows the pointer in world space.
    assert_close(
        store.local_item(handle.id).unwrap().position,
        Vec2::new(90.0, 60.0),
    );
    // The cp1 uniform holds the local-space offset (shape center (50, 20)).
    let effect = block_on(store.local_items(|item| is_gradient_effect(item)))
        .unwrap()
        .remove(0);
    let cp1 = effect
        .effect()
        .unwrap()
        .uniforms
        .iter()
        .find(|u| u.name == "cp1")
        .cloned()
        .unwrap();
    assert_eq!(cp1.value, UniformValue::Vec2(Vec2::new(40.0, 40.0)));

    // Nothing persisted yet.
    let metadata = store.item(shape.id).unwrap().gradient_metadata().cloned().unwrap();
    assert_close(metadata.control_point_offsets[1], Vec2::new(0.0, 20.0));
}

/// Drag end persists the final local-space offset into the target.
#[test]
fn drag_end_commits_the_offset() {
    let store = MemoryStore::new();
    let mut dispatcher = WatcherDispatcher::new();
    let mut tool = BucketTool::new();
    let (shape, handle) = dragged_handle(&store, &mut dispatcher, &mut tool);

    block_on(tool.on_drag_start(&store, &click_on(&handle))).unwrap();
    block_on(tool.on_drag_move(&store, Vec2::new(60.0, 30.0))).unwrap();
    block_on(tool.on_drag_end(&store, Vec2::new(80.0, 50.0))).unwrap();
    assert!(!tool.is_dragging());

    let metadata = store.item(shape.id).unwrap().gradient_metadata().cloned().unwrap();
    assert_close(metadata.control_point_offsets[1], Vec2::new(30.0, 30.0));
    // Endpoint 0 is untouched.
    assert_close(metadata.control_point_offsets[0], Vec2::new(0.0, -20.0));
}

/// Drag cancel restores the handle and the uniform to their pre-drag values
/// and persists nothing.
#[test]
fn drag_cancel_restores_pre_drag_state() {
    let store = MemoryStore::new();
    let mut dispatcher = WatcherDispatcher::new();
    let mut tool = BucketTool::new();
    let (shape, handle) = dragged_handle(&store, &mut dispatcher, &mut tool);
    let start_position = handle.position;

    block_on(tool.on_drag_start(&store, &click_on(&handle))).unwrap();
    for step in 1..=4 {
        let wander = Vec2::new(50.0 + 10.0 * step as f32, 20.0 + 5.0 * step as f32);
        block_on(tool.on_drag_move(&store, wander)).unwrap();
    }
    block_on(tool.on_drag_cancel(&store)).unwrap();
    assert!(!tool.is_dragging());

    assert_close(store.local_item(handle.id).unwrap().position, start_position);
    let effect = block_on(store.local_items(|item| is_gradient_effect(item)))
        .unwrap()
        .remove(0);
    let cp1 = effect
        .effect()
        .unwrap()
        .uniforms
        .iter()
        .find(|u| u.name == "cp1")
        .cloned()
        .unwrap();
    // Back to the original local offset.
    assert_eq!(cp1.value, UniformValue::Vec2(Vec2::new(0.0, 20.0)));

    let metadata = store.item(shape.id).unwrap().gradient_metadata().cloned().unwrap();
    assert_close(metadata.control_point_offsets[1], Vec2::new(0.0, 20.0));
}

/// A drag that cannot resolve its effect (or whose target is gone) never
/// starts.
#[test]
fn unresolvable_drags_stay_idle() {
    let store = MemoryStore::new();
    let mut dispatcher = WatcherDispatcher::new();
    let mut tool = BucketTool::new();
    let (shape, handle) = dragged_handle(&store, &mut dispatcher, &mut tool);

    // Delete the target (and with it, the attached effect and handles).
    store.delete_items(&[shape.id]);
    block_on(tool.on_drag_start(&store, &click_on(&handle))).unwrap();
    assert!(!tool.is_dragging());

    // A drag started on something that is not a control point is ignored.
    let other = seed_shape(&store, true);
    block_on(tool.on_drag_start(&store, &click_on(&other))).unwrap();
    assert!(!tool.is_dragging());
}
