//! Overlay demo: a draggable panel with a close button and a label, driven
//! by synthetic host events and drawn offscreen.
//!
//! Run with: RUST_LOG=debug cargo run --example overlay

use morpheas::prelude::*;
use morpheas::renderer::{DrawCommand, GpuContext};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn build(world: &mut World) -> morpheas::Result<NodeId> {
    let panel = world.add(
        Morph::button()
            .name("panel")
            .position(40.0, 40.0)
            .size(160.0, 100.0)
            .corner_radius(8.0)
            .color(Color::rgb(0.2, 0.2, 0.25)),
    )?;

    world.add_child(
        panel,
        Morph::text("Drag me")
            .name("title")
            .position(12.0, 60.0)
            .font_size(14.0),
    )?;

    world.add_child(
        panel,
        Morph::button()
            .name("close")
            .position(136.0, 76.0)
            .size(16.0, 16.0)
            .corner_radius(8.0)
            .color(Color::rgb(0.9, 0.3, 0.3))
            .on(ActionKind::LeftClick, |ctx: &mut ActionContext<'_>| {
                if let Some(panel) = ctx.world().find_by_name("panel") {
                    log::info!("close clicked, hiding panel");
                    if let Err(err) = ctx.world_mut().set_hidden(panel, true) {
                        log::error!("failed to hide panel: {}", err);
                    }
                }
                Reply::Handled
            }),
    )?;

    Ok(panel)
}

fn main() -> morpheas::Result<()> {
    env_logger::init();

    let context = GpuContext::headless()?;
    let target = context.create_target(WIDTH, HEIGHT, FORMAT);
    let mut backend = WgpuBackend::new(&context, FORMAT);
    backend.set_target(
        target.create_view(&wgpu::TextureViewDescriptor::default()),
        WIDTH,
        HEIGHT,
    );
    let mut canvas = Canvas::new(backend).with_text_shaper(CosmicTextShaper::new());

    let mut world = World::default();
    let panel = build(&mut world)?;

    let window = Rect::new(0.0, 0.0, WIDTH as f32, HEIGHT as f32);
    world.draw(window, &mut canvas)?;

    // Press on the panel body, drag it, release
    let events = [
        InputEvent::MouseMove { x: 60.0, y: 60.0 },
        InputEvent::MouseDown {
            x: 60.0,
            y: 60.0,
            button: MouseButton::Left,
        },
        InputEvent::MouseMove { x: 90.0, y: 80.0 },
        InputEvent::MouseUp {
            x: 90.0,
            y: 80.0,
            button: MouseButton::Left,
        },
    ];
    for event in events {
        let consumed = world.on_event(event.clone(), window);
        log::info!("{:?} consumed: {}", event, consumed);
        world.draw(window, &mut canvas)?;
    }

    let position = world.morph(panel).map(|m| m.get_position());
    log::info!("panel moved to {:?}", position);

    let frame = canvas.frame();
    let quads = frame
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Quad { .. }))
        .count();
    log::info!(
        "last frame: {} commands, {} textured, {} live textures",
        frame.commands.len(),
        quads,
        canvas.backend().texture_count()
    );

    canvas.release_all(&mut world);
    Ok(())
}
