use morpheas::prelude::*;
use morpheas::renderer::GpuContext;
use morpheas::texture::TextureRecord;

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[test]
#[ignore = "needs a GPU adapter"]
fn test_offscreen_frame() {
    let _ = env_logger::builder().is_test(true).try_init();
    let context = GpuContext::headless().unwrap();

    let target = context.create_target(64, 64, FORMAT);
    let mut backend = WgpuBackend::new(&context, FORMAT);
    backend.set_target(target.create_view(&wgpu::TextureViewDescriptor::default()), 64, 64);
    let mut canvas = Canvas::new(backend);

    let mut world = World::default();
    let panel = world
        .add(Morph::new().size(40.0, 40.0).corner_radius(6.0).color(Color::BLACK))
        .unwrap();
    let mut icon = Morph::new().position(4.0, 4.0);
    icon.insert_texture(TextureRecord::from_rgba8("dot", 2, 2, &[255; 16]));
    let icon = world.add_child(panel, icon).unwrap();

    let viewport = Rect::new(0.0, 0.0, 64.0, 64.0);
    assert!(world.draw(viewport, &mut canvas).unwrap());
    assert_eq!(canvas.backend().texture_count(), 1);
    assert_eq!(canvas.frame().commands.len(), 2);

    world.remove(icon).unwrap();
    world.draw(viewport, &mut canvas).unwrap();
    assert_eq!(canvas.backend().texture_count(), 0);
}
