use std::{cell::RefCell, rc::Rc};

use cgmath::{Deg, perspective};
use shiftview::{
    camera::{OPENGL_TO_WGPU_MATRIX, Projection},
    data_structures::texture::Texture,
    render::{Composer, Pass, PassContext, resize_viewport},
};

type Sizes = Rc<RefCell<Vec<(u32, u32)>>>;

/// Stand-in pass that only records the sizes it is given.
struct SizeRecorder {
    name: &'static str,
    sizes: Sizes,
}

impl Pass for SizeRecorder {
    fn name(&self) -> &str {
        self.name
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.sizes.borrow_mut().push((width, height));
    }

    fn draw(&mut self, _: &mut PassContext<'_>, _: Option<&Texture>, _: &wgpu::TextureView) {
        unreachable!("size recorders are never drawn");
    }
}

fn setup() -> (Projection, Composer, Sizes, Sizes) {
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
    let mut composer = Composer::new(wgpu::TextureFormat::Bgra8UnormSrgb, 800, 600);
    let scene_sizes = Sizes::default();
    let shift_sizes = Sizes::default();
    composer.add_pass(Box::new(SizeRecorder {
        name: "scene",
        sizes: scene_sizes.clone(),
    }));
    composer.add_pass(Box::new(SizeRecorder {
        name: "rgb shift",
        sizes: shift_sizes.clone(),
    }));
    (projection, composer, scene_sizes, shift_sizes)
}

#[test]
fn passes_run_in_insertion_order() {
    let (_, composer, _, _) = setup();
    assert_eq!(composer.pass_names(), ["scene", "rgb shift"]);
    assert_eq!(composer.len(), 2);
}

#[test]
fn resize_updates_projection_and_composer_together() {
    let (mut projection, mut composer, scene_sizes, shift_sizes) = setup();

    assert!(resize_viewport(&mut projection, &mut composer, 1280, 720));

    assert_eq!(projection.aspect(), 1280.0 / 720.0);
    assert_eq!(
        projection.calc_matrix(),
        OPENGL_TO_WGPU_MATRIX * perspective(Deg(75.0), 1280.0 / 720.0, 0.1, 1000.0)
    );
    assert_eq!(composer.size(), (1280, 720));
    assert!(composer.targets_stale());
    assert_eq!(scene_sizes.borrow().last(), Some(&(1280, 720)));
    assert_eq!(shift_sizes.borrow().last(), Some(&(1280, 720)));
}

#[test]
fn zero_sized_viewport_changes_nothing() {
    let (mut projection, mut composer, scene_sizes, _) = setup();
    let before = projection.clone();

    assert!(!resize_viewport(&mut projection, &mut composer, 0, 720));
    assert!(!resize_viewport(&mut projection, &mut composer, 1280, 0));

    assert_eq!(projection, before);
    assert_eq!(composer.size(), (800, 600));
    // Only the size handed over by add_pass
    assert_eq!(*scene_sizes.borrow(), vec![(800, 600)]);
}
