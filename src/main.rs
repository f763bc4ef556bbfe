//! Falling shapes: press and hold on a shape to lift it

use std::env;
use std::process::ExitCode;

use rustc_hash::FxHashMap;
use shapefall::core::ViewConfig;
use shapefall::hecs::Entity;
use shapefall::prelude::*;
use shapefall::scene::srgb_to_linear;

/// One uploaded mesh per shape kind, plus the ground
struct Meshes {
    cube: Mesh,
    sphere: Mesh,
    cylinder: Mesh,
    tetrahedron: Mesh,
    plane: Mesh,
}

impl Meshes {
    fn new() -> Self {
        Self {
            cube: Mesh::cube(),
            sphere: Mesh::sphere(1.0, 32, 16),
            cylinder: Mesh::cylinder(1.0, 1.0, 32),
            tetrahedron: Mesh::tetrahedron(1.0),
            plane: Mesh::plane(1.0),
        }
    }

    fn upload(&mut self, renderer: &Renderer) {
        for mesh in [
            &mut self.cube,
            &mut self.sphere,
            &mut self.cylinder,
            &mut self.tetrahedron,
            &mut self.plane,
        ] {
            renderer.upload_mesh(mesh);
        }
    }

    fn for_kind(&self, kind: ShapeKind) -> &Mesh {
        match kind {
            ShapeKind::Box => &self.cube,
            ShapeKind::Sphere => &self.sphere,
            ShapeKind::Cylinder => &self.cylinder,
            ShapeKind::Tetrahedron => &self.tetrahedron,
        }
    }
}

struct FallingShapes {
    view: ViewConfig,
    scene: SceneRoot,
    camera: Camera,
    light: Light,
    meshes: Meshes,
    ground_model: Option<GpuModel>,
    models: FxHashMap<Entity, GpuModel>,
}

impl FallingShapes {
    fn new(config: &AppConfig) -> Self {
        let view = config.view.clone();
        Self {
            camera: Camera::look_at(view.camera_position, view.camera_target, Vec3::Y)
                .with_fov_degrees(view.fov_degrees),
            light: Light::new(view.light_position)
                .with_intensity(view.light_intensity)
                .with_ambient(view.ambient_intensity),
            scene: SceneRoot::new(config.scene.clone()),
            meshes: Meshes::new(),
            ground_model: None,
            models: FxHashMap::default(),
            view,
        }
    }

    /// Keep one GPU model per live shape, transforms current
    fn sync_models(&mut self, renderer: &Renderer, poses: &[ShapePose]) {
        let scale = Vec3::splat(self.scene.config().shape_scale);

        for pose in poses {
            let transform = Mat4::from_scale_rotation_translation(scale, pose.rotation, pose.position);
            match self.models.get(&pose.entity) {
                Some(model) => renderer.update_model(model, transform),
                None => {
                    let material = Material::new(pose.color.to_linear_rgb());
                    let model = renderer.create_model(transform, &material);
                    self.models.insert(pose.entity, model);
                }
            }
        }

        if self.models.len() > poses.len() {
            self.models
                .retain(|entity, _| poses.iter().any(|pose| pose.entity == *entity));
        }
    }
}

impl Game for FallingShapes {
    fn init(&mut self, ctx: &mut EngineContext) {
        let (width, height) = (ctx.width(), ctx.height());
        let Some(renderer) = ctx.renderer_mut() else {
            log::error!("Renderer missing at init");
            return;
        };

        renderer.set_clear_color(srgb_to_linear(Vec3::from(self.view.background)));
        self.meshes.upload(renderer);

        let ground = self.scene.ground();
        let ground_material = Material::diffuse(srgb_to_linear(Vec3::from(self.view.ground_color)));
        self.ground_model = Some(renderer.create_model(ground.transform(), &ground_material));

        self.camera.set_aspect(width, height);

        log::info!("Falling shapes ready, hold the left button on a shape to lift it");
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        if ctx.input.is_key_just_pressed(KeyCode::Escape) {
            ctx.quit();
            return;
        }

        let (width, height) = (ctx.width(), ctx.height());
        let ray = ctx
            .input
            .cursor_position()
            .map(|cursor| self.camera.screen_ray(cursor, width, height));

        if let Some(ray) = ray {
            if ctx.input.cursor_moved() {
                self.scene.pointer_move(&ray);
            }
            if ctx.input.is_mouse_button_just_pressed(MouseButton::Left) {
                self.scene.pointer_down(&ray);
            }
            if ctx.input.is_mouse_button_just_released(MouseButton::Left) {
                self.scene.pointer_up(&ray);
            }
        }
        if ctx.input.cursor_left() {
            self.scene.pointer_left();
        }

        self.scene.update(ctx.time.delta());
    }

    fn render(&mut self, ctx: &mut EngineContext) {
        let Some(renderer) = ctx.renderer_mut() else {
            return;
        };
        renderer.update_camera(&self.camera);
        renderer.update_light(&self.light);
        let renderer: &Renderer = renderer;

        let poses = self.scene.poses();
        self.sync_models(renderer, &poses);

        let Some(ground_model) = &self.ground_model else {
            return;
        };
        let Some(mut frame) = renderer.begin_frame() else {
            return;
        };

        {
            let mut render_pass = renderer.begin_render_pass(&mut frame);

            renderer.draw_mesh(&mut render_pass, &self.meshes.plane, ground_model);
            for pose in &poses {
                if let Some(model) = self.models.get(&pose.entity) {
                    renderer.draw_mesh(&mut render_pass, self.meshes.for_kind(pose.kind), model);
                }
            }
        }

        renderer.end_frame(frame);
    }

    fn on_resize(&mut self, _ctx: &mut EngineContext, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    fn on_visibility_changed(&mut self, _ctx: &mut EngineContext, hidden: bool) {
        self.scene.on_visibility_changed(hidden);
    }

    fn shutdown(&mut self, _ctx: &mut EngineContext) {
        self.scene.teardown();
        self.models.clear();
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1) {
        Some(path) => match AppConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("Could not load {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };

    let game = FallingShapes::new(&config);
    let engine = Engine::new(EngineConfig::from(&config.window), game);

    if let Err(err) = engine.run() {
        log::error!("Engine error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
