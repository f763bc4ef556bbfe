//! Core Engine struct and main loop

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::core::Time;
use crate::core::config::WindowConfig;
use crate::input::Input;
use crate::renderer::Renderer;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&WindowConfig::default())
    }
}

impl From<&WindowConfig> for EngineConfig {
    fn from(window: &WindowConfig) -> Self {
        Self {
            title: window.title.clone(),
            width: window.width,
            height: window.height,
            vsync: window.vsync,
        }
    }
}

/// Why the window is not visible; either reason hides it
///
/// The two are tracked apart so a restore from minimize does not reveal a
/// window that is still occluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Visibility {
    occluded: bool,
    minimized: bool,
}

impl Visibility {
    fn with_occluded(self, occluded: bool) -> Self {
        Self { occluded, ..self }
    }

    fn with_minimized(self, minimized: bool) -> Self {
        Self { minimized, ..self }
    }

    fn is_hidden(&self) -> bool {
        self.occluded || self.minimized
    }
}

/// Game trait that applications implement
pub trait Game: 'static {
    /// Called once when the renderer is ready
    fn init(&mut self, engine: &mut EngineContext);

    /// Called every visible frame for logic updates
    fn update(&mut self, engine: &mut EngineContext);

    /// Called every visible frame for rendering
    fn render(&mut self, engine: &mut EngineContext);

    /// Called when the window is resized
    fn on_resize(&mut self, _engine: &mut EngineContext, _width: u32, _height: u32) {}

    /// Called when the window becomes hidden (`true`) or visible again (`false`)
    fn on_visibility_changed(&mut self, _engine: &mut EngineContext, _hidden: bool) {}

    /// Called when the application is shutting down
    fn shutdown(&mut self, _engine: &mut EngineContext) {}
}

/// Context passed to game callbacks
pub struct EngineContext {
    /// Time tracking
    pub time: Time,
    /// Input state
    pub input: Input,
    /// Renderer (available after initialization)
    renderer: Option<Renderer>,
    /// Window size
    window_size: PhysicalSize<u32>,
    /// Occlusion and minimization state
    visibility: Visibility,
    /// Should the engine quit
    should_quit: bool,
}

impl EngineContext {
    fn new(width: u32, height: u32) -> Self {
        Self {
            time: Time::new(),
            input: Input::new(),
            renderer: None,
            window_size: PhysicalSize::new(width, height),
            visibility: Visibility::default(),
            should_quit: false,
        }
    }

    /// Get the renderer, if initialized
    pub fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    /// Get the renderer mutably, if initialized
    pub fn renderer_mut(&mut self) -> Option<&mut Renderer> {
        self.renderer.as_mut()
    }

    /// Get window width
    pub fn width(&self) -> u32 {
        self.window_size.width
    }

    /// Get window height
    pub fn height(&self) -> u32 {
        self.window_size.height
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Check if engine should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// Main engine struct
pub struct Engine<G: Game> {
    config: EngineConfig,
    game: G,
    context: EngineContext,
    window: Option<Arc<Window>>,
    initialized: bool,
    shut_down: bool,
    error: Option<Box<dyn std::error::Error>>,
}

impl<G: Game> Engine<G> {
    /// Create a new engine with the given game
    pub fn new(config: EngineConfig, game: G) -> Self {
        let context = EngineContext::new(config.width, config.height);
        Self {
            config,
            game,
            context,
            window: None,
            initialized: false,
            shut_down: false,
            error: None,
        }
    }

    /// Run the engine until the window closes
    pub fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Starting engine: {}", self.config.title);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;

        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if !self.shut_down {
            self.shut_down = true;
            self.game.shutdown(&mut self.context);
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Box<dyn std::error::Error>) {
        log::error!("Engine error: {err}");
        self.error = Some(err);
        self.shutdown(event_loop);
    }

    /// Occlusion and minimization changes both land here
    fn set_visibility(&mut self, visibility: Visibility) {
        let hidden = visibility.is_hidden();
        let was_hidden = self.context.visibility.is_hidden();
        self.context.visibility = visibility;
        if hidden == was_hidden {
            return;
        }
        log::debug!("Window {}", if hidden { "hidden" } else { "visible" });

        if !hidden {
            self.context.time.resync();
        }
        if self.initialized {
            self.game.on_visibility_changed(&mut self.context, hidden);
        }
    }
}

impl<G: Game> ApplicationHandler for Engine<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, Box::new(err)),
        };

        let renderer = match pollster::block_on(Renderer::new(
            Arc::clone(&window),
            self.config.vsync,
        )) {
            Ok(renderer) => renderer,
            Err(err) => return self.fail(event_loop, Box::new(err)),
        };

        let size = window.inner_size();
        self.context.window_size = size;
        self.context.renderer = Some(renderer);
        self.window = Some(window);

        if !self.initialized {
            self.game.init(&mut self.context);
            self.initialized = true;
            self.context.time.resync();
            log::info!("Engine initialized successfully");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down");
                self.shutdown(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    self.context.window_size = new_size;
                    if let Some(renderer) = &mut self.context.renderer {
                        renderer.resize(new_size.width, new_size.height);
                    }
                    self.game
                        .on_resize(&mut self.context, new_size.width, new_size.height);
                    self.set_visibility(self.context.visibility.with_minimized(false));
                } else {
                    // Minimized on some platforms
                    self.set_visibility(self.context.visibility.with_minimized(true));
                }
            }

            WindowEvent::Occluded(occluded) => {
                self.set_visibility(self.context.visibility.with_occluded(occluded));
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(key_code) = event.physical_key {
                    self.context.input.process_keyboard(key_code, event.state);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.context.input.process_mouse_button(button, state);
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.context
                    .input
                    .process_cursor_moved(glam::Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::CursorLeft { .. } => {
                self.context.input.process_cursor_left();
            }

            WindowEvent::RedrawRequested => {
                if self.context.visibility.is_hidden() {
                    return;
                }

                self.context.time.update();

                self.game.update(&mut self.context);

                if self.context.should_quit() {
                    self.shutdown(event_loop);
                    return;
                }

                self.game.render(&mut self.context);

                // Clear per-frame input state
                self.context.input.update();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.visibility.is_hidden() {
            // Nothing to draw; sleep until the next window event
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_while_occluded_stays_hidden() {
        let visibility = Visibility::default()
            .with_occluded(true)
            .with_minimized(true)
            .with_minimized(false);

        assert!(visibility.is_hidden());
        assert!(!visibility.with_occluded(false).is_hidden());
    }

    #[test]
    fn test_either_reason_hides() {
        assert!(!Visibility::default().is_hidden());
        assert!(Visibility::default().with_occluded(true).is_hidden());
        assert!(Visibility::default().with_minimized(true).is_hidden());
    }

    #[test]
    fn test_window_config_carries_over() {
        let window = WindowConfig {
            title: "Shapes".into(),
            width: 640,
            height: 480,
            vsync: false,
        };
        let config = EngineConfig::from(&window);

        assert_eq!(config.title, "Shapes");
        assert_eq!((config.width, config.height), (640, 480));
        assert!(!config.vsync);
    }
}
