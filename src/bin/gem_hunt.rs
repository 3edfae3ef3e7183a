//! Example game built on the key mapper
//!
//! A tiny top-down gem hunt: steer a ship, thrust, and scoop up gems. The
//! point is the integration pattern, not the gameplay:
//!
//! - analog held values drive thrust and steering (gamepad axis bindings
//!   with keyboard alternates attached to the same actions);
//! - the application owns persistence: bindings are loaded from a RON file
//!   at startup and written back whenever a binding changes;
//! - digits rebind controls in-game through the capture flow.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use keymapper::prelude::*;

/// Where this application keeps its bindings. The mapper itself never
/// touches the filesystem.
const BINDINGS_FILE: &str = "gem_hunt_bindings.ron";

/// Half-extent of the square play field.
const FIELD_HALF: f32 = 10.0;

/// Distance at which a gem can be collected.
const COLLECT_RADIUS: f32 = 1.5;

// ============================================================================
// Input setup
// ============================================================================

/// Register the game's controls: gamepad-first defaults with keyboard
/// alternates attached to the same actions.
fn build_mapper() -> Result<KeyMapper, MapperError> {
    let mut mapper = KeyMapper::new();

    mapper.add_action(
        "turn_left",
        BindingKind::Held,
        PhysicalInput::Axis {
            axis: GamepadAxis::LeftStickX,
            direction: AxisDirection::Negative,
        },
        DeviceClass::Gamepad,
    )?;
    mapper.add_action(
        "turn_right",
        BindingKind::Held,
        PhysicalInput::Axis {
            axis: GamepadAxis::LeftStickX,
            direction: AxisDirection::Positive,
        },
        DeviceClass::Gamepad,
    )?;
    mapper.add_action(
        "thrust",
        BindingKind::Held,
        PhysicalInput::GamepadButton(GamepadButton::South),
        DeviceClass::Gamepad,
    )?;
    mapper.add_action(
        "collect",
        BindingKind::PressedAndReleased,
        PhysicalInput::GamepadButton(GamepadButton::RightTrigger),
        DeviceClass::Gamepad,
    )?;
    mapper.add_action(
        "menu",
        BindingKind::Released,
        PhysicalInput::GamepadButton(GamepadButton::Back),
        DeviceClass::Gamepad,
    )?;

    // Keyboard alternates for play without a controller
    mapper.attach_input(
        "turn_left",
        PhysicalInput::key(KeyCode::ArrowLeft),
        DeviceClass::Keyboard,
    )?;
    mapper.attach_input(
        "turn_right",
        PhysicalInput::key(KeyCode::ArrowRight),
        DeviceClass::Keyboard,
    )?;
    mapper.attach_input(
        "thrust",
        PhysicalInput::key(KeyCode::ArrowUp),
        DeviceClass::Keyboard,
    )?;
    mapper.attach_input(
        "collect",
        PhysicalInput::key(KeyCode::Space),
        DeviceClass::Keyboard,
    )?;
    mapper.attach_input(
        "menu",
        PhysicalInput::key(KeyCode::Escape),
        DeviceClass::Keyboard,
    )?;

    Ok(mapper)
}

/// Load previously saved bindings, if any.
fn load_bindings(mapper: &mut KeyMapper) {
    if !Path::new(BINDINGS_FILE).exists() {
        return;
    }
    let applied = std::fs::read_to_string(BINDINGS_FILE)
        .map_err(|e| e.to_string())
        .and_then(|text| ron::from_str::<MappingSnapshot>(&text).map_err(|e| e.to_string()))
        .and_then(|snapshot| mapper.apply_snapshot(&snapshot).map_err(|e| e.to_string()));

    match applied {
        Ok(()) => log::info!("loaded bindings from {}", BINDINGS_FILE),
        Err(e) => log::warn!("could not load {}: {}", BINDINGS_FILE, e),
    }
}

/// Write the current bindings back to disk.
fn save_bindings(mapper: &KeyMapper) {
    let saved = ron::to_string(&mapper.snapshot())
        .map_err(|e| e.to_string())
        .and_then(|text| std::fs::write(BINDINGS_FILE, text).map_err(|e| e.to_string()));

    match saved {
        Ok(()) => log::debug!("saved bindings to {}", BINDINGS_FILE),
        Err(e) => log::warn!("could not save {}: {}", BINDINGS_FILE, e),
    }
}

// ============================================================================
// Game state
// ============================================================================

/// Deterministic gem placement, so runs are reproducible.
struct GemSpawner {
    state: u32,
}

impl GemSpawner {
    fn new() -> Self {
        Self { state: 0x2545_1db5 }
    }

    fn next_unit(&mut self) -> f32 {
        // Xorshift; plenty for scattering gems
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        (self.state >> 8) as f32 / (1u32 << 24) as f32
    }

    fn next_position(&mut self) -> Vec2 {
        let x = (self.next_unit() * 2.0 - 1.0) * (FIELD_HALF - 1.0);
        let y = (self.next_unit() * 2.0 - 1.0) * (FIELD_HALF - 1.0);
        Vec2::new(x, y)
    }
}

/// The player's ship.
struct Ship {
    position: Vec2,
    velocity: Vec2,
    heading: f32,
}

impl Ship {
    const ACCELERATION: f32 = 8.0;
    const TURN_RATE: f32 = 2.5;
    const DRAG: f32 = 0.8;

    fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            heading: 0.0,
        }
    }

    /// Integrate one step from the mapper's held values.
    fn update(&mut self, dt: f32, mapper: &KeyMapper) {
        // Steering and thrust are analog: an axis pushed halfway turns at
        // half rate, a key gives the full 1.0
        let turn = mapper.value("turn_right") - mapper.value("turn_left");
        self.heading += turn * Self::TURN_RATE * dt;

        let forward = Vec2::new(self.heading.cos(), self.heading.sin());
        self.velocity += forward * mapper.value("thrust") * Self::ACCELERATION * dt;
        self.velocity *= Self::DRAG.powf(dt);
        self.position += self.velocity * dt;

        self.position = self.position.clamp(Vec2::splat(-FIELD_HALF), Vec2::splat(FIELD_HALF));
    }
}

/// Application driving the game loop.
struct GemHunt {
    mapper: KeyMapper,
    window: Option<Arc<Window>>,
    ship: Ship,
    spawner: GemSpawner,
    gem: Vec2,
    score: u32,
    collecting: bool,
    last_frame: Instant,
    status_timer: f32,
    conflict_prompted: bool,
}

impl GemHunt {
    fn new(mapper: KeyMapper) -> Self {
        let mut spawner = GemSpawner::new();
        let gem = spawner.next_position();
        Self {
            mapper,
            window: None,
            ship: Ship::new(),
            spawner,
            gem,
            score: 0,
            collecting: false,
            last_frame: Instant::now(),
            status_timer: 0.0,
            conflict_prompted: false,
        }
    }

    fn print_controls(&self) {
        log::info!("--- controls (press digit to rebind) ---");
        for (index, binding) in self.mapper.bindings().enumerate() {
            log::info!(
                "{}) {:<12} {}",
                index + 1,
                binding.action(),
                binding.display_label()
            );
        }
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;

        self.mapper.update();

        let mut bindings_dirty = false;
        let events: Vec<ActionEvent> = self.mapper.drain_events().collect();
        for event in events {
            match &event {
                ActionEvent::Pressed { action } if action == "collect" => {
                    self.collecting = true;
                }
                ActionEvent::Released { action } if action == "collect" => {
                    self.collecting = false;
                }
                ActionEvent::Released { action } if action == "menu" => {
                    log::info!("returning to menu with {} gems; field reset", self.score);
                    self.ship = Ship::new();
                    self.score = 0;
                    self.gem = self.spawner.next_position();
                }
                ActionEvent::BindingChanged { action } => {
                    let label = self
                        .mapper
                        .binding_label(action)
                        .unwrap_or_else(|_| String::from("?"));
                    log::info!("{} is now bound to {}", action, label);
                    bindings_dirty = true;
                }
                _ => {}
            }
        }
        if bindings_dirty {
            save_bindings(&self.mapper);
        }

        if let RebindState::Conflict {
            action,
            input,
            existing,
        } = self.mapper.rebind_state()
        {
            if !self.conflict_prompted {
                log::warn!(
                    "{} is already bound to {:?}; Y rebinds it to {:?}, N picks another input",
                    input.display_name(),
                    existing,
                    action
                );
                self.conflict_prompted = true;
            }
        } else {
            self.conflict_prompted = false;
        }

        if self.mapper.rebind_active() {
            return;
        }

        self.ship.update(dt, &self.mapper);

        if self.collecting && self.ship.position.distance(self.gem) < COLLECT_RADIUS {
            self.score += 1;
            log::info!("gem collected! score: {}", self.score);
            self.gem = self.spawner.next_position();
        }

        // Periodic status line in place of rendering
        self.status_timer += dt;
        if self.status_timer >= 2.0 {
            self.status_timer = 0.0;
            log::info!(
                "ship ({:.1}, {:.1}) heading {:.2} | gem ({:.1}, {:.1}) | score {}",
                self.ship.position.x,
                self.ship.position.y,
                self.ship.heading,
                self.gem.x,
                self.gem.y,
                self.score
            );
        }
    }

    /// UI keys handled before the mapper sees the event.
    fn handle_ui_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) -> bool {
        match self.mapper.rebind_state() {
            RebindState::Conflict { .. } => {
                match code {
                    KeyCode::KeyY => {
                        let _ = self.mapper.resolve_conflict(true);
                    }
                    KeyCode::KeyN => {
                        let _ = self.mapper.resolve_conflict(false);
                        log::info!("press another input...");
                    }
                    _ => {}
                }
                true
            }

            RebindState::Listening { .. } => {
                if code == KeyCode::F12 {
                    let _ = self.mapper.cancel_rebind();
                    log::info!("rebind cancelled");
                    return true;
                }
                false
            }

            RebindState::Idle => {
                let index = match code {
                    KeyCode::Digit1 => 0,
                    KeyCode::Digit2 => 1,
                    KeyCode::Digit3 => 2,
                    KeyCode::Digit4 => 3,
                    KeyCode::Digit5 => 4,
                    KeyCode::F1 => {
                        self.print_controls();
                        return true;
                    }
                    KeyCode::F12 => {
                        event_loop.exit();
                        return true;
                    }
                    _ => return false,
                };

                let action = self
                    .mapper
                    .bindings()
                    .nth(index)
                    .map(|binding| binding.action().to_string());
                if let Some(action) = action {
                    match self.mapper.begin_rebind(&action) {
                        Ok(()) => log::info!("press an input to bind to {:?}...", action),
                        Err(e) => log::warn!("cannot rebind: {}", e),
                    }
                }
                true
            }
        }
    }
}

impl ApplicationHandler for GemHunt {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Gem Hunt")
            .with_inner_size(winit::dpi::PhysicalSize::new(640, 360));

        match event_loop.create_window(window_attrs) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                log::error!("failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        }

        self.print_controls();
        log::info!("F1: controls | digits: rebind | F12: quit");
        log::info!("hold {} near a gem to scoop it up", {
            self.mapper
                .binding_label("collect")
                .unwrap_or_else(|_| String::from("?"))
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::CloseRequested => {
                save_bindings(&self.mapper);
                event_loop.exit();
                return;
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(code) = key_event.physical_key
                    && key_event.state.is_pressed()
                    && !key_event.repeat
                    && self.handle_ui_key(code, event_loop)
                {
                    return;
                }
            }

            WindowEvent::RedrawRequested => {
                self.frame();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                return;
            }

            _ => {}
        }

        self.mapper.process_window_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("starting gem hunt");

    let mut mapper = build_mapper()?;
    load_bindings(&mut mapper);

    let mut app = GemHunt::new(mapper);
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run_app(&mut app)?;

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("gem hunt error: {}", e);
    }
}
