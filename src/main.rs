//! Demonstration program for the key mapper
//!
//! Opens a window, registers a handful of controls covering every binding
//! kind, and logs the resulting action events. Press a digit key to rebind
//! the control with that list number, Tab to print the current bindings,
//! F5 to print the mapping snapshot as RON.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use keymapper::prelude::*;

/// Items cycled through by the "use_item" control, for the fun of it
const ITEMS: &[&str] = &[
    "drone",
    "cute kitty",
    "string of unknown length",
    "rubber chicken with a pulley in the middle",
    "vampire lord",
    "strange thing",
    "elder sign",
];

/// Register the demo's controls.
///
/// The list is long on purpose: it covers all four binding kinds and both
/// keyboard and mouse defaults.
fn build_mapper() -> Result<KeyMapper, MapperError> {
    let mut mapper = KeyMapper::new();

    // Movement: pollable held keys
    mapper.add_action(
        "up",
        BindingKind::Held,
        PhysicalInput::key(KeyCode::KeyW),
        DeviceClass::Keyboard,
    )?;
    mapper.add_action(
        "down",
        BindingKind::Held,
        PhysicalInput::key(KeyCode::KeyS),
        DeviceClass::Keyboard,
    )?;
    mapper.add_action(
        "left",
        BindingKind::Held,
        PhysicalInput::key(KeyCode::KeyA),
        DeviceClass::Keyboard,
    )?;
    mapper.add_action(
        "right",
        BindingKind::Held,
        PhysicalInput::key(KeyCode::KeyD),
        DeviceClass::Keyboard,
    )?;
    mapper.add_action(
        "jump",
        BindingKind::Held,
        PhysicalInput::key(KeyCode::Space),
        DeviceClass::Keyboard,
    )?;
    mapper.add_action(
        "crouch",
        BindingKind::Held,
        PhysicalInput::key(KeyCode::KeyC),
        DeviceClass::Keyboard,
    )?;
    mapper.add_action(
        "lean",
        BindingKind::Held,
        PhysicalInput::MouseButton(MouseButton::Right),
        DeviceClass::Mouse,
    )?;

    // Edge-triggered controls
    mapper.add_action(
        "action",
        BindingKind::Released,
        PhysicalInput::MouseButton(MouseButton::Left),
        DeviceClass::Mouse,
    )?;
    mapper.add_action(
        "inventory_prev",
        BindingKind::Pressed,
        PhysicalInput::key(KeyCode::KeyQ),
        DeviceClass::Keyboard,
    )?;
    mapper.add_action(
        "inventory_next",
        BindingKind::Pressed,
        PhysicalInput::key(KeyCode::KeyE),
        DeviceClass::Keyboard,
    )?;
    mapper.add_action(
        "grenade",
        BindingKind::PressedAndReleased,
        PhysicalInput::key(KeyCode::KeyR),
        DeviceClass::Keyboard,
    )?;
    mapper.add_action(
        "use_item",
        BindingKind::Released,
        PhysicalInput::key(KeyCode::Enter),
        DeviceClass::Keyboard,
    )?;

    Ok(mapper)
}

/// The demo application
struct TesterApp {
    mapper: KeyMapper,
    window: Option<Arc<Window>>,
    next_item: usize,
    conflict_prompted: bool,
}

impl TesterApp {
    fn new(mapper: KeyMapper) -> Self {
        Self {
            mapper,
            window: None,
            next_item: 0,
            conflict_prompted: false,
        }
    }

    /// Log the binding list with the digit used to rebind each control.
    fn print_bindings(&self) {
        log::info!("--- bindings (press digit to rebind) ---");
        for (index, binding) in self.mapper.bindings().enumerate() {
            let digit = match index {
                0..=8 => ((index + 1) as u8 + b'0') as char,
                9 => '0',
                _ => '-',
            };
            log::info!(
                "{}) {:<16} {}",
                digit,
                binding.action(),
                binding.display_label()
            );
        }
    }

    /// Map a pressed digit key to the control with that list number.
    fn select_for_rebind(&mut self, code: KeyCode) -> bool {
        let index = match code {
            KeyCode::Digit1 => 0,
            KeyCode::Digit2 => 1,
            KeyCode::Digit3 => 2,
            KeyCode::Digit4 => 3,
            KeyCode::Digit5 => 4,
            KeyCode::Digit6 => 5,
            KeyCode::Digit7 => 6,
            KeyCode::Digit8 => 7,
            KeyCode::Digit9 => 8,
            KeyCode::Digit0 => 9,
            _ => return false,
        };

        let Some(action) = self
            .mapper
            .bindings()
            .nth(index)
            .map(|binding| binding.action().to_string())
        else {
            return false;
        };

        match self.mapper.begin_rebind(&action) {
            Ok(()) => log::info!("press an input to bind to {:?}...", action),
            Err(e) => log::warn!("cannot rebind: {}", e),
        }
        true
    }

    /// Run one frame: publish events and react to them.
    fn frame(&mut self) {
        self.mapper.update();

        let events: Vec<ActionEvent> = self.mapper.drain_events().collect();
        for event in events {
            self.handle_action(&event);
        }

        // Prompt once when a rebind attempt runs into a conflict
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
    }

    fn handle_action(&mut self, event: &ActionEvent) {
        match event {
            ActionEvent::Pressed { action } => match action.as_str() {
                "grenade" => log::info!("Grenade ready!"),
                "inventory_prev" => log::info!("Previous inventory item~"),
                "inventory_next" => log::info!("Next inventory item~"),
                other => log::info!("{} pressed", other),
            },

            ActionEvent::Released { action } => match action.as_str() {
                "grenade" => log::info!("Grenade out! Fire in the hole!"),
                "action" => log::info!("Action!"),
                "use_item" => {
                    let item = ITEMS[self.next_item % ITEMS.len()];
                    self.next_item += 1;
                    log::info!("You used the {}!", item);
                }
                other => log::info!("{} released", other),
            },

            ActionEvent::HeldChanged { action, value } => {
                log::info!("{} ~ {:.2}", action, value);
            }

            ActionEvent::BindingChanged { action } => {
                let label = self
                    .mapper
                    .binding_label(action)
                    .unwrap_or_else(|_| String::from("?"));
                log::info!("{} is now bound to {}", action, label);
            }

            _ => {}
        }
    }

    /// Handle a key press before it reaches the mapper.
    ///
    /// Returns true when the press was consumed by the demo UI (rebind
    /// selection, conflict resolution, and so on).
    fn handle_ui_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) -> bool {
        match self.mapper.rebind_state() {
            RebindState::Conflict { .. } => {
                match code {
                    KeyCode::KeyY => {
                        if let Err(e) = self.mapper.resolve_conflict(true) {
                            log::error!("conflict resolution failed: {}", e);
                        }
                    }
                    KeyCode::KeyN => {
                        if let Err(e) = self.mapper.resolve_conflict(false) {
                            log::error!("conflict resolution failed: {}", e);
                        }
                        log::info!("press another input...");
                    }
                    _ => {}
                }
                true
            }

            RebindState::Listening { .. } => {
                if code == KeyCode::Escape {
                    let _ = self.mapper.cancel_rebind();
                    log::info!("rebind cancelled");
                    return true;
                }
                false
            }

            RebindState::Idle => match code {
                KeyCode::Escape => {
                    event_loop.exit();
                    true
                }
                KeyCode::Tab => {
                    self.print_bindings();
                    true
                }
                KeyCode::F5 => {
                    match ron::to_string(&self.mapper.snapshot()) {
                        Ok(text) => log::info!("snapshot: {}", text),
                        Err(e) => log::error!("snapshot serialization failed: {}", e),
                    }
                    true
                }
                code => self.select_for_rebind(code),
            },
        }
    }
}

impl ApplicationHandler for TesterApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("KeyMapper Tester")
            .with_inner_size(winit::dpi::PhysicalSize::new(640, 360));

        match event_loop.create_window(window_attrs) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                log::error!("failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        }

        self.print_bindings();
        log::info!("Tab: list bindings | digits: rebind | F5: snapshot | Esc: quit");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::CloseRequested => {
                log::info!("close requested, shutting down");
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
    log::info!("starting key mapper tester");

    let mapper = build_mapper()?;
    let mut app = TesterApp::new(mapper);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run_app(&mut app)?;

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("tester error: {}", e);
    }
}
