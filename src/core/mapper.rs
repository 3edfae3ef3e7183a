//! Core mapper struct and per-frame cycle
//!
//! [`KeyMapper`] is the piece applications talk to: they register actions,
//! feed it the host engine's raw input events, call [`KeyMapper::update`]
//! once per frame, and then read action events and held values. It also owns
//! the interactive rebind flow and the snapshot interface.

use rustc_hash::FxHashMap;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use crate::binding::{
    AxisDirection, Binding, BindingKind, BindingTable, BoundInput, DeviceClass, GamepadAxis,
    GamepadButton, GroupMask, PhysicalInput, effective_mods,
};
use crate::core::error::MapperError;
use crate::core::events::{ActionEvent, ActionQueue};
use crate::input::{
    ActionState, AxisSample, AxisTracker, Candidate, CaptureSession, DEFAULT_DEAD_ZONE, DeviceId,
    DeviceInfo, DeviceRegistry, HELD_THRESHOLD, RebindState,
};
use crate::profile::{AxisRecord, BindingRecord, MappingSnapshot, ProfileSet};

// ============================================================================
// Options
// ============================================================================

/// Mapper configuration
#[derive(Debug, Clone)]
pub struct MapperOptions {
    /// Whether key bindings may carry modifier chords (Ctrl+X). When false,
    /// modifier state is ignored entirely.
    pub accept_key_combinations: bool,
    /// Whether the negative half of an axis produces negative held values
    /// instead of absolute ones.
    pub signed_axis_values: bool,
    /// Dead zone applied to axes as they come into use.
    pub default_dead_zone: f32,
    /// Initial capacity of the action event queue.
    pub event_capacity: usize,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            accept_key_combinations: false,
            signed_axis_values: false,
            default_dead_zone: DEFAULT_DEAD_ZONE,
            event_capacity: 64,
        }
    }
}

impl MapperOptions {
    /// Allow or forbid modifier chords in key bindings.
    pub fn with_key_combinations(mut self, accept: bool) -> Self {
        self.accept_key_combinations = accept;
        self
    }

    /// Make negative axis halves produce negative held values.
    pub fn with_signed_axis_values(mut self, signed: bool) -> Self {
        self.signed_axis_values = signed;
        self
    }

    /// Set the dead zone new axes start with.
    pub fn with_default_dead_zone(mut self, dead_zone: f32) -> Self {
        self.default_dead_zone = dead_zone;
        self
    }
}

// ============================================================================
// Mapper
// ============================================================================

/// Maps physical input events to logical action names.
pub struct KeyMapper {
    options: MapperOptions,
    table: BindingTable,
    state: ActionState,
    queue: ActionQueue,
    axes: AxisTracker,
    devices: DeviceRegistry,
    capture: Option<CaptureSession>,
    /// Current modifier state as reported by the host
    modifiers: ModifiersState,
    /// Keys currently down, with the chord active when each went down.
    /// Routes releases to the binding that fired on press, even if the
    /// modifier went up first.
    pressed_keys: FxHashMap<KeyCode, ModifiersState>,
}

impl KeyMapper {
    /// Create a mapper with default options.
    pub fn new() -> Self {
        Self::with_options(MapperOptions::default())
    }

    /// Create a mapper with the given options.
    pub fn with_options(options: MapperOptions) -> Self {
        Self {
            queue: ActionQueue::with_capacity(options.event_capacity),
            options,
            table: BindingTable::new(),
            state: ActionState::new(),
            axes: AxisTracker::new(),
            devices: DeviceRegistry::new(),
            capture: None,
            modifiers: ModifiersState::empty(),
            pressed_keys: FxHashMap::default(),
        }
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register an action in the default conflict group.
    ///
    /// `default_input` becomes the initial binding; `device` is the device
    /// class that binding expects.
    pub fn add_action(
        &mut self,
        action: &str,
        kind: BindingKind,
        default_input: PhysicalInput,
        device: DeviceClass,
    ) -> Result<(), MapperError> {
        self.add_action_grouped(action, kind, default_input, device, GroupMask::DEFAULT)
    }

    /// Register an action in a specific conflict group.
    pub fn add_action_grouped(
        &mut self,
        action: &str,
        kind: BindingKind,
        default_input: PhysicalInput,
        device: DeviceClass,
        group: GroupMask,
    ) -> Result<(), MapperError> {
        let bound = BoundInput {
            input: default_input,
            device,
        };
        self.table.register(action, kind, bound, group)?;
        self.state.register(action);

        if let PhysicalInput::Axis { axis, direction } = default_input {
            let concrete = self.devices.first_of_class(device);
            self.axes.bind_direction(
                axis,
                direction,
                action,
                device,
                concrete,
                self.options.default_dead_zone,
            );
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Raw input intake
    // ------------------------------------------------------------------------

    /// Update the modifier state.
    pub fn process_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    /// Feed a keyboard key edge.
    pub fn process_keyboard(&mut self, code: KeyCode, pressed: bool) {
        // Key repeat shows up as extra press edges
        if pressed && self.pressed_keys.contains_key(&code) {
            return;
        }

        let chord = if self.options.accept_key_combinations {
            effective_mods(code, self.modifiers)
        } else {
            ModifiersState::empty()
        };

        let input = if pressed {
            self.pressed_keys.insert(code, chord);
            PhysicalInput::Key { code, mods: chord }
        } else {
            let mods = self.pressed_keys.remove(&code).unwrap_or(chord);
            PhysicalInput::Key { code, mods }
        };

        if self.capture.is_some() {
            self.capture_button(input, DeviceClass::Keyboard, pressed);
            return;
        }
        self.dispatch_button(&input, pressed);
    }

    /// Feed a mouse button edge.
    pub fn process_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        let input = PhysicalInput::MouseButton(button);
        if self.capture.is_some() {
            self.capture_button(input, DeviceClass::Mouse, pressed);
            return;
        }
        self.dispatch_button(&input, pressed);
    }

    /// Feed a gamepad (or similar device) button edge.
    pub fn process_gamepad_button(&mut self, device: DeviceId, button: GamepadButton, pressed: bool) {
        let class = self
            .devices
            .class_of(device)
            .unwrap_or(DeviceClass::Gamepad);
        let input = PhysicalInput::GamepadButton(button);
        if self.capture.is_some() {
            self.capture_button(input, class, pressed);
            return;
        }
        self.dispatch_button(&input, pressed);
    }

    /// Feed an axis sample. Values are expected in roughly `-1.0..=1.0`.
    ///
    /// Samples are buffered; bound actions react during [`KeyMapper::update`].
    pub fn process_axis(&mut self, device: DeviceId, axis: GamepadAxis, value: f32) {
        self.axes.record_sample(device, axis, value);

        if self.capture.is_some() {
            let class = self
                .devices
                .class_of(device)
                .unwrap_or(DeviceClass::Gamepad);
            let finished = self
                .capture
                .as_mut()
                .and_then(|capture| capture.note_axis(device, axis, value, class));
            if let Some(candidate) = finished {
                self.finish_capture(candidate);
            }
        }
    }

    /// A device was connected.
    pub fn device_connected(&mut self, info: DeviceInfo) {
        log::info!("device {} connected ({})", info.id.0, info.class.label());
        self.devices.connect(info);
        self.axes.device_connected(info.id, info.class);
    }

    /// A device was disconnected.
    pub fn device_disconnected(&mut self, id: DeviceId) {
        if let Some(info) = self.devices.disconnect(id) {
            log::info!("device {} disconnected ({})", id.0, info.class.label());
        }
        self.axes.device_disconnected(id);
        if let Some(capture) = self.capture.as_mut() {
            capture.device_disconnected(id);
        }
    }

    /// Convenience translator for hosts built directly on winit.
    ///
    /// Keyboard, mouse button and modifier events are routed to the
    /// corresponding `process_*` methods; focus loss cancels all held state.
    pub fn process_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.process_keyboard(code, event.state == ElementState::Pressed);
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.process_modifiers(modifiers.state());
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.process_mouse_button(*button, *state == ElementState::Pressed);
            }

            WindowEvent::Focused(false) => self.cancel_all(),

            _ => {}
        }
    }

    // ------------------------------------------------------------------------
    // Per-frame cycle
    // ------------------------------------------------------------------------

    /// Run the axis pass and publish this frame's events.
    ///
    /// Call once per frame. Events raised during frame N (including by this
    /// call's axis pass) become visible from [`KeyMapper::events`] during
    /// frame N+1.
    pub fn update(&mut self) {
        if self.capture.is_none() {
            let pass = self.axes.collect_pass();
            for sample in pass {
                self.handle_axis(sample);
            }
        }
        self.queue.swap();
    }

    /// Iterate over the events published by the last [`KeyMapper::update`].
    pub fn events(&self) -> impl Iterator<Item = &ActionEvent> {
        self.queue.iter()
    }

    /// Drain the published events, taking ownership.
    pub fn drain_events(&mut self) -> impl Iterator<Item = ActionEvent> + '_ {
        self.queue.drain()
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Whether a held action is currently active (value above 0.5).
    #[must_use]
    pub fn is_held(&self, action: &str) -> bool {
        self.state.is_held(action)
    }

    /// The current value of a held action (`0.0` for unknown actions).
    #[must_use]
    pub fn value(&self, action: &str) -> f32 {
        self.state.value(action)
    }

    /// All `(action, value)` pairs, for state displays.
    pub fn held_values(&self) -> impl Iterator<Item = (&str, f32)> {
        self.state.iter()
    }

    /// Zero every held value, e.g. on focus loss or entering a menu.
    pub fn cancel_all(&mut self) {
        self.state.cancel_all();
        self.pressed_keys.clear();
    }

    /// An action's table entry.
    pub fn binding(&self, action: &str) -> Option<&Binding> {
        self.table.get(action)
    }

    /// Entries in registration order, for a controls menu.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.table.iter_ordered()
    }

    /// Display text for an action's current binding.
    pub fn binding_label(&self, action: &str) -> Result<String, MapperError> {
        Ok(self.table.lookup(action)?.display_label())
    }

    /// Set the dead zone of one axis in use. Returns whether it was in use.
    pub fn set_dead_zone(&mut self, axis: GamepadAxis, dead_zone: f32) -> bool {
        self.axes.set_dead_zone(axis, dead_zone)
    }

    /// Set the dead zone of every axis in use, and the default for axes that
    /// come into use later.
    pub fn set_dead_zone_all(&mut self, dead_zone: f32) {
        self.axes.set_dead_zone_all(dead_zone);
        self.options.default_dead_zone = dead_zone;
    }

    // ------------------------------------------------------------------------
    // Interactive rebinding
    // ------------------------------------------------------------------------

    /// Start listening for a new binding for `action`.
    ///
    /// While a session is active, raw input is captured instead of
    /// dispatched. Fails if a session is already running or the action is
    /// unknown.
    pub fn begin_rebind(&mut self, action: &str) -> Result<(), MapperError> {
        if let Some(active) = &self.capture {
            return Err(MapperError::CaptureInProgress(active.action().to_string()));
        }
        self.table.lookup(action)?;
        log::debug!("rebind capture started for {:?}", action);
        self.capture = Some(CaptureSession::new(action, self.axes.samples()));
        Ok(())
    }

    /// Abandon the active rebind session.
    pub fn cancel_rebind(&mut self) -> Result<(), MapperError> {
        match self.capture.take() {
            Some(capture) => {
                log::debug!("rebind capture cancelled for {:?}", capture.action());
                Ok(())
            }
            None => Err(MapperError::NoCapture),
        }
    }

    /// The rebind flow's current state, for driving a binding dialog.
    pub fn rebind_state(&self) -> RebindState {
        self.capture
            .as_ref()
            .map(|capture| capture.state())
            .unwrap_or(RebindState::Idle)
    }

    /// Whether a rebind session (listening or conflicted) is active.
    #[must_use]
    pub fn rebind_active(&self) -> bool {
        self.capture.is_some()
    }

    /// Resolve a parked binding conflict.
    ///
    /// With `overwrite` the captured input is applied and the conflicting
    /// action loses it; otherwise the session returns to listening.
    pub fn resolve_conflict(&mut self, overwrite: bool) -> Result<(), MapperError> {
        let capture = self.capture.as_mut().ok_or(MapperError::NoCapture)?;
        let Some((candidate, _)) = capture.pending_conflict() else {
            return Err(MapperError::NoConflict);
        };

        if overwrite {
            let action = capture.action().to_string();
            self.capture = None;
            self.apply_candidate(&action, candidate);
        } else {
            capture.clear_conflict();
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Programmatic binding changes
    // ------------------------------------------------------------------------

    /// Add an input to an action's binding set.
    ///
    /// Intersecting-group actions holding the input lose it, exactly as if
    /// the player had rebound interactively and confirmed the overwrite.
    pub fn attach_input(
        &mut self,
        action: &str,
        input: PhysicalInput,
        device: DeviceClass,
    ) -> Result<(), MapperError> {
        let bound = BoundInput { input, device };
        self.table.attach_input(action, bound)?;

        if let PhysicalInput::Axis { axis, direction } = input {
            self.axes.clear_direction(axis, direction);
            let concrete = self.devices.first_of_class(device);
            self.axes.bind_direction(
                axis,
                direction,
                action,
                device,
                concrete,
                self.options.default_dead_zone,
            );
        }
        Ok(())
    }

    /// Remove one input from an action. Returns whether it was present.
    pub fn detach_input(
        &mut self,
        action: &str,
        input: &PhysicalInput,
    ) -> Result<bool, MapperError> {
        let removed = self.table.detach_input(action, input)?;
        if removed && let PhysicalInput::Axis { axis, direction } = *input {
            let held_by_action = self
                .axes
                .bindings()
                .iter()
                .find(|entry| entry.axis() == axis)
                .and_then(|entry| entry.slot(direction))
                .is_some_and(|slot| slot.action == action);
            if held_by_action {
                self.axes.clear_direction(axis, direction);
            }
        }
        Ok(removed)
    }

    /// Remove all inputs from an action.
    pub fn clear_binding(&mut self, action: &str) -> Result<(), MapperError> {
        let old = self.table.clear_inputs(action)?;
        for bound in &old {
            if let PhysicalInput::Axis { axis, direction } = bound.input {
                self.axes.clear_direction(axis, direction);
            }
        }
        Ok(())
    }

    /// Reset every action to its default binding.
    pub fn reset_to_defaults(&mut self) {
        self.table.reset_to_defaults();
        self.rebuild_axes();
    }

    // ------------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------------

    /// Extract the whole mapping as a serializable snapshot.
    pub fn snapshot(&self) -> MappingSnapshot {
        MappingSnapshot {
            bindings: self
                .table
                .iter_ordered()
                .map(|binding| BindingRecord {
                    action: binding.action().to_string(),
                    inputs: binding.inputs().to_vec(),
                })
                .collect(),
            axes: self
                .axes
                .bindings()
                .iter()
                .map(|entry| AxisRecord {
                    axis: entry.axis(),
                    dead_zone: entry.dead_zone(),
                })
                .collect(),
        }
    }

    /// Replay a snapshot over the registered actions.
    ///
    /// Every action named in the snapshot must be registered; actions not
    /// named keep their current bindings. A binding-changed event is raised
    /// per applied action.
    pub fn apply_snapshot(&mut self, snapshot: &MappingSnapshot) -> Result<(), MapperError> {
        for record in &snapshot.bindings {
            self.table.lookup(&record.action)?;
        }

        for record in &snapshot.bindings {
            // Validated above; replace cannot fail
            let _ = self
                .table
                .replace_inputs(&record.action, record.inputs.iter().copied());
        }

        self.rebuild_axes();
        for record in &snapshot.axes {
            self.axes.set_dead_zone(record.axis, record.dead_zone);
        }

        for record in &snapshot.bindings {
            self.queue.push(ActionEvent::BindingChanged {
                action: record.action.clone(),
            });
        }
        Ok(())
    }

    /// Apply a named profile from a profile set.
    pub fn apply_profile(&mut self, profiles: &ProfileSet, name: &str) -> Result<(), MapperError> {
        let snapshot = profiles.lookup(name)?.clone();
        log::info!("applying binding profile {:?}", name);
        self.apply_snapshot(&snapshot)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Route a button edge into the active capture session.
    fn capture_button(&mut self, input: PhysicalInput, device: DeviceClass, pressed: bool) {
        let finished = match self.capture.as_mut() {
            Some(capture) => {
                if pressed {
                    capture.note_button(input, device);
                    None
                } else {
                    capture.take_candidate()
                }
            }
            None => None,
        };
        if let Some(candidate) = finished {
            self.finish_capture(candidate);
        }
    }

    /// A capture produced a candidate: apply it, or park on a conflict.
    fn finish_capture(&mut self, candidate: Candidate) {
        let Some(action) = self.capture.as_ref().map(|c| c.action().to_string()) else {
            return;
        };

        let conflict = self
            .table
            .conflict_for(&candidate.input, &action)
            .map(str::to_string);
        match conflict {
            Some(existing) => {
                log::debug!(
                    "{} is already bound to {:?}",
                    candidate.input.display_name(),
                    existing
                );
                if let Some(capture) = self.capture.as_mut() {
                    capture.set_conflict(candidate, &existing);
                }
            }
            None => {
                self.capture = None;
                self.apply_candidate(&action, candidate);
            }
        }
    }

    /// Make `candidate` the action's sole binding, displacing intersecting
    /// holders and updating axis slots.
    fn apply_candidate(&mut self, action: &str, candidate: Candidate) {
        // Release axis slots held by this action's old inputs
        let old = self
            .table
            .replace_inputs(action, std::iter::empty())
            .unwrap_or_default();
        for bound in &old {
            if let PhysicalInput::Axis { axis, direction } = bound.input {
                self.axes.clear_direction(axis, direction);
            }
        }

        // Displace intersecting-group holders of the new input
        let group = self
            .table
            .get(action)
            .map(|binding| binding.group())
            .unwrap_or_default();
        let displaced = self.table.unbind_physical(&candidate.input, group);
        if let PhysicalInput::Axis { axis, direction } = candidate.input
            && !displaced.is_empty()
        {
            self.axes.clear_direction(axis, direction);
        }

        let bound = BoundInput {
            input: candidate.input,
            device: candidate.device,
        };
        let _ = self.table.replace_inputs(action, [bound]);

        if let PhysicalInput::Axis { axis, direction } = candidate.input {
            let concrete = self.devices.first_of_class(candidate.device);
            self.axes.bind_direction(
                axis,
                direction,
                action,
                candidate.device,
                concrete,
                self.options.default_dead_zone,
            );
        }

        log::info!(
            "bound {:?} to {}",
            action,
            candidate.input.display_name()
        );
        self.queue.push(ActionEvent::BindingChanged {
            action: action.to_string(),
        });
        for name in displaced {
            self.queue.push(ActionEvent::BindingChanged { action: name });
        }
    }

    /// Raise events / set state for one button edge.
    fn dispatch_button(&mut self, input: &PhysicalInput, pressed: bool) {
        let targets: Vec<(String, BindingKind)> = self
            .table
            .actions_for(input)
            .iter()
            .filter_map(|name| self.table.get(name).map(|b| (name.clone(), b.kind())))
            .collect();

        for (action, kind) in targets {
            match kind {
                BindingKind::Held => {
                    let value = if pressed { 1.0 } else { 0.0 };
                    let previous = self.state.set(&action, value);
                    if (previous != 0.0) != (value != 0.0) {
                        self.queue.push(ActionEvent::HeldChanged { action, value });
                    }
                }
                kind => {
                    if pressed && kind.raises_on_press() {
                        self.queue.push(ActionEvent::Pressed { action });
                    } else if !pressed && kind.raises_on_release() {
                        self.queue.push(ActionEvent::Released { action });
                    }
                }
            }
        }
    }

    /// Apply one half-axis sample to its bound action.
    fn handle_axis(&mut self, sample: AxisSample) {
        let Some(kind) = self.table.get(&sample.action).map(|b| b.kind()) else {
            return;
        };
        let previous = self.state.value(&sample.action);
        let magnitude = sample.value.abs();

        if kind.is_held() {
            let new = if magnitude < sample.dead_zone {
                0.0
            } else if self.options.signed_axis_values {
                sample.value
            } else {
                magnitude
            };
            self.state.set(&sample.action, new);
            if (previous != 0.0) != (new != 0.0) {
                self.queue.push(ActionEvent::HeldChanged {
                    action: sample.action,
                    value: new,
                });
            }
            return;
        }

        // Edge kinds treat the axis as a button with a 0.5 threshold; the
        // held slot doubles as the edge-detection memory.
        if previous.abs() <= HELD_THRESHOLD && magnitude > HELD_THRESHOLD {
            let value = if self.options.signed_axis_values && sample.value < 0.0 {
                -1.0
            } else {
                1.0
            };
            self.state.set(&sample.action, value);
            if kind.raises_on_press() {
                self.queue.push(ActionEvent::Pressed {
                    action: sample.action,
                });
            }
        } else if previous.abs() > HELD_THRESHOLD && magnitude < HELD_THRESHOLD {
            self.state.set(&sample.action, 0.0);
            if kind.raises_on_release() {
                self.queue.push(ActionEvent::Released {
                    action: sample.action,
                });
            }
        }
    }

    /// Rebuild axis slots from the binding table, keeping nothing stale.
    fn rebuild_axes(&mut self) {
        self.axes.clear_bindings();

        let axis_bindings: Vec<(String, GamepadAxis, AxisDirection, DeviceClass)> =
            self.table
                .iter_ordered()
                .flat_map(|binding| {
                    let action = binding.action().to_string();
                    binding
                        .inputs()
                        .iter()
                        .filter_map(move |bound| match bound.input {
                            PhysicalInput::Axis { axis, direction } => {
                                Some((action.clone(), axis, direction, bound.device))
                            }
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                })
                .collect();

        for (action, axis, direction, class) in axis_bindings {
            let concrete = self.devices.first_of_class(class);
            self.axes.bind_direction(
                axis,
                direction,
                &action,
                class,
                concrete,
                self.options.default_dead_zone,
            );
        }
    }
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
