//! Widget composition root
//!
//! Owns the store, the renderer, and the ports. Every gesture and host
//! interaction arrives through one input channel and is handled to completion
//! before the next one is read.

use mappin_core::bootstrap::{self, LocaleHint};
use mappin_core::config::WidgetConfig;
use mappin_core::error::{MappinError, Result};
use mappin_core::input::{self, InputReceiver, InputSender, MapGesture, WidgetInput};
use mappin_core::models::{Coordinate, FormLocation, MapHandle, Viewport};
use mappin_core::ports::{GeocodingPort, HostForm, MapPort};
use mappin_core::registry::SlotRegistry;
use mappin_core::store::{Outcome, Store, StoreEvent, StoreState};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::render::Renderer;

type MapReadyCallback = Box<dyn FnOnce(MapHandle)>;

pub struct Widget {
    config: WidgetConfig,
    locale: LocaleHint,
    store: Store,
    renderer: Renderer,
    registry: SlotRegistry,
    map: Box<dyn MapPort>,
    map_handle: MapHandle,
    geocoder: Arc<dyn GeocodingPort>,
    form: Box<dyn HostForm>,
    sender: InputSender,
    inputs: Option<InputReceiver>,
    on_map_ready: Option<MapReadyCallback>,
    /// Forward-geocoded labels waiting for their slot to be rendered
    resolved_labels: HashMap<usize, (Coordinate, String)>,
    alive: bool,
}

impl Widget {
    /// Mount the widget on a host form
    ///
    /// Scans the form for slots, creates the map, and routes its gestures into
    /// the widget's input channel. Nothing is rendered until [`Widget::run`].
    pub fn mount(
        config: WidgetConfig,
        locale: LocaleHint,
        mut map: Box<dyn MapPort>,
        geocoder: Arc<dyn GeocodingPort>,
        form: Box<dyn HostForm>,
    ) -> Result<Self> {
        let registry = SlotRegistry::scan(form.as_ref(), &config.default_pins);

        let map_handle = map.create_map(&config.map)?;
        let (sender, inputs) = input::channel();
        map.subscribe(map_handle, sender.clone())?;

        let mut store = Store::new(config.default_pins.clone());
        store.dispatch(StoreEvent::InitializeGeocoder(geocoder.id()));
        store.dispatch(StoreEvent::SeedSlots(registry.seeds()));

        tracing::info!(
            "Mounted widget in '{}' with {} slots (geocoder: {})",
            config.map.container,
            registry.len(),
            geocoder.id()
        );

        Ok(Self {
            config,
            locale,
            store,
            renderer: Renderer::new(),
            registry,
            map,
            map_handle,
            geocoder,
            form,
            sender,
            inputs: Some(inputs),
            on_map_ready: None,
            resolved_labels: HashMap::new(),
            alive: true,
        })
    }

    /// Invoke `callback` once, after the map's first ready signal
    pub fn on_map_ready(mut self, callback: impl FnOnce(MapHandle) + 'static) -> Self {
        self.on_map_ready = Some(Box::new(callback));
        self
    }

    /// Sender for host interactions (typed addresses, focus, clear, unmount)
    pub fn sender(&self) -> InputSender {
        self.sender.clone()
    }

    pub fn state(&self) -> &StoreState {
        self.store.current_state()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.store.subscribe()
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn form_location(&self) -> FormLocation {
        self.config.form_location
    }

    /// Text currently shown in the input bound to slot `index`
    pub fn input_value(&self, index: usize) -> Option<String> {
        self.registry.input(index).and_then(|input| self.form.value(input))
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Process inputs until the widget is unmounted or every sender is gone
    ///
    /// The initial-location lookup runs alongside; its answer is dropped if it
    /// arrives after unmount.
    pub async fn run(&mut self) -> Result<()> {
        let mut inputs = self.inputs.take().ok_or(MappinError::WidgetStopped)?;

        let geocoder = Arc::clone(&self.geocoder);
        let default_view = self.config.default_view;
        let locale = self.locale.clone();
        let lookup = async move {
            bootstrap::initial_viewport(default_view, &locale, geocoder.as_ref()).await
        };
        tokio::pin!(lookup);
        let mut bootstrapped = false;

        while self.alive {
            tokio::select! {
                biased;

                event = &mut lookup, if !bootstrapped => {
                    bootstrapped = true;
                    if let Some(event) = event {
                        self.dispatch(event);
                        self.render(None).await;
                    }
                }

                input = inputs.recv() => match input {
                    Some(input) => self.handle(input).await,
                    None => break,
                },
            }
        }

        tracing::info!("Widget stopped at revision {}", self.state().revision);
        Ok(())
    }

    /// Handle one input to completion
    pub async fn handle(&mut self, input: WidgetInput) {
        let mut resolved_label = None;

        match input {
            WidgetInput::Gesture { gesture } => self.handle_gesture(gesture),

            WidgetInput::AddressEntered { index, text } => {
                resolved_label = self.resolve_address(index, &text).await;
            }

            WidgetInput::InputFocused { index } => {
                self.dispatch(StoreEvent::SelectSlot(index));
            }

            WidgetInput::ClearPins => {
                self.dispatch(StoreEvent::ClearPins);
            }

            WidgetInput::Unmount => {
                self.unmount();
                return;
            }
        }

        self.render(resolved_label).await;
    }

    fn handle_gesture(&mut self, gesture: MapGesture) {
        match gesture {
            MapGesture::Ready => {
                self.dispatch(StoreEvent::InitializeMap(self.map_handle));
                if let Some(callback) = self.on_map_ready.take() {
                    callback(self.map_handle);
                }
            }

            MapGesture::Click { at } => {
                self.dispatch(StoreEvent::MapClicked(at));
                self.dispatch(StoreEvent::SetViewport { center: at, zoom: None });
            }

            MapGesture::MarkerDragStart { .. } => {
                self.dispatch(StoreEvent::MarkerDragStarted);
            }

            MapGesture::MarkerDragEnd { marker, at } => match self.renderer.slot_for_marker(marker) {
                Some(index) => {
                    self.renderer.acknowledge_drag(index, at);
                    self.dispatch(StoreEvent::MarkerDragEnded { index, at });
                }
                None => tracing::debug!("Drag ended on unknown marker {:?}; ignored", marker),
            },

            MapGesture::ViewportChanged { center, zoom } => {
                self.renderer.acknowledge_viewport(Viewport::new(center, zoom));
                self.dispatch(StoreEvent::SetViewport { center, zoom: Some(zoom) });
            }
        }
    }

    /// Forward-geocode text typed into slot `index` and place its pin
    async fn resolve_address(&mut self, index: usize, text: &str) -> Option<(usize, String)> {
        let candidates = match self.geocoder.forward_geocode(text).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Address lookup for slot {} failed: {}", index, e);
                return None;
            }
        };

        let Some(candidate) = candidates.into_iter().next() else {
            tracing::info!("No match for address '{}' in slot {}", text, index);
            return None;
        };

        if !self.dispatch(StoreEvent::AddressResolved { index, at: candidate.coordinate }) {
            return None;
        }
        self.dispatch(StoreEvent::SetViewport { center: candidate.coordinate, zoom: None });
        Some((index, candidate.label))
    }

    fn dispatch(&mut self, event: StoreEvent) -> bool {
        if !self.alive {
            tracing::debug!("Widget unmounted; dropping {}", event.kind());
            return false;
        }
        matches!(self.store.dispatch(event), Outcome::Applied)
    }

    /// Re-sync the map and write labels of newly placed pins into their inputs
    ///
    /// A label resolved before the markers exist is kept until its slot is
    /// first rendered, as long as the slot has not moved since.
    async fn render(&mut self, resolved_label: Option<(usize, String)>) {
        if let Some((index, label)) = resolved_label {
            if let Some(at) = self.state().slots.get(index).and_then(|slot| slot.location) {
                self.resolved_labels.insert(index, (at, label));
            }
        }

        let report = match self.renderer.sync(self.map.as_mut(), self.store.current_state()) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Failed to sync map: {}", e);
                return;
            }
        };

        for index in report.cleared {
            self.resolved_labels.remove(&index);
            self.write_input(index, "");
        }

        for index in report.placed {
            let Some(location) = self.state().slots[index].location else {
                continue;
            };
            let text = match self.resolved_labels.remove(&index) {
                Some((at, label)) if at == location => label,
                _ => self.reverse_label(location).await,
            };
            self.write_input(index, &text);
        }
    }

    async fn reverse_label(&self, location: Coordinate) -> String {
        match self.geocoder.reverse_geocode(location).await {
            Ok(Some(label)) => label,
            Ok(None) => location.to_string(),
            Err(e) => {
                tracing::warn!("Reverse lookup of {} failed: {}", location, e);
                location.to_string()
            }
        }
    }

    fn write_input(&mut self, index: usize, text: &str) {
        let Some(input) = self.registry.input(index) else {
            return;
        };
        if let Err(e) = self.form.set_value(input, text) {
            tracing::warn!("Failed to write slot {} input: {}", index, e);
        }
    }

    fn unmount(&mut self) {
        self.alive = false;
        if let Err(e) = self.renderer.teardown(self.map.as_mut()) {
            tracing::warn!("Failed to remove markers: {}", e);
        }
        tracing::info!("Unmounted widget from '{}'", self.config.map.container);
    }
}
