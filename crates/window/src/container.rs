//! A window as shown to one client.

use crate::behavior::{BehaviorError, ClickContext, InteractionBehavior};
use crate::cell::{CellIndex, ClientSlot};
use crate::dispatch::{decode_click, ClickAction, MouseButton};
use crate::error::WindowError;
use crate::flags::{compile_slot_flags, SlotFlags};
use crate::gesture::{predict_shift_click, DoubleClickState, DragFinish, DragState, DragStep};
use crate::id::{ContainerIdAllocator, CONTAINER_IDS};
use crate::index::{ClientTarget, PartKind, SlotIndexMap};
use crate::part::ContainerPart;
use crate::player::ClientPlayer;
use crate::property::PropertyTracker;
use crate::shadow::ContainerShadow;
use mdcontainer_core::ItemRegistry;
use mdcontainer_inventory::{InventorySlot, PlayerInventory, HOTBAR_SIZE, MAIN_INVENTORY_SIZE};
use mdcontainer_net::{
    ClickEvent, CreativeClickEvent, PickEvent, ServerMessage, WireContainerId, ALIAS_CONTAINER_ID,
};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Static description of a window kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowLayout {
    /// Kind identifier sent to the client (e.g. `mdm:chest`).
    pub kind: String,
    /// Display title.
    pub title: String,
    /// Flags of the custom (top) slots.
    pub top_flags: Vec<SlotFlags>,
    /// Optional on-screen order: client index `c` shows global slot `order[c]`.
    pub client_order: Option<Vec<usize>>,
}

impl WindowLayout {
    /// Layout with custom slots described by `top_flags`.
    pub fn new(kind: impl Into<String>, title: impl Into<String>, top_flags: Vec<SlotFlags>) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            top_flags,
            client_order: None,
        }
    }

    /// Chest with `rows` rows of nine plain slots.
    pub fn chest(rows: usize) -> Self {
        Self::new(
            "mdm:chest",
            "Chest",
            vec![SlotFlags::empty(); rows * HOTBAR_SIZE],
        )
    }

    /// Reorder the slots as the client sees them.
    pub fn with_client_order(mut self, order: Vec<usize>) -> Self {
        self.client_order = Some(order);
        self
    }
}

/// Server-side state of one open window: shadow, gesture state, properties
/// and the behavior that applies inventory rules.
pub struct ClientContainer {
    id: u8,
    kind: String,
    title: String,
    index: SlotIndexMap,
    shadow: ContainerShadow,
    drag: DragState,
    double_click: DoubleClickState,
    properties: PropertyTracker,
    registry: Arc<ItemRegistry>,
    behavior: Box<dyn InteractionBehavior>,
    player: Option<ClientPlayer>,
}

impl fmt::Debug for ClientContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContainer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("len", &self.shadow.len())
            .field("player", &self.player.as_ref().map(ClientPlayer::id))
            .finish_non_exhaustive()
    }
}

impl ClientContainer {
    /// Build a window with an id from the process-wide allocator.
    pub fn new(
        layout: WindowLayout,
        registry: Arc<ItemRegistry>,
        behavior: Box<dyn InteractionBehavior>,
    ) -> Result<Self, WindowError> {
        Self::with_allocator(&CONTAINER_IDS, layout, registry, behavior)
    }

    /// Build a window with an id from `ids`.
    pub fn with_allocator(
        ids: &ContainerIdAllocator,
        layout: WindowLayout,
        registry: Arc<ItemRegistry>,
        behavior: Box<dyn InteractionBehavior>,
    ) -> Result<Self, WindowError> {
        let WindowLayout {
            kind,
            title,
            top_flags,
            client_order,
        } = layout;

        let index = match client_order {
            Some(order) => SlotIndexMap::with_client_order(top_flags.len(), order)?,
            None => SlotIndexMap::new(top_flags.len())?,
        };
        let shadow = ContainerShadow::new(compile_slot_flags(&top_flags).into());

        Ok(Self {
            id: ids.allocate(),
            kind,
            title,
            index,
            shadow,
            drag: DragState::default(),
            double_click: DoubleClickState::default(),
            properties: PropertyTracker::new(),
            registry,
            behavior,
            player: None,
        })
    }

    /// Container id, also used on the wire.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Id as sent on the wire.
    pub fn wire_id(&self) -> WireContainerId {
        // Allocator ranges never exceed i8::MAX.
        self.id as WireContainerId
    }

    /// Window kind identifier.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of visible slots.
    pub fn len(&self) -> usize {
        self.shadow.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// What the client is believed to see.
    pub fn shadow(&self) -> &ContainerShadow {
        &self.shadow
    }

    /// Mutable shadow, for queueing corrections.
    pub fn shadow_mut(&mut self) -> &mut ContainerShadow {
        &mut self.shadow
    }

    /// Mapping between parts and global slot indices.
    pub fn index_map(&self) -> &SlotIndexMap {
        &self.index
    }

    /// Item descriptors.
    pub fn registry(&self) -> &Arc<ItemRegistry> {
        &self.registry
    }

    /// In-progress drag, if any.
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Last recorded click, for double-click detection.
    pub fn double_click_state(&self) -> &DoubleClickState {
        &self.double_click
    }

    /// Attached player.
    pub fn player(&self) -> Option<&ClientPlayer> {
        self.player.as_ref()
    }

    /// Attached player, mutably.
    pub fn player_mut(&mut self) -> Option<&mut ClientPlayer> {
        self.player.as_mut()
    }

    /// The window's own slots.
    pub fn top(&mut self) -> ContainerPart<'_> {
        ContainerPart::new(&mut self.shadow, &self.index, PartKind::Top)
    }

    /// The player block.
    pub fn bottom(&mut self) -> ContainerPart<'_> {
        ContainerPart::new(&mut self.shadow, &self.index, PartKind::Bottom)
    }

    /// Re-home every bottom cell to `inventory`. Button cells stay as they are.
    pub fn bind_bottom(&mut self, inventory: &PlayerInventory) {
        for position in 0..MAIN_INVENTORY_SIZE {
            let global = self.index.to_global(PartKind::Bottom, position);
            if matches!(self.shadow.cell(CellIndex::Slot(global)), ClientSlot::Button(_)) {
                continue;
            }
            if let Some(slot) = inventory.window_slot(position) {
                self.shadow.bind(global, Arc::clone(slot));
            }
        }
    }

    /// Back the cursor cell with `slot`.
    pub fn bind_cursor(&mut self, slot: Arc<InventorySlot>) {
        self.shadow.bind_cursor(slot);
    }

    /// Show the window to `player`: binds the player block and cursor to the
    /// player's inventory and starts tracking every backing slot.
    ///
    /// A player already attached is detached first and returned.
    pub fn attach_player(&mut self, player: ClientPlayer) -> Option<ClientPlayer> {
        let previous = if self.player.is_some() {
            self.detach_player()
        } else {
            None
        };
        if let Some(previous) = &previous {
            debug!(
                container_id = self.id,
                previous = previous.id(),
                "replacing attached player"
            );
        }
        let inventory = Arc::clone(player.inventory());
        self.bind_bottom(&inventory);
        self.bind_cursor(Arc::clone(inventory.cursor()));
        self.player = Some(player);
        self.shadow.start_tracking();
        debug!(container_id = self.id, "player attached");
        previous
    }

    /// Stop tracking and drop gesture state. Cells stay bound.
    pub fn detach_player(&mut self) -> Option<ClientPlayer> {
        self.shadow.stop_tracking();
        self.drag = DragState::default();
        self.double_click.clear();
        self.player.take()
    }

    /// Poll `poll` every flush and send property `index` when it changes.
    pub fn register_property(&mut self, index: u16, poll: impl FnMut() -> i32 + Send + 'static) {
        self.properties.register(index, poll);
    }

    /// Messages that open the window on the client. Clears all pending marks.
    pub fn init_messages(&mut self) -> Vec<ServerMessage> {
        self.shadow.populate();
        self.shadow.poll_trackers();
        self.shadow.clear_dirty();

        let len = self.len();
        let mut items = vec![None; len];
        for global in 0..len {
            let client = self.index.to_client(global) as usize;
            items[client] = self.shadow.item(CellIndex::Slot(global));
        }

        let mut messages = vec![
            ServerMessage::OpenWindow {
                container_id: self.wire_id(),
                kind: self.kind.clone(),
                title: self.title.clone(),
                slot_count: self.index.top_len() as u16,
            },
            ServerMessage::FullInventorySnapshot {
                container_id: self.wire_id(),
                items,
            },
            ServerMessage::CursorUpdate {
                item: self.shadow.item(CellIndex::Cursor),
            },
        ];
        messages.extend(self.properties.collect(self.wire_id(), true));
        messages
    }

    /// Flush: slot updates in index order, then the cursor, then properties.
    pub fn collect_change_messages(&mut self) -> Vec<ServerMessage> {
        self.shadow.poll_trackers();
        let drained = self.shadow.drain_changes();
        let container_id = self.wire_id();

        let mut messages = Vec::with_capacity(drained.slots.len() + 1);
        for change in drained.slots {
            let alias = if change.silent {
                self.shadow.flag(change.index).silent_alias()
            } else {
                None
            };
            let (container_id, slot_index) = match alias {
                Some(alias) => (ALIAS_CONTAINER_ID, i16::from(alias)),
                None => (container_id, self.index.to_client(change.index)),
            };
            messages.push(ServerMessage::SlotUpdate {
                container_id,
                slot_index,
                item: change.item,
            });
        }
        if let Some(item) = drained.cursor {
            messages.push(ServerMessage::CursorUpdate { item });
        }
        messages.extend(self.properties.collect(container_id, false));
        messages
    }

    /// Message telling the client to close this window.
    pub fn close_message(&self) -> ServerMessage {
        ServerMessage::CloseWindow {
            container_id: self.wire_id(),
        }
    }

    /// Detach from every backing slot and forget all client state.
    pub fn release(&mut self) {
        self.detach_player();
        self.shadow.release();
        debug!(container_id = self.id, "container released");
    }

    /// Handle a window click.
    pub fn handle_click(&mut self, event: &ClickEvent) {
        if event.container_id != self.wire_id() {
            warn!(
                container_id = self.id,
                received = event.container_id,
                "click for another window"
            );
            return;
        }
        let Some(target) = self.index.from_client(event.slot_index) else {
            warn!(
                container_id = self.id,
                slot = event.slot_index,
                "click on a slot outside the window"
            );
            return;
        };
        let Some(action) = decode_click(event.mode, event.button, target) else {
            warn!(
                container_id = self.id,
                slot = event.slot_index,
                mode = event.mode,
                button = event.button,
                "unknown click"
            );
            return;
        };
        self.dispatch(action);
    }

    /// Handle a creative-mode slot overwrite. Non-creative players get the
    /// slot corrected instead.
    pub fn handle_creative_click(&mut self, event: &CreativeClickEvent) {
        let Some(target) = self.index.from_client(event.slot_index) else {
            warn!(
                container_id = self.id,
                slot = event.slot_index,
                "creative click on a slot outside the window"
            );
            return;
        };
        self.interrupt_gestures();

        let creative = self.player.as_ref().is_some_and(ClientPlayer::is_creative);
        let item = event.item.as_ref();
        match target {
            ClientTarget::Slot(slot) if creative => {
                self.shadow.queue_silent_slot_change_safely(CellIndex::Slot(slot));
                self.invoke("creative_click", Some(slot), |behavior, ctx| {
                    behavior.creative_click(ctx, Some(ctx.slot(slot)), item)
                });
            }
            ClientTarget::Outside if creative => {
                self.invoke("creative_click", None, |behavior, ctx| {
                    behavior.creative_click(ctx, None, item)
                });
            }
            ClientTarget::Slot(slot) => {
                warn!(container_id = self.id, slot, "creative click from non-creative player");
                self.shadow.queue_slot_change(CellIndex::Slot(slot));
            }
            ClientTarget::Outside => {
                warn!(container_id = self.id, "creative drop from non-creative player");
            }
        }
    }

    /// Handle a pick request.
    pub fn handle_pick(&mut self, event: &PickEvent) {
        let Some(ClientTarget::Slot(slot)) = self.index.from_client(event.slot_index) else {
            warn!(container_id = self.id, slot = event.slot_index, "pick outside the window");
            return;
        };
        self.interrupt_gestures();
        self.shadow.queue_slot_change_safely(CellIndex::Slot(slot));
        self.invoke("pick", Some(slot), |behavior, ctx| behavior.pick(ctx, ctx.slot(slot)));
    }

    fn interrupt_gestures(&mut self) {
        if self.drag.is_active() {
            self.drag.reset(&mut self.shadow);
        }
        self.double_click.clear();
    }

    fn dispatch(&mut self, action: ClickAction) {
        if !matches!(action, ClickAction::Drag { .. }) && self.drag.is_active() {
            self.drag.reset(&mut self.shadow);
        }
        let keeps_candidate = matches!(
            action,
            ClickAction::DoubleClick { .. }
                | ClickAction::Click {
                    target: ClientTarget::Slot(_),
                    ..
                }
        );
        if !keeps_candidate {
            self.double_click.clear();
        }

        match action {
            ClickAction::Click {
                target: ClientTarget::Slot(slot),
                button,
            } => self.click_slot(slot, button),
            ClickAction::Click {
                target: ClientTarget::Outside,
                button,
            } => {
                self.shadow.queue_slot_change_safely(CellIndex::Cursor);
                self.invoke("click_outside", None, |behavior, ctx| {
                    behavior.click_outside(ctx, button)
                });
            }
            ClickAction::ShiftClick { slot, button } => {
                predict_shift_click(&mut self.shadow, &self.registry, slot);
                self.invoke("shift_click", Some(slot), |behavior, ctx| {
                    behavior.shift_click(ctx, ctx.slot(slot), button)
                });
            }
            ClickAction::NumberKey { slot, hotbar } => {
                let hotbar_slot = self.index.to_global(
                    PartKind::Bottom,
                    MAIN_INVENTORY_SIZE - HOTBAR_SIZE + usize::from(hotbar),
                );
                self.shadow.queue_slot_change_safely(CellIndex::Slot(slot));
                self.shadow.queue_slot_change_safely(CellIndex::Slot(hotbar_slot));
                self.invoke("number_key", Some(slot), |behavior, ctx| {
                    behavior.number_key(ctx, ctx.slot(slot), ctx.slot(hotbar_slot))
                });
            }
            ClickAction::MiddleClick { slot } => {
                if !self.player.as_ref().is_some_and(ClientPlayer::is_creative) {
                    debug!(container_id = self.id, slot, "middle click outside creative ignored");
                    return;
                }
                self.shadow.queue_slot_change_safely(CellIndex::Cursor);
                self.invoke("middle_click", Some(slot), |behavior, ctx| {
                    behavior.middle_click(ctx, ctx.slot(slot))
                });
            }
            ClickAction::Drop {
                target: ClientTarget::Slot(slot),
                full_stack,
            } => {
                self.shadow.queue_slot_change_safely(CellIndex::Slot(slot));
                self.invoke("drop", Some(slot), |behavior, ctx| {
                    behavior.drop_item(ctx, Some(ctx.slot(slot)), full_stack)
                });
            }
            ClickAction::Drop {
                target: ClientTarget::Outside,
                full_stack,
            } => {
                self.shadow.queue_slot_change_safely(CellIndex::Cursor);
                self.invoke("drop", None, |behavior, ctx| {
                    behavior.drop_item(ctx, None, full_stack)
                });
            }
            ClickAction::Drag { mode, step, target } => match step {
                DragStep::Start => self.drag.start(&mut self.shadow, mode),
                DragStep::AddSlot => match target {
                    ClientTarget::Slot(slot) => self.drag.add_slot(&mut self.shadow, mode, slot),
                    ClientTarget::Outside => {
                        debug!(container_id = self.id, ?mode, "drag over the outside ignored");
                    }
                },
                DragStep::Finish => match self.drag.finish(&mut self.shadow, mode) {
                    DragFinish::Nothing => {}
                    DragFinish::Click { slot, button } => self.click_slot(slot, button),
                    DragFinish::Distribute { slots, mode } => {
                        self.invoke("drag", slots.first().copied(), |behavior, ctx| {
                            let refs: Vec<_> = slots.iter().map(|&slot| ctx.slot(slot)).collect();
                            behavior.drag(ctx, &refs, mode)
                        });
                    }
                },
            },
            ClickAction::DoubleClick { slot } => {
                match self.double_click.complete(&mut self.shadow, &self.registry) {
                    Some(merge) => {
                        self.invoke("double_click", Some(slot), |behavior, ctx| {
                            behavior.double_click(ctx, ctx.slot(slot), &merge)
                        });
                    }
                    None => debug!(container_id = self.id, slot, "double click without candidate"),
                }
            }
        }
    }

    fn click_slot(&mut self, slot: usize, button: MouseButton) {
        self.shadow.queue_slot_change_safely(CellIndex::Slot(slot));
        self.shadow.queue_slot_change_safely(CellIndex::Cursor);
        if self.shadow.item(CellIndex::Cursor).is_none() {
            self.double_click
                .record(slot, self.shadow.item(CellIndex::Slot(slot)));
        } else {
            self.double_click.clear();
        }
        self.invoke("click", Some(slot), |behavior, ctx| {
            behavior.click(ctx, ctx.slot(slot), button)
        });
    }

    /// Single call site for behaviors. Errors and panics are logged and
    /// swallowed; shadow marks made before the call survive.
    fn invoke<F>(&mut self, gesture: &'static str, slot: Option<usize>, call: F)
    where
        F: FnOnce(&mut dyn InteractionBehavior, &ClickContext<'_>) -> Result<(), BehaviorError>,
    {
        let ctx = ClickContext::new(
            self.id,
            self.player.as_ref(),
            &self.registry,
            &self.shadow,
            &self.index,
        );
        let behavior = self.behavior.as_mut();
        match panic::catch_unwind(AssertUnwindSafe(|| call(behavior, &ctx))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(container_id = self.id, gesture, slot, error = %err, "interaction behavior failed");
            }
            Err(payload) => {
                error!(
                    container_id = self.id,
                    gesture,
                    slot,
                    panic = panic_message(payload.as_ref()),
                    "interaction behavior panicked"
                );
            }
        }
    }
}

impl Drop for ClientContainer {
    fn drop(&mut self) {
        self.shadow.stop_tracking();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
