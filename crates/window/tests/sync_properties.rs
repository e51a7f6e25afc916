//! Flush, alias and prediction invariants of client windows.

use mdcontainer_core::{ItemRegistry, ItemStack};
use mdcontainer_inventory::{SlotInventory, MAIN_INVENTORY_SIZE};
use mdcontainer_net::{ClickEvent, ServerMessage, ALIAS_CONTAINER_ID};
use mdcontainer_window::gesture::{predict_shift_click, DoubleClickState};
use mdcontainer_window::{
    compile_slot_flags, CellIndex, ClientContainer, ClientPlayer, ClientSlot, ContainerIdAllocator,
    ContainerShadow, DirtyState, GameMode, NoopBehavior, SlotFlags, WindowLayout, CONTAINER_IDS,
};
use proptest::prelude::*;
use std::sync::Arc;

const STONE: u16 = 1;
const SNOWBALL: u16 = 332;

fn open(top_flags: Vec<SlotFlags>) -> (ClientContainer, ClientPlayer) {
    let ids = ContainerIdAllocator::new(1, 99);
    let layout = WindowLayout::new("mdm:test", "Test", top_flags);
    let mut container = ClientContainer::with_allocator(
        &ids,
        layout,
        Arc::new(ItemRegistry::with_defaults()),
        Box::new(NoopBehavior),
    )
    .unwrap();
    let player = ClientPlayer::new(1, "alex", GameMode::Survival);
    container.attach_player(player.clone());
    container.init_messages();
    (container, player)
}

fn click(container: &ClientContainer, slot: i16, mode: u8, button: u8) -> ClickEvent {
    ClickEvent {
        container_id: container.wire_id(),
        slot_index: slot,
        mode,
        button,
    }
}

fn button_shadow(top: &[SlotFlags]) -> ContainerShadow {
    let mut shadow = ContainerShadow::new(compile_slot_flags(top).into());
    for index in 0..shadow.len() {
        shadow.bind_button(index, None);
    }
    shadow.clear_dirty();
    shadow
}

#[test]
fn second_flush_without_mutation_is_empty() {
    let (mut container, player) = open(vec![SlotFlags::empty(); 9]);
    player.inventory().main().set(4, Some(ItemStack::new(STONE, 8)));
    container.handle_click(&click(&container, 3, 0, 0));
    container.handle_click(&click(&container, 40, 1, 0));

    assert!(!container.collect_change_messages().is_empty());
    assert!(container.collect_change_messages().is_empty());
}

#[test]
fn backing_changes_reach_every_open_window() {
    let (mut first, player) = open(vec![SlotFlags::empty(); 9]);
    let (mut second, _) = open(vec![SlotFlags::empty(); 27]);
    second.attach_player(player.clone());
    second.collect_change_messages();

    // Storage slot 9 is the first storage row position in both windows.
    player.inventory().main().set(9, Some(ItemStack::new(STONE, 2)));

    let expected_first = ServerMessage::SlotUpdate {
        container_id: first.wire_id(),
        slot_index: 9,
        item: Some(ItemStack::new(STONE, 2)),
    };
    let expected_second = ServerMessage::SlotUpdate {
        container_id: second.wire_id(),
        slot_index: 27,
        item: Some(ItemStack::new(STONE, 2)),
    };
    assert_eq!(first.collect_change_messages(), vec![expected_first]);
    assert_eq!(second.collect_change_messages(), vec![expected_second]);
}

#[test]
fn silent_hotbar_updates_go_to_the_alias() {
    let (mut container, player) = open(vec![SlotFlags::empty(); 4]);
    // Hotbar column 3 (0-based 2) is storage slot 2.
    player.inventory().main().set(2, Some(ItemStack::new(STONE, 1)));

    assert_eq!(
        container.collect_change_messages(),
        vec![ServerMessage::SlotUpdate {
            container_id: ALIAS_CONTAINER_ID,
            slot_index: 2,
            item: Some(ItemStack::new(STONE, 1)),
        }]
    );
}

#[test]
fn visible_hotbar_updates_use_the_primary_index() {
    let (mut container, _player) = open(vec![SlotFlags::empty(); 4]);
    let global = 4 + 27 + 2;
    container
        .shadow_mut()
        .queue_slot_change(CellIndex::Slot(global));

    assert_eq!(
        container.collect_change_messages(),
        vec![ServerMessage::SlotUpdate {
            container_id: container.wire_id(),
            slot_index: global as i16,
            item: None,
        }]
    );
}

#[test]
fn explicit_alias_retargets_silent_updates_only() {
    let aliased = SlotFlags::empty().with_silent_alias(40);
    let (mut container, _player) = open(vec![SlotFlags::empty(), aliased]);
    container.top().bind_button(1, Some(ItemStack::new(STONE, 1)));

    assert_eq!(
        container.collect_change_messages(),
        vec![ServerMessage::SlotUpdate {
            container_id: ALIAS_CONTAINER_ID,
            slot_index: 40,
            item: Some(ItemStack::new(STONE, 1)),
        }]
    );

    container.top().queue_slot_change(1);
    assert_eq!(
        container.collect_change_messages(),
        vec![ServerMessage::SlotUpdate {
            container_id: container.wire_id(),
            slot_index: 1,
            item: Some(ItemStack::new(STONE, 1)),
        }]
    );
}

#[test]
fn properties_are_sent_only_when_changed() {
    let (mut container, _player) = open(vec![SlotFlags::empty(); 3]);
    let mut burn = 0;
    container.register_property(0, move || {
        burn += 10;
        burn.min(20)
    });

    let first = container.collect_change_messages();
    assert_eq!(
        first,
        vec![ServerMessage::PropertyUpdate {
            container_id: container.wire_id(),
            property: 0,
            value: 10,
        }]
    );
    assert_eq!(container.collect_change_messages().len(), 1);
    assert!(container.collect_change_messages().is_empty());
}

#[test]
fn init_messages_snapshot_in_client_order() {
    let ids = ContainerIdAllocator::new(1, 99);
    let mut order: Vec<usize> = (0..38).collect();
    order.swap(0, 1);
    let layout = WindowLayout::new("mdm:pair", "Pair", vec![SlotFlags::empty(); 2])
        .with_client_order(order);
    let mut container = ClientContainer::with_allocator(
        &ids,
        layout,
        Arc::new(ItemRegistry::with_defaults()),
        Box::new(NoopBehavior),
    )
    .unwrap();
    container.top().bind_button(0, Some(ItemStack::new(STONE, 1)));

    let messages = container.init_messages();
    assert_eq!(
        messages[0],
        ServerMessage::OpenWindow {
            container_id: 1,
            kind: "mdm:pair".into(),
            title: "Pair".into(),
            slot_count: 2,
        }
    );
    let ServerMessage::FullInventorySnapshot { items, .. } = &messages[1] else {
        panic!("expected a snapshot, got {:?}", messages[1]);
    };
    assert_eq!(items.len(), 38);
    assert_eq!(items[0], None);
    assert_eq!(items[1], Some(ItemStack::new(STONE, 1)));
    assert_eq!(messages[2], ServerMessage::CursorUpdate { item: None });
    assert!(container.collect_change_messages().is_empty());
}

#[test]
fn shift_click_from_four_slot_chest_marks_one_target() {
    let chest = SlotInventory::new(4);
    chest.set(0, Some(ItemStack::new(STONE, 3)));
    let (mut container, _player) = open(vec![SlotFlags::empty(); 4]);
    for local in 0..4 {
        let slot = Arc::clone(chest.slot(local).unwrap());
        container.top().bind(local, slot);
    }
    container.collect_change_messages();
    assert_eq!(container.len(), 40);

    container.handle_click(&click(&container, 0, 1, 0));

    assert_eq!(
        container.shadow().dirty_slots(),
        vec![(0, DirtyState::DirtySilent), (4, DirtyState::DirtySilent)]
    );
}

#[test]
fn unbinding_releases_the_last_tracker() {
    let chest = SlotInventory::new(6);
    let (mut container, _player) = open(vec![SlotFlags::empty(); 6]);
    for local in 0..6 {
        let slot = Arc::clone(chest.slot(local).unwrap());
        container.top().bind(local, slot);
    }
    container.collect_change_messages();
    let backing = Arc::clone(chest.slot(5).unwrap());
    let tracker = container.shadow().tracker();
    assert!(matches!(
        container.shadow().cell(CellIndex::Slot(5)),
        ClientSlot::Bound(_)
    ));
    assert!(backing.has_tracker(tracker));

    container.top().unbind(5);

    assert!(container.shadow().cell(CellIndex::Slot(5)).is_unbound());
    assert_eq!(
        container.shadow().dirty_state(CellIndex::Slot(5)),
        DirtyState::DirtySilent
    );
    assert!(!backing.has_tracker(tracker));
}

#[test]
fn unbinding_keeps_tracker_while_another_cell_shares_the_backing() {
    let chest = SlotInventory::new(1);
    let (mut container, _player) = open(vec![SlotFlags::empty(); 2]);
    let shared = Arc::clone(chest.slot(0).unwrap());
    container.top().bind(0, Arc::clone(&shared));
    container.top().bind(1, Arc::clone(&shared));

    container.top().unbind(0);
    assert!(shared.has_tracker(container.shadow().tracker()));
}

#[test]
fn rebinding_the_bottom_moves_trackers() {
    let (mut container, old_player) = open(vec![SlotFlags::empty(); 1]);
    container.bottom().bind_button(0, Some(ItemStack::new(STONE, 1)));
    let tracker = container.shadow().tracker();
    let replacement = ClientPlayer::new(2, "sam", GameMode::Survival);

    let previous = container.attach_player(replacement.clone());

    assert_eq!(previous.map(|player| player.id()), Some(old_player.id()));
    let old_slot = old_player.inventory().window_slot(5).unwrap();
    let new_slot = replacement.inventory().window_slot(5).unwrap();
    assert!(!old_slot.has_tracker(tracker));
    assert!(new_slot.has_tracker(tracker));
    assert!(matches!(
        container.shadow().cell(CellIndex::Slot(1)),
        ClientSlot::Button(Some(_))
    ));
}

#[test]
fn attaching_to_an_empty_window_returns_nothing() {
    let ids = ContainerIdAllocator::new(1, 99);
    let mut container = ClientContainer::with_allocator(
        &ids,
        WindowLayout::new("mdm:test", "Test", vec![SlotFlags::empty(); 1]),
        Arc::new(ItemRegistry::with_defaults()),
        Box::new(NoopBehavior),
    )
    .unwrap();
    let player = ClientPlayer::new(3, "ana", GameMode::Survival);

    assert!(container.attach_player(player.clone()).is_none());
    assert_eq!(container.player().map(ClientPlayer::id), Some(3));
}

#[test]
fn release_detaches_every_backing() {
    let (mut container, player) = open(vec![SlotFlags::empty(); 3]);
    let tracker = container.shadow().tracker();
    container.release();

    assert!(player.inventory().main().slots().all(|slot| !slot.has_tracker(tracker)));
    assert!(!player.inventory().cursor().has_tracker(tracker));
    assert!(container.player().is_none());
}

#[test]
fn global_ids_stay_in_range() {
    for _ in 0..250 {
        let id = CONTAINER_IDS.allocate();
        assert!((1..=99).contains(&id), "allocated {id}");
    }
}

proptest! {
    #[test]
    fn safe_marks_never_downgrade(ops in prop::collection::vec((0u8..4, 0usize..40), 1..64)) {
        let mut shadow = button_shadow(&[SlotFlags::empty(); 4]);
        for (op, slot) in ops {
            let index = CellIndex::Slot(slot);
            let before = shadow.dirty_state(index);
            match op {
                0 => shadow.queue_slot_change(index),
                1 => shadow.queue_silent_slot_change(index),
                2 => shadow.queue_slot_change_safely(index),
                _ => shadow.queue_silent_slot_change_safely(index),
            }
            if op >= 2 && before != DirtyState::Clean {
                prop_assert_eq!(shadow.dirty_state(index), before);
            }
        }
        shadow.drain_changes();
        prop_assert!(shadow.drain_changes().is_empty());
    }

    #[test]
    fn shift_click_never_marks_disabled_slots(
        disabled in prop::collection::vec(any::<bool>(), 1..10),
        source_pick in any::<prop::sample::Index>(),
        filled in prop::collection::vec((any::<prop::sample::Index>(), 1u32..64), 0..12),
    ) {
        let top: Vec<SlotFlags> = disabled
            .iter()
            .map(|&off| if off { SlotFlags::DISABLE_SHIFT_INSERTION } else { SlotFlags::empty() })
            .collect();
        let mut shadow = button_shadow(&top);
        let len = shadow.len();
        for (pick, count) in filled {
            shadow.bind_button(pick.index(len), Some(ItemStack::new(STONE, count)));
        }
        let source = source_pick.index(len);
        shadow.bind_button(source, Some(ItemStack::new(STONE, 5)));
        shadow.clear_dirty();

        let registry = ItemRegistry::with_defaults();
        predict_shift_click(&mut shadow, &registry, source);

        for (index, flags) in shadow.flags().iter().enumerate() {
            if index != source && flags.contains(SlotFlags::DISABLE_SHIFT_INSERTION) {
                prop_assert_eq!(shadow.dirty_state(CellIndex::Slot(index)), DirtyState::Clean);
            }
        }
        prop_assert!(shadow
            .dirty_slots()
            .iter()
            .all(|(_, state)| *state == DirtyState::DirtySilent));
    }

    #[test]
    fn double_click_never_exceeds_true_max(
        start in 1u32..=16,
        others in prop::collection::vec((0usize..(MAIN_INVENTORY_SIZE + 3), 1u32..=16), 0..20),
    ) {
        let registry = ItemRegistry::with_defaults();
        let mut shadow = button_shadow(&[SlotFlags::empty(); 3]);
        for (index, count) in others {
            shadow.bind_button(index, Some(ItemStack::new(SNOWBALL, count)));
        }
        shadow.clear_dirty();

        let mut state = DoubleClickState::default();
        state.record(0, Some(ItemStack::new(SNOWBALL, start)));
        let merge = state.complete(&mut shadow, &registry).unwrap();

        prop_assert!(merge.quantity <= registry.max_stack_size_of(SNOWBALL));
        prop_assert!(merge.quantity >= start);
        prop_assert!(!merge.absorbed.contains(&0));
        prop_assert!(state.pending().is_none());
    }
}
