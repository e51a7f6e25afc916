use mdcontainer_core::ItemStack;
use mdcontainer_inventory::SlotInventory;
use mdcontainer_net::{ClickEvent, ClickReplay, ClientMessage, ServerMessage, ALIAS_CONTAINER_ID};
use mdcontainer_server::{BasicClickBehavior, ContainerSession, SessionConfig};
use mdcontainer_window::{ClientPlayer, ContainerIdAllocator, GameMode, WindowLayout};
use std::path::Path;
use std::sync::Arc;

const STONE: u16 = 1;
const DIAMOND: u16 = 264;

fn session(id: u64, ids: &'static ContainerIdAllocator) -> ContainerSession {
    let player = ClientPlayer::new(id, format!("player{id}"), GameMode::Survival);
    ContainerSession::with_allocator(SessionConfig::default(), player, ids).unwrap()
}

fn open_on(session: &mut ContainerSession, chest: &SlotInventory) {
    session
        .open(WindowLayout::chest(3), Box::new(BasicClickBehavior), |window| {
            let mut top = window.top();
            for (local, slot) in chest.slots().enumerate() {
                top.bind(local, Arc::clone(slot));
            }
        })
        .unwrap();
}

fn click(session: &ContainerSession, slot_index: i16, mode: u8, button: u8) -> ClientMessage {
    ClientMessage::Click(ClickEvent {
        container_id: session.window().unwrap().wire_id(),
        slot_index,
        mode,
        button,
    })
}

#[test]
fn shift_click_from_hotbar_uses_the_alias_for_the_source() {
    static IDS: ContainerIdAllocator = ContainerIdAllocator::new(1, 99);
    let chest = SlotInventory::new(27);
    let mut session = session(1, &IDS);
    let inventory = Arc::clone(session.player().unwrap().inventory());
    inventory.main().set(0, Some(ItemStack::new(STONE, 10)));
    open_on(&mut session, &chest);
    let wire_id = session.window().unwrap().wire_id();

    session.handle_message(click(&session, 54, 1, 0)).unwrap();

    assert_eq!(
        session.end_tick().unwrap(),
        vec![
            ServerMessage::SlotUpdate {
                container_id: wire_id,
                slot_index: 0,
                item: Some(ItemStack::new(STONE, 10)),
            },
            ServerMessage::SlotUpdate {
                container_id: ALIAS_CONTAINER_ID,
                slot_index: 0,
                item: None,
            },
        ]
    );
    assert_eq!(chest.get(0), Some(ItemStack::new(STONE, 10)));
    assert!(inventory.main().get(0).is_none());
}

#[test]
fn shared_chest_changes_reach_the_other_viewer() {
    static IDS: ContainerIdAllocator = ContainerIdAllocator::new(1, 99);
    let chest = SlotInventory::new(27);
    let mut alice = session(1, &IDS);
    let mut bob = session(2, &IDS);
    alice
        .player()
        .unwrap()
        .inventory()
        .main()
        .set(0, Some(ItemStack::new(DIAMOND, 5)));
    open_on(&mut alice, &chest);
    open_on(&mut bob, &chest);
    let bob_window = bob.window().unwrap().wire_id();

    // Alice picks up her diamonds and drops them into chest slot 4.
    alice.handle_message(click(&alice, 54, 0, 0)).unwrap();
    alice.handle_message(click(&alice, 4, 0, 0)).unwrap();
    alice.end_tick().unwrap();

    assert_eq!(
        bob.end_tick().unwrap(),
        vec![ServerMessage::SlotUpdate {
            container_id: bob_window,
            slot_index: 4,
            item: Some(ItemStack::new(DIAMOND, 5)),
        }]
    );
    assert!(bob.end_tick().unwrap().is_empty());
}

#[test]
fn demo_click_script_replays() {
    static IDS: ContainerIdAllocator = ContainerIdAllocator::new(1, 99);
    let chest = SlotInventory::new(27);
    let mut session = session(1, &IDS);
    let inventory = Arc::clone(session.player().unwrap().inventory());
    inventory.main().set(0, Some(ItemStack::new(STONE, 48)));
    inventory.main().set(9, Some(ItemStack::new(DIAMOND, 20)));
    open_on(&mut session, &chest);

    let script = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/chest_clicks.jsonl");
    let mut replay = ClickReplay::load(script).unwrap();
    let ticks = session.replay(&mut replay).unwrap();

    assert_eq!(ticks.len(), 5);
    assert!(session.window().is_none());
    assert_eq!(chest.get(0), Some(ItemStack::new(DIAMOND, 20)));
    assert_eq!(chest.get(10), Some(ItemStack::new(STONE, 1)));
    assert_eq!(chest.get(11), Some(ItemStack::new(STONE, 1)));
    assert_eq!(inventory.main().get(0), Some(ItemStack::new(STONE, 46)));
    assert!(inventory.cursor().is_empty());
}
