use crate::cell::CellIndex;
use crate::flags::SlotFlags;
use crate::shadow::ContainerShadow;
use mdcontainer_core::{ItemRegistry, ItemStack};
use mdcontainer_inventory::HOTBAR_SIZE;
use std::ops::Range;

/// Mark the source of a shift-click and the slots it will probably fill.
///
/// Returns the predicted targets in insertion order. Quantities are left to
/// the inventory; only the set of cells to re-send is decided here.
pub fn predict_shift_click(
    shadow: &mut ContainerShadow,
    registry: &ItemRegistry,
    source: usize,
) -> Vec<usize> {
    let Some(moving) = shadow
        .item(CellIndex::Slot(source))
        .filter(|stack| !stack.is_empty())
    else {
        return Vec::new();
    };
    shadow.queue_silent_slot_change_safely(CellIndex::Slot(source));

    let max_stack = registry.max_stack_size(&moving);
    let top_len = shadow.top_len();
    let len = shadow.len();

    let mut targets = if source < top_len {
        plan(shadow, &moving, max_stack, source, top_len..len)
    } else {
        plan(shadow, &moving, max_stack, source, 0..top_len)
    };

    // Nothing in the top takes it: move between storage rows and hotbar.
    if targets.is_empty() && source >= top_len {
        let hotbar_start = len - HOTBAR_SIZE;
        let range = if source < hotbar_start {
            hotbar_start..len
        } else {
            top_len..hotbar_start
        };
        targets = plan(shadow, &moving, max_stack, source, range);
    }

    for &target in &targets {
        shadow.queue_silent_slot_change_safely(CellIndex::Slot(target));
    }
    targets
}

fn plan(
    shadow: &ContainerShadow,
    moving: &ItemStack,
    max_stack: u32,
    source: usize,
    range: Range<usize>,
) -> Vec<usize> {
    let reverse = range
        .clone()
        .any(|i| shadow.flag(i).contains(SlotFlags::REVERSE_SHIFT_INSERTION));
    let mut order: Vec<usize> = range.filter(|&i| i != source).collect();
    if reverse {
        order.reverse();
    }

    let mut remaining = moving.count;
    let mut targets = Vec::new();
    // Similar partial stacks first, then empty slots.
    for fill_empty in [false, true] {
        for &index in &order {
            if remaining == 0 {
                break;
            }
            let flags = shadow.flag(index);
            if flags.contains(SlotFlags::DISABLE_SHIFT_INSERTION) {
                continue;
            }
            let capacity = flags.capacity(max_stack);
            let room = match shadow.item(CellIndex::Slot(index)) {
                None if fill_empty => capacity,
                Some(existing)
                    if !fill_empty && existing.is_similar(moving) && existing.count < capacity =>
                {
                    capacity - existing.count
                }
                _ => continue,
            };

            targets.push(index);
            if !flags.contains(SlotFlags::POSSIBLY_DISABLED_SHIFT_INSERTION) {
                remaining = remaining.saturating_sub(room);
            }
        }
    }
    targets
}
