//! Plain survival inventory rules.
//!
//! Enough to drive a real window end to end: pick up, place, split, swap,
//! shift-move, drag-distribute, gather and drop. Dropped items simply vanish;
//! there is no world to spawn them into.

use mdcontainer_core::ItemStack;
use mdcontainer_inventory::{InventorySlot, HOTBAR_SIZE, MAIN_INVENTORY_SIZE};
use mdcontainer_window::gesture::{DragMode, MergeOutcome};
use mdcontainer_window::{
    BehaviorError, ClickContext, InteractionBehavior, MouseButton, PartKind, SlotFlags, SlotRef,
};
use std::sync::Arc;
use tracing::debug;

const STORAGE_POSITIONS: usize = MAIN_INVENTORY_SIZE - HOTBAR_SIZE;

/// Vanilla-like click handling over bound slots.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicClickBehavior;

fn backed<'a>(slot: &SlotRef<'a>) -> Result<&'a Arc<InventorySlot>, BehaviorError> {
    slot.backing().ok_or_else(|| BehaviorError::Slot {
        slot: slot.index,
        reason: "not backed by an inventory".into(),
    })
}

fn cursor<'a>(ctx: &ClickContext<'a>) -> Result<&'a Arc<InventorySlot>, BehaviorError> {
    ctx.cursor()
        .backing()
        .ok_or_else(|| BehaviorError::Rejected("cursor is not bound".into()))
}

/// Move as much of `moving` as fits into `targets`: similar stacks first,
/// then empty slots.
fn fill(ctx: &ClickContext<'_>, targets: &[usize], moving: &mut ItemStack, max: u32) {
    let mut order = targets.to_vec();
    if order
        .iter()
        .any(|&i| ctx.slot(i).flags.contains(SlotFlags::REVERSE_SHIFT_INSERTION))
    {
        order.reverse();
    }

    for fill_empty in [false, true] {
        for &index in &order {
            if moving.count == 0 {
                return;
            }
            let target = ctx.slot(index);
            if target.flags.contains(SlotFlags::DISABLE_SHIFT_INSERTION) {
                continue;
            }
            let Some(backing) = target.backing() else {
                continue;
            };
            let capacity = target.flags.capacity(max);
            match backing.peek() {
                Some(mut existing)
                    if !fill_empty && existing.is_similar(moving) && existing.count < capacity =>
                {
                    let moved = (capacity - existing.count).min(moving.count);
                    existing.count += moved;
                    moving.count -= moved;
                    backing.set(Some(existing));
                }
                None if fill_empty => {
                    let moved = capacity.min(moving.count);
                    backing.set(Some(moving.with_count(moved)));
                    moving.count -= moved;
                }
                _ => {}
            }
        }
    }
}

fn drop_from(source: &InventorySlot, amount: u32) {
    if let Some(mut item) = source.peek() {
        let dropped = item.split(amount.min(item.count));
        source.set(Some(item));
        debug!(?dropped, "dropped items");
    }
}

impl InteractionBehavior for BasicClickBehavior {
    fn click(
        &mut self,
        ctx: &ClickContext<'_>,
        slot: SlotRef<'_>,
        button: MouseButton,
    ) -> Result<(), BehaviorError> {
        let target = backed(&slot)?;
        let cursor = cursor(ctx)?;
        let capacity = |item: &ItemStack| slot.flags.capacity(ctx.registry().max_stack_size(item));

        match (target.peek(), cursor.peek()) {
            (None, None) => {}
            (Some(mut item), None) => {
                let amount = match button {
                    MouseButton::Left => item.count,
                    MouseButton::Right => item.count.div_ceil(2),
                };
                if let Some(taken) = item.split(amount) {
                    cursor.set(Some(taken));
                    target.set(Some(item));
                }
            }
            (None, Some(mut held)) => {
                let amount = match button {
                    MouseButton::Left => held.count,
                    MouseButton::Right => 1,
                };
                if let Some(placed) = held.split(amount.min(capacity(&held))) {
                    target.set(Some(placed));
                    cursor.set(Some(held));
                }
            }
            (Some(mut item), Some(mut held)) if item.is_similar(&held) => {
                let room = capacity(&item).saturating_sub(item.count);
                let amount = match button {
                    MouseButton::Left => held.count,
                    MouseButton::Right => 1,
                }
                .min(room);
                if amount > 0 {
                    item.count += amount;
                    held.count -= amount;
                    target.set(Some(item));
                    cursor.set(Some(held));
                }
            }
            (Some(item), Some(held)) => {
                if held.count <= capacity(&held) {
                    target.set(Some(held));
                    cursor.set(Some(item));
                }
            }
        }
        Ok(())
    }

    fn click_outside(
        &mut self,
        ctx: &ClickContext<'_>,
        button: MouseButton,
    ) -> Result<(), BehaviorError> {
        let cursor = cursor(ctx)?;
        let amount = match button {
            MouseButton::Left => u32::MAX,
            MouseButton::Right => 1,
        };
        drop_from(cursor, amount);
        Ok(())
    }

    fn shift_click(
        &mut self,
        ctx: &ClickContext<'_>,
        slot: SlotRef<'_>,
        _button: MouseButton,
    ) -> Result<(), BehaviorError> {
        let source = backed(&slot)?;
        let Some(mut moving) = source.peek() else {
            return Ok(());
        };
        let max = ctx.registry().max_stack_size(&moving);
        let before = moving.count;

        let opposite: Vec<usize> = (0..ctx.len())
            .filter(|&i| i != slot.index && ctx.slot(i).part != slot.part)
            .collect();
        fill(ctx, &opposite, &mut moving, max);

        if moving.count == before && slot.part == PartKind::Bottom {
            let from_hotbar = slot.local >= STORAGE_POSITIONS;
            let other_section: Vec<usize> = (0..ctx.len())
                .filter(|&i| {
                    let other = ctx.slot(i);
                    other.part == PartKind::Bottom
                        && (other.local >= STORAGE_POSITIONS) != from_hotbar
                })
                .collect();
            fill(ctx, &other_section, &mut moving, max);
        }

        source.set(Some(moving));
        Ok(())
    }

    fn double_click(
        &mut self,
        ctx: &ClickContext<'_>,
        _slot: SlotRef<'_>,
        merge: &MergeOutcome,
    ) -> Result<(), BehaviorError> {
        let cursor = cursor(ctx)?;
        let Some(mut held) = cursor.peek() else {
            return Ok(());
        };
        let max = ctx.registry().max_stack_size(&held);

        for &index in &merge.absorbed {
            if held.count >= max {
                break;
            }
            let Some(backing) = ctx.slot(index).backing() else {
                continue;
            };
            let Some(mut other) = backing.peek() else {
                continue;
            };
            if !other.is_similar(&held) {
                continue;
            }
            let taken = other.count.min(max - held.count);
            other.count -= taken;
            held.count += taken;
            backing.set(Some(other));
        }
        cursor.set(Some(held));
        Ok(())
    }

    fn drag(
        &mut self,
        ctx: &ClickContext<'_>,
        slots: &[SlotRef<'_>],
        mode: DragMode,
    ) -> Result<(), BehaviorError> {
        let cursor = cursor(ctx)?;
        let Some(mut held) = cursor.peek() else {
            return Ok(());
        };
        let per_slot = match mode {
            DragMode::Left => held.count / slots.len().max(1) as u32,
            DragMode::Right => 1,
            DragMode::Middle => return Ok(()),
        };
        if per_slot == 0 {
            return Ok(());
        }
        let max = ctx.registry().max_stack_size(&held);

        for slot in slots {
            if held.count == 0 {
                break;
            }
            let Some(backing) = slot.backing() else {
                continue;
            };
            let capacity = slot.flags.capacity(max);
            match backing.peek() {
                None => {
                    let placed = per_slot.min(capacity).min(held.count);
                    backing.set(Some(held.with_count(placed)));
                    held.count -= placed;
                }
                Some(mut existing) if existing.is_similar(&held) => {
                    let placed = per_slot
                        .min(capacity.saturating_sub(existing.count))
                        .min(held.count);
                    existing.count += placed;
                    held.count -= placed;
                    backing.set(Some(existing));
                }
                Some(_) => {}
            }
        }
        cursor.set(Some(held));
        Ok(())
    }

    fn drop_item(
        &mut self,
        ctx: &ClickContext<'_>,
        slot: Option<SlotRef<'_>>,
        full_stack: bool,
    ) -> Result<(), BehaviorError> {
        let source = match &slot {
            Some(slot) => backed(slot)?,
            None => cursor(ctx)?,
        };
        drop_from(source, if full_stack { u32::MAX } else { 1 });
        Ok(())
    }

    fn number_key(
        &mut self,
        _ctx: &ClickContext<'_>,
        slot: SlotRef<'_>,
        hotbar: SlotRef<'_>,
    ) -> Result<(), BehaviorError> {
        let first = backed(&slot)?;
        let second = backed(&hotbar)?;
        if !Arc::ptr_eq(first, second) {
            let item = first.take();
            first.set(second.take());
            second.set(item);
        }
        Ok(())
    }

    fn middle_click(
        &mut self,
        ctx: &ClickContext<'_>,
        slot: SlotRef<'_>,
    ) -> Result<(), BehaviorError> {
        let cursor = cursor(ctx)?;
        if let (Some(item), true) = (slot.item(), cursor.is_empty()) {
            let max = ctx.registry().max_stack_size(&item);
            cursor.set(Some(item.with_count(max)));
        }
        Ok(())
    }

    fn creative_click(
        &mut self,
        _ctx: &ClickContext<'_>,
        slot: Option<SlotRef<'_>>,
        item: Option<&ItemStack>,
    ) -> Result<(), BehaviorError> {
        match slot {
            Some(slot) => backed(&slot)?.set(item.cloned()),
            None => debug!(?item, "creative drop"),
        }
        Ok(())
    }
}
