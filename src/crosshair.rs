//! Crosshair synchronization across display slots.
//!
//! Each slot owns a `(column, row)` pair. A column picked by the user in one
//! slot is pushed to every other slot; rows stay private. Inbound updates are
//! applied while the receiving slot is marked as syncing, which suppresses any
//! outward broadcast, so an update never echoes back to its origin.

use crate::types::Part;
use std::ops::{Deref, DerefMut};

/// Column/row position of one slot's crosshair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotCursor {
    pub column: usize,
    pub row: usize,
}

/// A column change that should reach the other slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnBroadcast {
    pub column: usize,
}

#[derive(Debug, Default)]
pub struct DisplaySlot {
    cursor: SlotCursor,
    syncing: bool,
}

impl DisplaySlot {
    pub fn cursor(&self) -> SlotCursor {
        self.cursor
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    /// Set the column; returns a broadcast unless the slot is syncing.
    pub fn set_column(&mut self, column: usize) -> Option<ColumnBroadcast> {
        self.cursor.column = column;
        if self.syncing {
            None
        } else {
            Some(ColumnBroadcast { column })
        }
    }

    /// Set the row. Rows are never broadcast.
    pub fn set_row(&mut self, row: usize) {
        self.cursor.row = row;
    }

    /// Mark the slot as syncing until the guard drops.
    pub fn begin_sync(&mut self) -> SyncGuard<'_> {
        let was_syncing = std::mem::replace(&mut self.syncing, true);
        SyncGuard {
            slot: self,
            was_syncing,
        }
    }
}

/// Restores a slot's syncing flag on drop.
pub struct SyncGuard<'a> {
    slot: &'a mut DisplaySlot,
    was_syncing: bool,
}

impl Deref for SyncGuard<'_> {
    type Target = DisplaySlot;

    fn deref(&self) -> &DisplaySlot {
        self.slot
    }
}

impl DerefMut for SyncGuard<'_> {
    fn deref_mut(&mut self) -> &mut DisplaySlot {
        self.slot
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.slot.syncing = self.was_syncing;
    }
}

/// The crosshair state of every display slot.
#[derive(Debug, Default)]
pub struct CrosshairSync {
    slots: Vec<DisplaySlot>,
    broadcasts: u64,
}

impl CrosshairSync {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: (0..slot_count).map(|_| DisplaySlot::default()).collect(),
            broadcasts: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn cursor(&self, slot: usize) -> Option<SlotCursor> {
        self.slots.get(slot).map(DisplaySlot::cursor)
    }

    /// Broadcasts sent so far.
    pub fn broadcast_count(&self) -> u64 {
        self.broadcasts
    }

    /// User picked a column in `slot`. Returns how many other slots were updated.
    pub fn user_set_column(&mut self, slot: usize, column: usize) -> usize {
        let Some(origin) = self.slots.get_mut(slot) else {
            tracing::warn!("Crosshair update for unknown slot {}", slot);
            return 0;
        };
        match origin.set_column(column) {
            Some(broadcast) => self.broadcast(slot, broadcast),
            None => 0,
        }
    }

    /// User picked a row in `slot`; other slots are unaffected.
    pub fn user_set_row(&mut self, slot: usize, row: usize) {
        match self.slots.get_mut(slot) {
            Some(s) => s.set_row(row),
            None => tracing::warn!("Crosshair update for unknown slot {}", slot),
        }
    }

    /// User clicked a point in `slot`.
    pub fn user_click(&mut self, slot: usize, cursor: SlotCursor) -> usize {
        self.user_set_row(slot, cursor.row);
        self.user_set_column(slot, cursor.column)
    }

    fn broadcast(&mut self, origin: usize, broadcast: ColumnBroadcast) -> usize {
        self.broadcasts += 1;
        let mut updated = 0;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if i == origin {
                continue;
            }
            let mut guard = slot.begin_sync();
            let echo = guard.set_column(broadcast.column);
            debug_assert!(echo.is_none());
            updated += 1;
        }
        tracing::trace!("Column {} pushed from slot {} to {} slot(s)", broadcast.column, origin, updated);
        updated
    }
}

/// Value under a crosshair, with coordinates clamped into the part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readout {
    pub column: usize,
    pub row: usize,
    pub value: f32,
    pub channel_id: i64,
    pub time: f64,
}

/// Read the sample under `cursor`. Returns `None` for an empty part.
pub fn readout(part: &Part, cursor: SlotCursor) -> Option<Readout> {
    let (rows, cols) = part.shape();
    if rows == 0 || cols == 0 {
        return None;
    }
    let row = cursor.row.min(rows - 1);
    let column = cursor.column.min(cols - 1);
    Some(Readout {
        column,
        row,
        value: part.samples[[row, column]],
        channel_id: part.channel_ids[row],
        time: part.tick_info.time_at(column),
    })
}
