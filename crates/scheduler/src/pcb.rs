//! Fixed-capacity process control block table.
//!
//! Slots are addressed through [`SlotIndex`], which can only be obtained for an
//! in-range index, so `occupy`/`release` never see an out-of-range slot.

use std::fmt;

use oss_core::VirtualClock;

/// Number of PCB slots. Also a hard cap on concurrently running workers.
pub const PCB_CAPACITY: usize = 20;

/// Opaque handle for a spawned task (the worker's process id in production).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(usize);

impl SlotIndex {
    pub fn new(index: usize) -> Option<Self> {
        (index < PCB_CAPACITY).then_some(Self(index))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pcb {
    occupied: bool,
    task_id: Option<TaskId>,
    start: VirtualClock,
}

impl Pcb {
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Scheduler clock at the moment the spawn was decided.
    pub fn start(&self) -> VirtualClock {
        self.start
    }
}

/// Scheduler-owned table of [`PCB_CAPACITY`] slots.
#[derive(Debug, Clone, Default)]
pub struct PcbTable {
    slots: [Pcb; PCB_CAPACITY],
}

impl PcbTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest-index unoccupied slot, or `None` when the table is full.
    pub fn find_free_slot(&self) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|pcb| !pcb.occupied)
            .map(SlotIndex)
    }

    pub fn find_by_task(&self, task: TaskId) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|pcb| pcb.occupied && pcb.task_id == Some(task))
            .map(SlotIndex)
    }

    pub fn occupy(&mut self, slot: SlotIndex, task: TaskId, start: VirtualClock) {
        let pcb = &mut self.slots[slot.0];
        debug_assert!(!pcb.occupied, "slot {} already occupied", slot.0);
        *pcb = Pcb {
            occupied: true,
            task_id: Some(task),
            start,
        };
    }

    /// Free a slot, returning the task that held it.
    pub fn release(&mut self, slot: SlotIndex) -> Option<TaskId> {
        let pcb = std::mem::take(&mut self.slots[slot.0]);
        pcb.task_id.filter(|_| pcb.occupied)
    }

    pub fn get(&self, slot: SlotIndex) -> &Pcb {
        &self.slots[slot.0]
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|pcb| pcb.occupied).count()
    }

    /// Occupied slots in index order, paired with their task.
    pub fn occupied(&self) -> impl Iterator<Item = (SlotIndex, TaskId)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, pcb)| {
            pcb.task_id
                .filter(|_| pcb.occupied)
                .map(|task| (SlotIndex(i), task))
        })
    }

    /// Copy of every slot, in index order, for status reporting.
    pub fn snapshot(&self) -> [Pcb; PCB_CAPACITY] {
        self.slots
    }
}
