mod client_slot;
pub use client_slot::ClientSlot;

mod slot_state;
pub use slot_state::SlotState;
