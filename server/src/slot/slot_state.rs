/// Where a slot is in the admission handshake
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Free for the next connecting client
    Unused,
    /// A peer is connected but has not been accepted yet
    Unauthenticated,
    /// The peer passed authentication and may exchange user packets
    Active,
}
