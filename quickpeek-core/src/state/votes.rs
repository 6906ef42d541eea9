//! Feature-enable voting
//!
//! Quick-peek is enabled only while every voter wants it. The hardware
//! exchange follows the effective boolean, not individual votes.

/// Independent subsystems that vote on quick-peek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum VoterId {
    /// Display driver (panel off and in a peek-capable mode)
    Kernel = 0,
    /// User setting
    User = 1,
}

impl VoterId {
    /// All voters
    pub const ALL: [VoterId; 2] = [VoterId::Kernel, VoterId::User];

    /// Bit owned by this voter in the vote mask
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Mask with every voter's bit set
pub const FULL_ENABLE_MASK: u8 = VoterId::Kernel.bit() | VoterId::User.bit();

/// Ownership exchange triggered by a change of the effective value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Exchange {
    /// Hand peek framing to the host
    Handover,
    /// Reclaim the panel from peek framing
    Takeback,
}

/// Vote bookkeeping guarded by the vote lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteState {
    /// Voters currently wanting the feature
    vote_mask: u8,
    /// Mask for which the last exchange was performed
    resolved_mask: u8,
}

impl VoteState {
    pub const fn new() -> Self {
        Self {
            vote_mask: 0,
            resolved_mask: 0,
        }
    }

    /// Record a vote; takes effect on the next [`resolve`](Self::resolve)
    pub fn vote(&mut self, voter: VoterId, enable: bool) {
        if enable {
            self.vote_mask |= voter.bit();
        } else {
            self.vote_mask &= !voter.bit();
        }
    }

    /// Every voter currently wants the feature
    pub fn wants_enabled(&self) -> bool {
        self.vote_mask == FULL_ENABLE_MASK
    }

    /// The last exchange enabled the feature
    pub fn is_enabled(&self) -> bool {
        self.resolved_mask == FULL_ENABLE_MASK
    }

    pub fn vote_mask(&self) -> u8 {
        self.vote_mask
    }

    pub fn resolved_mask(&self) -> u8 {
        self.resolved_mask
    }

    /// Exchange the next [`resolve`](Self::resolve) would perform
    pub fn pending(&self) -> Option<Exchange> {
        match (self.wants_enabled(), self.is_enabled()) {
            (true, false) => Some(Exchange::Handover),
            (false, true) => Some(Exchange::Takeback),
            _ => None,
        }
    }

    /// Compare votes against the last resolution
    ///
    /// Returns the exchange to perform when the effective value flips,
    /// and records the new mask. Otherwise nothing changes.
    pub fn resolve(&mut self) -> Option<Exchange> {
        let exchange = self.pending()?;
        self.resolved_mask = self.vote_mask;
        Some(exchange)
    }
}
