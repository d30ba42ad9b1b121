//! Navigation badge state machine.
//!
//! The "answer questions" slot in the navigation is an actionable link
//! while unanswered questions remain and an inert label once the count
//! hits zero. The swap is structural (the rendered element changes role)
//! but keeps the slot's identity: same position, same visible label, and
//! the destination survives on the inert side as metadata so it can come
//! back. Counts that move without crossing zero update the number only;
//! no swap.

/// Rendered role of the badge slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeRole {
    /// Actionable link to the answer view.
    Active,
    /// Non-interactive label carrying the destination as inert metadata.
    Inert,
}

impl BadgeRole {
    fn for_count(count: u32) -> Self {
        if count > 0 {
            BadgeRole::Active
        } else {
            BadgeRole::Inert
        }
    }
}

/// Instruction to the rendering layer to rebuild the slot in a new role.
/// Label and destination are carried along so the swap preserves them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeSwap {
    pub role: BadgeRole,
    pub label: String,
    pub destination: String,
}

/// One navigation badge slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavBadge {
    role: BadgeRole,
    label: String,
    destination: String,
    count: u32,
}

impl NavBadge {
    pub fn new(label: impl Into<String>, destination: impl Into<String>, count: u32) -> Self {
        Self {
            role: BadgeRole::for_count(count),
            label: label.into(),
            destination: destination.into(),
            count,
        }
    }

    /// Feed the badge a new count. Returns a swap instruction only when
    /// the count crossed the zero boundary; every other change is just a
    /// number update.
    pub fn observe(&mut self, count: u32) -> Option<BadgeSwap> {
        self.count = count;
        let wanted = BadgeRole::for_count(count);
        if wanted == self.role {
            return None;
        }
        self.role = wanted;
        Some(BadgeSwap {
            role: wanted,
            label: self.label.clone(),
            destination: self.destination.clone(),
        })
    }

    pub fn role(&self) -> BadgeRole {
        self.role
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}
