//! PIN gate in front of the manager view.
//!
//! The gate is cosmetic: it keeps casual visitors out of create/update/delete screens and
//! offers no protection against anyone who can reach the store directly. Verification is
//! scoped to one gate instance and is dropped every time the gate is opened again.

/// Instance-scoped PIN check.
///
/// # Examples
///
/// ```
/// use dashcat::app::ManagerGate;
///
/// let mut gate = ManagerGate::new("2024");
/// gate.open();
/// assert!(!gate.verify("1111"));
/// assert!(gate.verify("2024"));
/// assert!(gate.is_unlocked());
/// ```
#[derive(Debug, Clone)]
pub struct ManagerGate {
    pin: String,
    unlocked: bool,
}

impl ManagerGate {
    pub fn new(pin: impl Into<String>) -> Self {
        Self {
            pin: pin.into(),
            unlocked: false,
        }
    }

    /// Shows the prompt. Any earlier verification is forgotten.
    pub fn open(&mut self) {
        self.unlocked = false;
    }

    /// Unlocks on an exact match and reports whether `attempt` matched.
    pub fn verify(&mut self, attempt: &str) -> bool {
        let matched = attempt == self.pin;
        if matched {
            self.unlocked = true;
            tracing::debug!("manager gate unlocked");
        } else {
            tracing::debug!("manager gate rejected pin");
        }
        matched
    }

    pub fn lock(&mut self) {
        self.unlocked = false;
    }

    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked
    }
}
