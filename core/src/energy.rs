use serde::{Deserialize, Serialize};

/// Bounded resource earned from merges and spent on abilities.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyLedger {
    energy: u32,
    max: u32,
}

impl EnergyLedger {
    pub const fn new(max: u32) -> Self {
        Self { energy: 0, max }
    }

    pub const fn value(&self) -> u32 {
        self.energy
    }

    pub const fn max(&self) -> u32 {
        self.max
    }

    pub fn gain(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount).min(self.max);
    }

    pub const fn can_afford(&self, cost: u32) -> bool {
        self.energy >= cost
    }

    /// Deducts `cost` only when it is affordable.
    pub fn spend(&mut self, cost: u32) -> bool {
        if self.can_afford(cost) {
            self.energy -= cost;
            true
        } else {
            false
        }
    }

    pub fn restore(&mut self, energy: u32) {
        self.energy = energy.min(self.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_is_capped() {
        let mut ledger = EnergyLedger::new(100);
        ledger.gain(60);
        ledger.gain(60);
        assert_eq!(ledger.value(), 100);
        ledger.gain(u32::MAX);
        assert_eq!(ledger.value(), 100);
    }

    #[test]
    fn spend_requires_enough_energy() {
        let mut ledger = EnergyLedger::new(100);
        ledger.gain(30);

        assert!(!ledger.spend(50));
        assert_eq!(ledger.value(), 30);
        assert!(ledger.spend(20));
        assert_eq!(ledger.value(), 10);
        assert!(ledger.spend(10));
        assert_eq!(ledger.value(), 0);
        assert!(ledger.spend(0));
    }

    #[test]
    fn stays_in_bounds_under_any_sequence() {
        let mut ledger = EnergyLedger::new(100);
        for step in 0..200u32 {
            if step % 3 == 0 {
                ledger.spend(step % 70);
            } else {
                ledger.gain(step % 13);
            }
            assert!(ledger.value() <= ledger.max());
        }
        ledger.restore(250);
        assert_eq!(ledger.value(), 100);
    }
}
