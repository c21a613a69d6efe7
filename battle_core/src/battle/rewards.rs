//! End-of-battle rewards and the persistent party record they land in

use crate::config::{LootEntry, RewardConstants};
use crate::types::ItemId;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One rolled loot drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootDrop {
    pub item: ItemId,
    pub quantity: u32,
}

/// Rewards of a finished battle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRewards {
    pub victory: bool,
    /// XP granted to each party member
    pub total_xp: u64,
    pub total_gold: u64,
    pub loot: Vec<LootDrop>,
}

impl BattleRewards {
    /// Rewards of a lost battle: nothing
    pub fn defeat() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> String {
        let loot = if self.loot.is_empty() {
            "None".to_string()
        } else {
            self.loot
                .iter()
                .map(|drop| format!("{}x {}", drop.quantity, drop.item))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "Battle ended - {}: XP {}, Gold {}, Loot {}",
            if self.victory { "Victory" } else { "Defeat" },
            self.total_xp,
            self.total_gold,
            loot
        )
    }
}

/// XP for defeating an enemy: `round((offset + level) ^ exponent)`
pub fn xp_for_level(level: u32, constants: &RewardConstants) -> u64 {
    (constants.level_offset + level as f64)
        .powf(constants.exponent)
        .round()
        .max(0.0) as u64
}

/// Gold for defeating an enemy; mirrors the XP formula
pub fn gold_for_level(level: u32, constants: &RewardConstants) -> u64 {
    xp_for_level(level, constants)
}

/// Roll each loot entry independently
///
/// An entry drops when a uniform draw in `[0, 1)` is at most
/// `numerator / denominator`; a zero denominator never drops.
pub fn roll_loot<R: Rng + ?Sized>(table: &[LootEntry], rng: &mut R) -> Vec<LootDrop> {
    table
        .iter()
        .filter(|entry| entry.denominator > 0)
        .filter(|entry| rng.gen::<f64>() <= entry.chance())
        .map(|entry| LootDrop {
            item: entry.item.clone(),
            quantity: entry.quantity,
        })
        .collect()
}

/// A party member in the save record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyMember {
    /// Entity template name
    pub name: String,
    pub level: u32,
    #[serde(default)]
    pub xp: u64,
}

impl PartyMember {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        PartyMember {
            name: name.into(),
            level,
            xp: 0,
        }
    }

    /// XP needed for the next level: 1000, doubling every 10 levels
    pub fn xp_to_next_level(&self) -> u64 {
        1000u64.saturating_mul(1u64 << (self.level / 10).min(52))
    }

    /// Fill fraction of the XP bar
    pub fn level_progress(&self) -> f64 {
        (self.xp as f64 / self.xp_to_next_level().max(1) as f64).clamp(0.0, 1.0)
    }
}

/// A stack of items in the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub item: ItemId,
    pub amount: u32,
}

/// Persistent party state a battle reads from and rewards into
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRecord {
    #[serde(default)]
    pub gold: u64,
    #[serde(default)]
    pub members: Vec<PartyMember>,
    #[serde(default)]
    pub inventory: Vec<InventoryEntry>,
}

impl PartyRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, name: impl Into<String>, level: u32) -> Self {
        self.members.push(PartyMember::new(name, level));
        self
    }

    pub fn with_item(mut self, item: impl Into<ItemId>, amount: u32) -> Self {
        self.give_item(item.into(), amount);
        self
    }

    pub fn item_count(&self, item: &ItemId) -> u32 {
        self.inventory
            .iter()
            .find(|entry| &entry.item == item)
            .map(|entry| entry.amount)
            .unwrap_or(0)
    }

    /// Add to an existing stack or start a new one
    pub fn give_item(&mut self, item: ItemId, amount: u32) {
        if amount == 0 {
            return;
        }
        match self.inventory.iter_mut().find(|entry| entry.item == item) {
            Some(entry) => entry.amount = entry.amount.saturating_add(amount),
            None => self.inventory.push(InventoryEntry { item, amount }),
        }
    }

    /// Remove `amount` of an item; false (and untouched) when short
    ///
    /// Emptied stacks are removed.
    pub fn consume_item(&mut self, item: &ItemId, amount: u32) -> bool {
        let Some(position) = self.inventory.iter().position(|entry| &entry.item == item) else {
            return false;
        };
        let entry = &mut self.inventory[position];
        if entry.amount < amount {
            return false;
        }
        entry.amount -= amount;
        if entry.amount == 0 {
            self.inventory.remove(position);
        }
        true
    }

    /// Credit rewards: XP to every member, gold, loot into the inventory
    pub fn apply_rewards(&mut self, rewards: &BattleRewards) {
        if !rewards.victory {
            return;
        }
        self.gold = self.gold.saturating_add(rewards.total_gold);
        for member in &mut self.members {
            member.xp = member.xp.saturating_add(rewards.total_xp);
        }
        for drop in &rewards.loot {
            self.give_item(drop.item.clone(), drop.quantity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn entry(numerator: u32, denominator: u32) -> LootEntry {
        LootEntry {
            item: ItemId::from("potion"),
            quantity: 2,
            numerator,
            denominator,
        }
    }

    #[test]
    fn test_xp_for_level_five() {
        // round(10 ^ 1.5) = round(31.62) = 32
        let constants = RewardConstants::default();
        assert_eq!(xp_for_level(5, &constants), 32);
        assert_eq!(gold_for_level(5, &constants), 32);
        // round(11 ^ 1.5) = round(36.48) = 36
        assert_eq!(xp_for_level(6, &constants), 36);
    }

    #[test]
    fn test_certain_and_impossible_drops() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            let drops = roll_loot(&[entry(1, 1), entry(1, 0), entry(0, 5)], &mut rng);
            assert_eq!(
                drops,
                vec![LootDrop {
                    item: ItemId::from("potion"),
                    quantity: 2
                }]
            );
        }
    }

    #[test]
    fn test_entries_roll_independently() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let table = [entry(1, 2), entry(1, 2)];
        let mut both = 0;
        for _ in 0..4000 {
            if roll_loot(&table, &mut rng).len() == 2 {
                both += 1;
            }
        }
        // Independent halves: both drop about a quarter of the time
        let share = both as f64 / 4000.0;
        assert!((share - 0.25).abs() < 0.03, "both dropped {}", share);
    }

    #[test]
    fn test_inventory_stacking_and_consumption() {
        let mut party = PartyRecord::new().with_item("potion", 1);
        party.give_item(ItemId::from("potion"), 2);
        assert_eq!(party.item_count(&ItemId::from("potion")), 3);

        assert!(!party.consume_item(&ItemId::from("potion"), 4));
        assert!(party.consume_item(&ItemId::from("potion"), 3));
        assert!(party.inventory.is_empty());
        assert!(!party.consume_item(&ItemId::from("ether"), 1));
    }

    #[test]
    fn test_apply_rewards() {
        let mut party = PartyRecord::new().with_member("Hero", 6).with_member("Rogue", 6);
        let rewards = BattleRewards {
            victory: true,
            total_xp: 64,
            total_gold: 64,
            loot: vec![LootDrop {
                item: ItemId::from("ether"),
                quantity: 1,
            }],
        };
        party.apply_rewards(&rewards);
        assert_eq!(party.gold, 64);
        assert!(party.members.iter().all(|m| m.xp == 64));
        assert_eq!(party.item_count(&ItemId::from("ether")), 1);

        party.apply_rewards(&BattleRewards::defeat());
        assert_eq!(party.gold, 64);
    }

    #[test]
    fn test_xp_curve() {
        let mut member = PartyMember::new("Hero", 6);
        assert_eq!(member.xp_to_next_level(), 1000);
        member.level = 25;
        assert_eq!(member.xp_to_next_level(), 4000);
        member.xp = 1000;
        assert!((member.level_progress() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary() {
        let rewards = BattleRewards {
            victory: true,
            total_xp: 32,
            total_gold: 32,
            loot: Vec::new(),
        };
        assert_eq!(rewards.summary(), "Battle ended - Victory: XP 32, Gold 32, Loot None");
    }
}
