//! Weighted loot tables used to fill dungeon chests.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A stack of identical items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: String,
    pub count: u32,
}

/// One weighted entry of a loot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item: String,
    pub weight: u32,
    #[serde(default = "default_count")]
    pub min_count: u32,
    #[serde(default = "default_count")]
    pub max_count: u32,
}

fn default_count() -> u32 {
    1
}

/// A loot table: between `min_rolls` and `max_rolls` weighted draws, inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    pub min_rolls: u32,
    pub max_rolls: u32,
    pub entries: Vec<LootEntry>,
}

impl LootTable {
    /// Rolls the table. An empty or zero-weight table yields nothing.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ItemStack> {
        let Ok(index) = WeightedIndex::new(self.entries.iter().map(|entry| entry.weight)) else {
            return Vec::new();
        };

        let rolls = rng.gen_range(self.min_rolls..=self.max_rolls.max(self.min_rolls));
        (0..rolls)
            .map(|_| {
                let entry = &self.entries[index.sample(rng)];
                let count = rng.gen_range(entry.min_count..=entry.max_count.max(entry.min_count));
                ItemStack {
                    item: entry.item.clone(),
                    count,
                }
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_rolls > self.max_rolls {
            return Err("loot min_rolls must not exceed max_rolls".to_string());
        }
        for entry in &self.entries {
            if entry.min_count == 0 || entry.min_count > entry.max_count {
                return Err(format!(
                    "loot entry {} needs 1 <= min_count <= max_count",
                    entry.item
                ));
            }
        }
        Ok(())
    }
}

fn entry(item: &str, weight: u32, min_count: u32, max_count: u32) -> LootEntry {
    LootEntry {
        item: item.to_string(),
        weight,
        min_count,
        max_count,
    }
}

impl Default for LootTable {
    fn default() -> Self {
        Self {
            min_rolls: 2,
            max_rolls: 5,
            entries: vec![
                entry("aether:skyroot_stick", 30, 2, 8),
                entry("aether:ambrosium_shard", 25, 1, 4),
                entry("aether:zanite_gemstone", 20, 1, 3),
                entry("aether:golden_amber", 12, 1, 2),
                entry("aether:gravitite_ore", 8, 1, 1),
                entry("aether:valkyrie_lance", 1, 1, 1),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rolls_stay_within_table_bounds() {
        let table = LootTable::default();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let loot = table.roll(&mut rng);
            assert!(loot.len() >= 2 && loot.len() <= 5);
            for stack in loot {
                let entry = table.entries.iter().find(|e| e.item == stack.item).unwrap();
                assert!(stack.count >= entry.min_count && stack.count <= entry.max_count);
            }
        }
    }

    #[test]
    fn test_zero_weight_entries_are_never_drawn() {
        let table = LootTable {
            min_rolls: 3,
            max_rolls: 3,
            entries: vec![entry("aether:ambrosium_shard", 0, 1, 1), entry("aether:zanite_gemstone", 5, 1, 1)],
        };
        let mut rng = StdRng::seed_from_u64(2);
        for stack in table.roll(&mut rng) {
            assert_eq!(stack.item, "aether:zanite_gemstone");
        }
    }

    #[test]
    fn test_empty_table_yields_nothing() {
        let table = LootTable {
            min_rolls: 1,
            max_rolls: 4,
            entries: Vec::new(),
        };
        let mut rng = StdRng::seed_from_u64(2);
        assert!(table.roll(&mut rng).is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(LootTable::default().validate().is_ok());
        let mut table = LootTable::default();
        table.min_rolls = 9;
        assert!(table.validate().is_err());
        let mut table = LootTable::default();
        table.entries[0].min_count = 0;
        assert!(table.validate().is_err());
    }
}
