//! Output formatting for CLI

use crate::{
    envs::{Cell, GridWorld, Move},
    ports::Environment,
    q_learning::{ValueTable, policy},
    types::StateId,
};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, String)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

/// Greedy move per cell as arrows; walls, traps, and the treasure keep
/// their map glyphs.
///
/// `table` must have been trained on `world` (row-major cells, [`Move::ALL`]
/// columns).
pub fn policy_arrows(world: &GridWorld, table: &ValueTable) -> String {
    let map = world.map();
    let mut out = String::new();
    for (index, coord) in world.states().into_iter().enumerate() {
        let glyph = match map.cell(coord) {
            Cell::Wall => '-',
            Cell::Trap => 'X',
            Cell::Treasure => '#',
            Cell::Path => {
                let best = policy::choose_optimal(table, StateId::new(index));
                Move::ALL[best.index()].arrow()
            }
        };
        out.push(glyph);
        if coord.1 + 1 == map.size() {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        envs::{GridConfig, GridMap},
        types::ActionId,
    };

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(200_000), "200,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_policy_arrows() {
        use Cell::*;
        let map = GridMap::new(2, vec![Path, Wall, Path, Treasure]).unwrap();
        let world = GridWorld::new(map, GridConfig::default()).unwrap();
        let mut table = ValueTable::zeros(4, 4);
        // (0, 0): Down; (1, 0): Right
        table.set(StateId::new(0), ActionId::new(1), 1.0);
        table.set(StateId::new(2), ActionId::new(0), 1.0);
        assert_eq!(policy_arrows(&world, &table), "↓-\n→#\n");
    }
}
