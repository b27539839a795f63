//! Bonding capacity per element symbol.

/// Capacity used for symbols missing from the table.
pub const DEFAULT_VALENCY: u8 = 1;

/// Maximum total bond order an atom of the given symbol may take part in.
///
/// Symbols outside the table, including compound symbols, bond once.
pub fn valency(symbol: &str) -> u8 {
    match symbol {
        "H" => 1,
        "C" => 4,
        "O" => 2,
        "N" => 3,
        "Na" => 1,
        "Cl" => 1,
        "S" => 2,
        "Mg" => 2,
        "Fe" => 2,
        _ => DEFAULT_VALENCY,
    }
}
