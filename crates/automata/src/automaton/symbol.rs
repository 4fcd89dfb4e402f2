//! Input symbols and the epsilon marker.

/// Dense index of an alphabet symbol. Symbols are interned in ascending
/// lexical order of their labels, like states.
pub type SymbolId = u32;

/// Id used for epsilon edges. It sorts after every alphabet symbol, so the
/// epsilon edges of a state come last in the transition map.
pub const EPSILON: SymbolId = SymbolId::MAX;

/// Epsilon as written in `(from, symbol, to)` triples.
pub const EPSILON_LABEL: &str = "";

#[inline]
pub fn is_epsilon(symbol: SymbolId) -> bool {
    symbol == EPSILON
}

#[inline]
pub fn is_epsilon_label(label: &str) -> bool {
    label.is_empty()
}
