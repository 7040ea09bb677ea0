/// Countdown readout, tenths of a second.
pub fn format_countdown(secs: f64) -> String {
    format!("{:.1}", secs.max(0.0))
}

/// Keyboard digit bound to hotspot `index` (first hotspot is '1').
/// None past '9'; a panel with more hotspots than digits keeps the rest
/// mouse-free but unbound.
pub fn hotspot_key(index: usize) -> Option<char> {
    if index < 9 {
        char::from_digit(index as u32 + 1, 10)
    } else {
        None
    }
}

/// Inverse of `hotspot_key`.
pub fn hotspot_index(key: char) -> Option<usize> {
    match key.to_digit(10) {
        Some(d) if d >= 1 => Some(d as usize - 1),
        _ => None,
    }
}
