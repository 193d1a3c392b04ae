//! Fixed color palettes for table coloring.
//!
//! Colors are assigned by position in the sorted node list, not by hashing
//! the table name, so assignment is stable for a run but tracks the active
//! sort mode.

pub const BRIGHT_COLORS_LIGHT: [&str; 20] = [
    "#E63946", "#F4A261", "#2A9D8F", "#264653", "#6A4C93",
    "#FFB703", "#3D405B", "#D62828", "#457B9D", "#A8DADC",
    "#1D3557", "#F9844A", "#43AA8B", "#9A031E", "#5F0F40",
    "#0F4C5C", "#F77F00", "#6D6875", "#2C7DA0", "#8ECAE6",
];

pub const BRIGHT_COLORS_DARK: [&str; 20] = [
    "#FF6B6B", "#FFD93D", "#6BCB77", "#4D96FF", "#F9C80E",
    "#FF9F1C", "#A9DEF9", "#E4C1F9", "#70D6FF", "#FF70A6",
    "#C0FDFB", "#F6F740", "#FFA69E", "#CBF3F0", "#D0F4DE",
    "#FEC8D8", "#FFDAC1", "#F5F5F5", "#FFFFFF", "#D9ED92",
];

/// Palette color for the node at `position` in the sorted node order.
pub fn color_at(position: usize, dark: bool) -> &'static str {
    let palette = if dark {
        &BRIGHT_COLORS_DARK
    } else {
        &BRIGHT_COLORS_LIGHT
    };
    palette[position % palette.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_assignment_wraps() {
        assert_eq!(color_at(0, false), BRIGHT_COLORS_LIGHT[0]);
        assert_eq!(color_at(20, false), BRIGHT_COLORS_LIGHT[0]);
        assert_eq!(color_at(3, true), BRIGHT_COLORS_DARK[3]);
    }
}
