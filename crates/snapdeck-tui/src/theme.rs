use ratatui::style::Color;

/// Runtime color palette
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds, darkest first
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    pub fg0: Color,
    pub fg1: Color,
    pub grey1: Color,
    pub grey2: Color,

    pub yellow: Color,
    pub green: Color,
    pub aqua: Color,
    pub purple: Color,

    pub accent: Color,
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Material dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            fg1: Color::Rgb(0xdd, 0xc7, 0xa1),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            yellow: Color::Rgb(0xd8, 0xa6, 0x57),
            green: Color::Rgb(0xa9, 0xb6, 0x65),
            aqua: Color::Rgb(0x89, 0xb4, 0x82),
            purple: Color::Rgb(0xd3, 0x86, 0x9b),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
        }
    }
}

impl Theme {
    /// Background between `bg0` (0.0) and `bg2` (1.0)
    pub fn backdrop(&self, shade: f64) -> Color {
        mix(self.bg0, self.bg2, shade)
    }
}

/// Blend two RGB colors; non-RGB colors snap to the nearer end
pub fn mix(from: Color, to: Color, t: f64) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    match (from, to) {
        (Color::Rgb(r0, g0, b0), Color::Rgb(r1, g1, b1)) => {
            let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
            Color::Rgb(channel(r0, r1), channel(g0, g1), channel(b0, b1))
        }
        _ if t < 0.5 => from,
        _ => to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_endpoints() {
        let theme = Theme::default();
        assert_eq!(theme.backdrop(0.0), theme.bg0);
        assert_eq!(theme.backdrop(1.0), theme.bg2);
        assert_eq!(mix(Color::Rgb(0, 0, 0), Color::Rgb(100, 200, 50), 0.5), Color::Rgb(50, 100, 25));
        assert_eq!(mix(Color::Red, Color::Blue, 0.7), Color::Blue);
    }
}
