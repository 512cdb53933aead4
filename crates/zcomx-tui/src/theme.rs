use ratatui::style::Color;

/// Colors of the reader chrome
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub backdrop: Color,
    pub panel: Color,
    pub panel_alt: Color,

    // Text
    pub text: Color,
    pub muted: Color,

    // Controls
    pub page_number_fg: Color,
    pub page_number_bg: Color,
    /// Prev/next zone hints
    pub zone: Color,
    pub zone_disabled: Color,
    pub key: Color,

    // Messages
    pub error: Color,
    pub info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Dark backdrop so page edges stand out
        Self {
            backdrop: Color::Rgb(0x1d, 0x20, 0x21),
            panel: Color::Rgb(0x32, 0x30, 0x2f),
            panel_alt: Color::Rgb(0x45, 0x40, 0x3d),
            text: Color::Rgb(0xd4, 0xbe, 0x98),
            muted: Color::Rgb(0x92, 0x83, 0x74),
            page_number_fg: Color::Rgb(0x28, 0x28, 0x28),
            page_number_bg: Color::Rgb(0xd8, 0xa6, 0x57),
            zone: Color::Rgb(0x89, 0xb4, 0x82),
            zone_disabled: Color::Rgb(0x50, 0x49, 0x45),
            key: Color::Rgb(0x7d, 0xae, 0xa3),
            error: Color::Rgb(0xea, 0x69, 0x62),
            info: Color::Rgb(0xa9, 0xb6, 0x65),
        }
    }
}
