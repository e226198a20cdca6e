//! Color values: `#rgb`, `#rrggbb`, bare hex, `rgb(r,g,b)` and names.

/// The WCSS basic color names.
const BASIC_COLORS: &[(&str, u32)] = &[
    ("aqua", 0x00FFFF),
    ("black", 0x000000),
    ("blue", 0x0000FF),
    ("fuchsia", 0xFF00FF),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("lime", 0x00FF00),
    ("maroon", 0x800000),
    ("navy", 0x000080),
    ("olive", 0x808000),
    ("purple", 0x800080),
    ("red", 0xFF0000),
    ("silver", 0xC0C0C0),
    ("teal", 0x008080),
    ("white", 0xFFFFFF),
    ("yellow", 0xFFFF00),
    ("orange", 0xFFA500),
    ("grey", 0x808080),
];

/// The HTML4 extended color names, available with CSS2.
const EXTENDED_COLORS: &[(&str, u32)] = &[
    ("aliceblue", 0xF0F8FF),
    ("antiquewhite", 0xFAEBD7),
    ("aqua", 0x00FFFF),
    ("aquamarine", 0x7FFFD4),
    ("azure", 0xF0FFFF),
    ("beige", 0xF5F5DC),
    ("bisque", 0xFFE4C4),
    ("black", 0x000000),
    ("blanchedalmond", 0xFFEBCD),
    ("blue", 0x0000FF),
    ("blueviolet", 0x8A2BE2),
    ("brown", 0xA52A2A),
    ("burlywood", 0xDEB887),
    ("cadetblue", 0x5F9EA0),
    ("chartreuse", 0x7FFF00),
    ("chocolate", 0xD2691E),
    ("coral", 0xFF7F50),
    ("cornflowerblue", 0x6495ED),
    ("cornsilk", 0xFFF8DC),
    ("crimson", 0xDC143C),
    ("cyan", 0x00FFFF),
    ("darkblue", 0x00008B),
    ("darkcyan", 0x008B8B),
    ("darkgoldenrod", 0xB8860B),
    ("darkgray", 0xA9A9A9),
    ("darkgrey", 0xA9A9A9),
    ("darkgreen", 0x006400),
    ("darkkhaki", 0xBDB76B),
    ("darkmagenta", 0x8B008B),
    ("darkolivegreen", 0x556B2F),
    ("darkorange", 0xFF8C00),
    ("darkorchid", 0x9932CC),
    ("darkred", 0x8B0000),
    ("darksalmon", 0xE9967A),
    ("darkseagreen", 0x8FBC8F),
    ("darkslateblue", 0x483D8B),
    ("darkslategray", 0x2F4F4F),
    ("darkslategrey", 0x2F4F4F),
    ("darkturquoise", 0x00CED1),
    ("darkviolet", 0x9400D3),
    ("deeppink", 0xFF1493),
    ("deepskyblue", 0x00BFFF),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1E90FF),
    ("firebrick", 0xB22222),
    ("floralwhite", 0xFFFAF0),
    ("forestgreen", 0x228B22),
    ("fuchsia", 0xFF00FF),
    ("gainsboro", 0xDCDCDC),
    ("ghostwhite", 0xF8F8FF),
    ("gold", 0xFFD700),
    ("goldenrod", 0xDAA520),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xADFF2F),
    ("honeydew", 0xF0FFF0),
    ("hotpink", 0xFF69B4),
    ("indianred", 0xCD5C5C),
    ("indigo", 0x4B0082),
    ("ivory", 0xFFFFF0),
    ("khaki", 0xF0E68C),
    ("lavender", 0xE6E6FA),
    ("lavenderblush", 0xFFF0F5),
    ("lawngreen", 0x7CFC00),
    ("lemonchiffon", 0xFFFACD),
    ("lightblue", 0xADD8E6),
    ("lightcoral", 0xF08080),
    ("lightcyan", 0xE0FFFF),
    ("lightgoldenrodyellow", 0xFAFAD2),
    ("lightgray", 0xD3D3D3),
    ("lightgrey", 0xD3D3D3),
    ("lightgreen", 0x90EE90),
    ("lightpink", 0xFFB6C1),
    ("lightsalmon", 0xFFA07A),
    ("lightseagreen", 0x20B2AA),
    ("lightskyblue", 0x87CEFA),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xB0C4DE),
    ("lightyellow", 0xFFFFE0),
    ("lime", 0x00FF00),
    ("limegreen", 0x32CD32),
    ("linen", 0xFAF0E6),
    ("magenta", 0xFF00FF),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66CDAA),
    ("mediumblue", 0x0000CD),
    ("mediumorchid", 0xBA55D3),
    ("mediumpurple", 0x9370D8),
    ("mediumseagreen", 0x3CB371),
    ("mediumslateblue", 0x7B68EE),
    ("mediumspringgreen", 0x00FA9A),
    ("mediumturquoise", 0x48D1CC),
    ("mediumvioletred", 0xC71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xF5FFFA),
    ("mistyrose", 0xFFE4E1),
    ("moccasin", 0xFFE4B5),
    ("navajowhite", 0xFFDEAD),
    ("navy", 0x000080),
    ("oldlace", 0xFDF5E6),
    ("olive", 0x808000),
    ("olivedrab", 0x6B8E23),
    ("orange", 0xFFA500),
    ("orangered", 0xFF4500),
    ("orchid", 0xDA70D6),
    ("palegoldenrod", 0xEEE8AA),
    ("palegreen", 0x98FB98),
    ("paleturquoise", 0xAFEEEE),
    ("palevioletred", 0xD87093),
    ("papayawhip", 0xFFEFD5),
    ("peachpuff", 0xFFDAB9),
    ("peru", 0xCD853F),
    ("pink", 0xFFC0CB),
    ("plum", 0xDDA0DD),
    ("powderblue", 0xB0E0E6),
    ("purple", 0x800080),
    ("red", 0xFF0000),
    ("rosybrown", 0xBC8F8F),
    ("royalblue", 0x4169E1),
    ("saddlebrown", 0x8B4513),
    ("salmon", 0xFA8072),
    ("sandybrown", 0xF4A460),
    ("seagreen", 0x2E8B57),
    ("seashell", 0xFFF5EE),
    ("sienna", 0xA0522D),
    ("silver", 0xC0C0C0),
    ("skyblue", 0x87CEEB),
    ("slateblue", 0x6A5ACD),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xFFFAFA),
    ("springgreen", 0x00FF7F),
    ("steelblue", 0x4682B4),
    ("tan", 0xD2B48C),
    ("teal", 0x008080),
    ("thistle", 0xD8BFD8),
    ("tomato", 0xFF6347),
    ("turquoise", 0x40E0D0),
    ("violet", 0xEE82EE),
    ("wheat", 0xF5DEB3),
    ("white", 0xFFFFFF),
    ("whitesmoke", 0xF5F5F5),
    ("yellow", 0xFFFF00),
    ("yellowgreen", 0x9ACD32),
];

/// Parse a color to a 24-bit RGB value.
#[must_use]
pub fn parse_color(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }
    let hex = match text.strip_prefix('#') {
        Some(hex) => hex,
        None => {
            if text.get(..4).is_some_and(|prefix| prefix.eq_ignore_ascii_case("rgb(")) {
                return parse_rgb(&text[4..]);
            }
            if let Some(value) = named_color(text) {
                return Some(value);
            }
            text
        }
    };
    parse_hex(hex)
}

fn named_color(name: &str) -> Option<u32> {
    let extended: &[(&str, u32)] = if crate::CSS2 { EXTENDED_COLORS } else { &[] };
    BASIC_COLORS
        .iter()
        .chain(extended)
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|&(_, value)| value)
}

/// Three digit colors double every digit.
fn parse_hex(hex: &str) -> Option<u32> {
    if hex.is_empty() || hex.len() > 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    if hex.len() == 3 {
        let doubled: String = hex.chars().flat_map(|c| [c, c]).collect();
        return u32::from_str_radix(&doubled, 16).ok();
    }
    u32::from_str_radix(hex, 16).ok()
}

/// `r,g,b)` with each channel an integer, `N%` or `Npx`, clamped to 0..=255.
/// A channel that does not parse counts as 255.
fn parse_rgb(mut rest: &str) -> Option<u32> {
    let mut color = 0;
    for terminator in [',', ',', ')'] {
        let (channel, tail) = rest.split_once(terminator)?;
        color = (color << 8) | channel_value(channel.trim());
        rest = tail;
    }
    Some(color)
}

fn channel_value(channel: &str) -> u32 {
    let (number, percent) = match channel.strip_suffix('%') {
        Some(number) => (number, true),
        None => (channel.strip_suffix("px").unwrap_or(channel), false),
    };
    let Ok(value) = number.parse::<i64>() else {
        return 255;
    };
    let value = if percent { 255 * value / 100 } else { value };
    u32::try_from(value.clamp(0, 255)).unwrap_or(255)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_color("#ff0000"), Some(0xFF0000));
        assert_eq!(parse_color("#0f0"), Some(0x00FF00));
        assert_eq!(parse_color("00ff00"), Some(0x00FF00));
        assert_eq!(parse_color("#12345678"), None);
        assert_eq!(parse_color("#xyz"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn test_names_are_case_insensitive() {
        assert_eq!(parse_color("Red"), Some(0xFF0000));
        assert_eq!(parse_color("GREY"), Some(0x808080));
    }

    #[cfg(feature = "css2")]
    #[test]
    fn test_extended_names() {
        assert_eq!(parse_color("IndianRed"), Some(0xCD5C5C));
        assert_eq!(parse_color("yellowgreen"), Some(0x9ACD32));
    }

    #[test]
    fn test_rgb_function() {
        assert_eq!(parse_color("rgb(255,0,0)"), Some(0xFF0000));
        assert_eq!(parse_color("rgb(100%, 0%, 50%)"), Some(0xFF007F));
        assert_eq!(parse_color("rgb(300,-4,16px)"), Some(0xFF0010));
        assert_eq!(parse_color("rgb(1,2)"), None);
        assert_eq!(parse_color("RGB(1,2,3)"), Some(0x010203));
        assert_eq!(parse_color("Rgb(255, 0, 0)"), Some(0xFF0000));
    }
}
