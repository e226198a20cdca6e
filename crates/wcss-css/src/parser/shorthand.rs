//! Shorthand expansion.
//!
//! Values of a non-collatable shorthand may come in any order. Each value
//! goes to the first longhand, in declaration order, that is still
//! unassigned and accepts it. A nested collatable shorthand (the widths of
//! `border`) takes one value for all four sides.

use crate::properties::{Longhand, Shorthand};
use crate::selector::PropertyValues;

/// Assign one value of `shorthand`. Returns false when no longhand takes it.
pub fn add_shorthand_value(values: &mut PropertyValues, shorthand: Shorthand, value: &str) -> bool {
    if shorthand.is_collatable() {
        return add_to_all_sides(values, shorthand, value);
    }
    shorthand.longhands().iter().any(|longhand| match *longhand {
        Longhand::Property(property) => {
            !values.is_assigned(property) && values.add(property, value).is_ok()
        }
        Longhand::Shorthand(nested) => add_shorthand_value(values, nested, value),
    })
}

/// Set every side of a collatable shorthand to `value` if the first side
/// accepts it.
fn add_to_all_sides(values: &mut PropertyValues, shorthand: Shorthand, value: &str) -> bool {
    let mut longhands = shorthand.longhands().iter().filter_map(|longhand| match *longhand {
        Longhand::Property(property) => Some(property),
        Longhand::Shorthand(_) => None,
    });
    let Some(first) = longhands.next() else {
        return false;
    };
    if values.add(first, value).is_err() {
        return false;
    }
    for property in longhands {
        let _ = values.add(property, value);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Property;

    fn expand(shorthand: Shorthand, input: &str) -> PropertyValues {
        let mut values = PropertyValues::new();
        for value in input.split(' ') {
            let _ = add_shorthand_value(&mut values, shorthand, value);
        }
        values
    }

    #[test]
    fn test_border_in_any_order() {
        let values = expand(Shorthand::Border, "red dotted 2px");
        for property in [
            Property::BorderTopWidth,
            Property::BorderRightWidth,
            Property::BorderBottomWidth,
            Property::BorderLeftWidth,
        ] {
            assert_eq!(values.get(property), Some(2));
        }
        assert_eq!(values.get(Property::BorderLeftColor), Some(0xff0000));
        assert_eq!(values.get(Property::BorderBottomStyle), Some(2));
    }

    #[test]
    fn test_font_takes_first_free_slot() {
        let values = expand(Shorthand::Font, "italic bold 12px serif");
        assert_eq!(values.get(Property::FontStyle), Some(1));
        assert_eq!(values.get(Property::FontWeight), Some(1));
        assert_eq!(values.get(Property::FontSize), Some(12));
        assert_eq!(values.raw(Property::FontFamily), Some("serif"));
    }

    #[test]
    fn test_background_shorthand() {
        let values = expand(Shorthand::Background, "#fff url(bg.png) no-repeat");
        assert_eq!(values.get(Property::BackgroundColor), Some(0xffffff));
        assert_eq!(values.raw(Property::BackgroundImage), Some("url(bg.png)"));
        assert_eq!(values.get(Property::BackgroundRepeat), Some(3));
    }
}
