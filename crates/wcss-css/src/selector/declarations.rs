//! Property storage of one selector.

use std::collections::BTreeMap;

use crate::diagnostics::ErrorCode;
use crate::properties::{Property, ValueType};
use crate::values::{LengthUnit, PERCENT_TAG, convert_units, convert_units_or_percentage, parse_color};

/// `center` for a background position axis that was not given.
const CENTER: i32 = 50 + PERCENT_TAG;

/// The declared values of one selector.
///
/// Numeric values are stored by property index. Values with no numeric form
/// (font family, `url(...)`, content) are kept raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValues {
    nums: [Option<i32>; Property::COUNT],
    defaulted: [bool; Property::COUNT],
    raw: BTreeMap<Property, String>,
}

impl Default for PropertyValues {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyValues {
    /// No values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nums: [None; Property::COUNT],
            defaulted: [false; Property::COUNT],
            raw: BTreeMap::new(),
        }
    }

    /// The numeric value of `property`.
    #[must_use]
    pub const fn get(&self, property: Property) -> Option<i32> {
        self.nums[property.index()]
    }

    /// The raw string value of `property`.
    #[must_use]
    pub fn raw(&self, property: Property) -> Option<&str> {
        self.raw.get(&property).map(String::as_str)
    }

    /// True when the property was given explicitly. A background position
    /// axis filled in as `center` does not count.
    #[must_use]
    pub fn is_assigned(&self, property: Property) -> bool {
        (self.nums[property.index()].is_some() && !self.defaulted[property.index()])
            || self.raw.contains_key(&property)
    }

    /// True when nothing is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty() && self.nums.iter().all(Option::is_none)
    }

    /// Set a numeric value directly.
    pub const fn set(&mut self, property: Property, value: i32) {
        self.nums[property.index()] = Some(value);
        self.defaulted[property.index()] = false;
    }

    /// Set a raw value directly.
    pub fn set_raw(&mut self, property: Property, value: impl Into<String>) {
        let _ = self.raw.insert(property, value.into());
    }

    /// Iterate the raw values.
    pub fn raw_values(&self) -> impl Iterator<Item = (Property, &str)> {
        self.raw.iter().map(|(&p, v)| (p, v.as_str()))
    }

    /// Parse `value` by the property's value type and store it.
    ///
    /// Conversion is tried first, then the keyword table. A property with
    /// neither a typed value nor keywords keeps the raw text.
    pub fn add(&mut self, property: Property, value: &str) -> Result<(), ErrorCode> {
        let converted = match property.value_type() {
            ValueType::Color => parse_color(value).and_then(|c| i32::try_from(c).ok()),
            ValueType::Length => convert_units(value, LengthUnit::Px),
            ValueType::LengthOrPercentage => convert_units_or_percentage(value, LengthUnit::Px),
            ValueType::LengthOrPercentageOrMultiplier => {
                convert_units_or_percentage(value, LengthUnit::Em)
            }
            ValueType::Other => None,
        };

        let code = match converted {
            Some(code) => code,
            None => match property.keywords() {
                Some(keywords) => keywords
                    .lookup(value)
                    .ok_or(ErrorCode::AttributeValueInvalid)?,
                None if property.value_type() == ValueType::Other => {
                    self.set_raw(property, value);
                    return Ok(());
                }
                None => return Err(ErrorCode::AttributeValueInvalid),
            },
        };

        self.set(property, code);
        self.default_other_axis(property);
        Ok(())
    }

    /// Giving one background position axis centers the other.
    fn default_other_axis(&mut self, property: Property) {
        let other = match property {
            Property::BackgroundPositionX => Property::BackgroundPositionY,
            Property::BackgroundPositionY => Property::BackgroundPositionX,
            _ => return,
        };
        if !self.is_assigned(other) {
            self.nums[other.index()] = Some(CENTER);
            self.defaulted[other.index()] = true;
        }
    }

    /// Copy every value set here into `target`, overwriting.
    pub fn copy_into(&self, target: &mut Self) {
        for (index, value) in self.nums.iter().enumerate() {
            if let Some(value) = value {
                target.nums[index] = Some(*value);
                target.defaulted[index] = self.defaulted[index];
            }
        }
        for (property, value) in &self.raw {
            let _ = target.raw.insert(*property, value.clone());
        }
    }
}
