use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tours_core::{Entity, FieldErrors, ZoneId};

use crate::{BLANK_MESSAGE, is_blank};

/// Coordinates are stored as `NUMERIC(9,6)`: at most 6 decimal places and 3
/// integer digits.
pub const COORDINATE_DECIMAL_PLACES: u32 = 6;
pub const COORDINATE_INTEGER_DIGITS: u32 = 3;

/// A named point of interest with optional coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub description: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
}

/// Input for creating a zone. Only `name` is required; every other
/// attribute starts out absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewZone {
    pub name: String,
    pub description: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
}

/// Partial update for a zone.
///
/// The outer `Option` on each field means "supplied or not": `None` leaves
/// the stored value untouched. For nullable attributes the inner `Option`
/// carries the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ZonePatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub latitude: Option<Option<Decimal>>,
    pub longitude: Option<Option<Decimal>>,
}

impl NewZone {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Field checks applied by the REST surface. The GraphQL mutation only
    /// applies [`coordinate_errors`].
    pub fn validate(&self) -> FieldErrors {
        let mut errors = coordinate_errors(self.latitude, self.longitude);
        if is_blank(&self.name) {
            errors.add("name", BLANK_MESSAGE);
        }
        errors
    }
}

impl ZonePatch {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = coordinate_errors(self.latitude.flatten(), self.longitude.flatten());
        if self.name.as_deref().is_some_and(is_blank) {
            errors.add("name", BLANK_MESSAGE);
        }
        errors
    }
}

/// Precision checks for a coordinate pair, keyed `latitud`/`longitud`.
///
/// Trailing zeros do not count towards the decimal places, so every value
/// that passes is stored without rounding.
pub fn coordinate_errors(latitude: Option<Decimal>, longitude: Option<Decimal>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (field, value) in [("latitud", latitude), ("longitud", longitude)] {
        let Some(value) = value.map(|v| v.normalize()) else {
            continue;
        };
        if value.scale() > COORDINATE_DECIMAL_PLACES {
            errors.add(
                field,
                format!(
                    "Ensure that there are no more than {COORDINATE_DECIMAL_PLACES} decimal places."
                ),
            );
        }
        if value.abs().trunc() >= Decimal::ONE_THOUSAND {
            errors.add(
                field,
                format!(
                    "Ensure that there are no more than {COORDINATE_INTEGER_DIGITS} digits before the decimal point."
                ),
            );
        }
    }
    errors
}

impl Zone {
    pub fn create(id: ZoneId, new: NewZone) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            latitude: new.latitude,
            longitude: new.longitude,
        }
    }

    /// Overwrite only the attributes the patch supplies.
    pub fn apply(&mut self, patch: &ZonePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(latitude) = patch.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            self.longitude = longitude;
        }
    }
}

impl Entity for Zone {
    type Id = ZoneId;

    fn id(&self) -> ZoneId {
        self.id
    }
}
