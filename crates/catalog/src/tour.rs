use serde::{Deserialize, Serialize};

use tours_core::{Entity, FieldErrors, TourId, ZoneId};

use crate::{BLANK_MESSAGE, is_blank};

/// Which end of a tour a zone sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneRole {
    /// The tour leaves from the zone (`tours_salida`).
    Departure,
    /// The tour ends at the zone (`tours_llegada`).
    Arrival,
}

/// A trip from a departure zone to an arrival zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    pub id: TourId,
    pub name: String,
    pub img: Option<String>,
    pub departure_zone: ZoneId,
    pub arrival_zone: ZoneId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTour {
    pub name: String,
    pub img: Option<String>,
    pub departure_zone: ZoneId,
    pub arrival_zone: ZoneId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TourPatch {
    pub name: Option<String>,
    pub img: Option<Option<String>>,
    pub departure_zone: Option<ZoneId>,
    pub arrival_zone: Option<ZoneId>,
}

impl NewTour {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if is_blank(&self.name) {
            errors.add("name", BLANK_MESSAGE);
        }
        errors
    }

    /// Zones this tour would reference, departure first.
    pub fn zones(&self) -> [ZoneId; 2] {
        [self.departure_zone, self.arrival_zone]
    }
}

impl TourPatch {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.as_deref().is_some_and(is_blank) {
            errors.add("name", BLANK_MESSAGE);
        }
        errors
    }

    /// Zone references the patch would introduce.
    pub fn zones(&self) -> impl Iterator<Item = ZoneId> {
        self.departure_zone.into_iter().chain(self.arrival_zone)
    }
}

impl Tour {
    pub fn create(id: TourId, new: NewTour) -> Self {
        Self {
            id,
            name: new.name,
            img: new.img,
            departure_zone: new.departure_zone,
            arrival_zone: new.arrival_zone,
        }
    }

    pub fn apply(&mut self, patch: &TourPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(img) = &patch.img {
            self.img = img.clone();
        }
        if let Some(zone) = patch.departure_zone {
            self.departure_zone = zone;
        }
        if let Some(zone) = patch.arrival_zone {
            self.arrival_zone = zone;
        }
    }

    pub fn zone(&self, role: ZoneRole) -> ZoneId {
        match role {
            ZoneRole::Departure => self.departure_zone,
            ZoneRole::Arrival => self.arrival_zone,
        }
    }

    pub fn references(&self, zone: ZoneId) -> bool {
        self.departure_zone == zone || self.arrival_zone == zone
    }
}

impl Entity for Tour {
    type Id = TourId;

    fn id(&self) -> TourId {
        self.id
    }
}
