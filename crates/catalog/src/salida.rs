use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tours_core::{Entity, SalidaId, TourId};

/// A scheduled run of a tour. Read-only on every public surface; rows are
/// created by whoever operates the store (seeding, migrations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salida {
    pub id: SalidaId,
    pub tour: TourId,
    pub departs_on: NaiveDate,
    pub capacity: Option<i32>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSalida {
    pub tour: TourId,
    pub departs_on: NaiveDate,
    pub capacity: Option<i32>,
    pub price: Option<Decimal>,
}

impl Salida {
    pub fn create(id: SalidaId, new: NewSalida) -> Self {
        Self {
            id,
            tour: new.tour,
            departs_on: new.departs_on,
            capacity: new.capacity,
            price: new.price,
        }
    }
}

impl Entity for Salida {
    type Id = SalidaId;

    fn id(&self) -> SalidaId {
        self.id
    }
}
