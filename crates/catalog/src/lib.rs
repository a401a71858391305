//! Catalog records (users, zones, tours and salidas).
//!
//! Plain data plus the create/patch rules each record follows. No IO, no
//! HTTP, no storage: the record store and the API layers build on these.

pub mod salida;
pub mod tour;
pub mod user;
pub mod zone;

pub use salida::{NewSalida, Salida};
pub use tour::{NewTour, Tour, TourPatch, ZoneRole};
pub use user::{Genre, NewUser, User, UserPatch};
pub use zone::{NewZone, Zone, ZonePatch, coordinate_errors};

/// Shared message for required text fields that were sent empty.
pub const BLANK_MESSAGE: &str = "This field may not be blank.";

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
