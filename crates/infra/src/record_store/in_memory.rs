use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use tours_catalog::{
    NewSalida, NewTour, NewUser, NewZone, Salida, Tour, TourPatch, User, UserPatch, Zone,
    ZonePatch, ZoneRole,
};
use tours_core::{Entity, SalidaId, TourId, UserId, ZoneId};

use super::r#trait::{RecordStore, StoreError, StoreResult};

/// One collection of records keyed by id, with an auto-increment counter.
///
/// Ids are never reused, even after deletes.
#[derive(Debug)]
struct Table<T: Entity> {
    rows: BTreeMap<T::Id, T>,
    last_id: i64,
}

impl<T: Entity + Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }

    fn next_id(&mut self) -> T::Id {
        self.last_id += 1;
        T::Id::from(self.last_id)
    }

    fn insert(&mut self, row: T) -> T {
        self.rows.insert(row.id(), row.clone());
        row
    }

    fn get(&self, id: T::Id) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn list(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|r| pred(*r)).cloned().collect()
    }

    fn contains(&self, id: T::Id) -> bool {
        self.rows.contains_key(&id)
    }

    fn remove(&mut self, id: T::Id) -> bool {
        self.rows.remove(&id).is_some()
    }
}

#[derive(Debug)]
struct Tables {
    users: Table<User>,
    zones: Table<Zone>,
    tours: Table<Tour>,
    salidas: Table<Salida>,
}

impl Tables {
    fn check_zones(&self, zones: impl IntoIterator<Item = ZoneId>) -> StoreResult<()> {
        for zone in zones {
            if !self.zones.contains(zone) {
                return Err(StoreError::integrity(format!("zone {zone} does not exist")));
            }
        }
        Ok(())
    }

    fn remove_tour_cascade(&mut self, id: TourId) -> bool {
        if !self.tours.remove(id) {
            return false;
        }
        self.salidas.rows.retain(|_, s| s.tour != id);
        true
    }
}

/// In-memory record store for tests/dev.
///
/// Mirrors the relational semantics of the Postgres store: foreign keys are
/// checked on write and deletes cascade.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    inner: RwLock<Tables>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Tables {
                users: Table::new(),
                zones: Table::new(),
                tours: Table::new(),
                salidas: Table::new(),
            }),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> StoreResult<R> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&tables))
    }

    fn write<R>(&self, f: impl FnOnce(&mut Tables) -> StoreResult<R>) -> StoreResult<R> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        f(&mut tables)
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.read(|t| t.users.list())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.read(|t| t.users.get(id))
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        self.write(|t| {
            let id = t.users.next_id();
            Ok(t.users.insert(User::create(id, new)))
        })
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> StoreResult<Option<User>> {
        self.write(|t| {
            Ok(t.users.rows.get_mut(&id).map(|user| {
                user.apply(patch);
                user.clone()
            }))
        })
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        self.write(|t| Ok(t.users.remove(id)))
    }

    async fn list_zones(&self) -> StoreResult<Vec<Zone>> {
        self.read(|t| t.zones.list())
    }

    async fn get_zone(&self, id: ZoneId) -> StoreResult<Option<Zone>> {
        self.read(|t| t.zones.get(id))
    }

    async fn create_zone(&self, new: NewZone) -> StoreResult<Zone> {
        self.write(|t| {
            let id = t.zones.next_id();
            Ok(t.zones.insert(Zone::create(id, new)))
        })
    }

    async fn update_zone(&self, id: ZoneId, patch: &ZonePatch) -> StoreResult<Option<Zone>> {
        self.write(|t| {
            Ok(t.zones.rows.get_mut(&id).map(|zone| {
                zone.apply(patch);
                zone.clone()
            }))
        })
    }

    async fn delete_zone(&self, id: ZoneId) -> StoreResult<bool> {
        self.write(|t| {
            if !t.zones.remove(id) {
                return Ok(false);
            }
            let orphaned: Vec<TourId> = t
                .tours
                .filter(|tour| tour.references(id))
                .iter()
                .map(|tour| tour.id)
                .collect();
            for tour in orphaned {
                t.remove_tour_cascade(tour);
            }
            Ok(true)
        })
    }

    async fn list_tours(&self) -> StoreResult<Vec<Tour>> {
        self.read(|t| t.tours.list())
    }

    async fn get_tour(&self, id: TourId) -> StoreResult<Option<Tour>> {
        self.read(|t| t.tours.get(id))
    }

    async fn create_tour(&self, new: NewTour) -> StoreResult<Tour> {
        self.write(|t| {
            t.check_zones(new.zones())?;
            let id = t.tours.next_id();
            Ok(t.tours.insert(Tour::create(id, new)))
        })
    }

    async fn update_tour(&self, id: TourId, patch: &TourPatch) -> StoreResult<Option<Tour>> {
        self.write(|t| {
            if !t.tours.contains(id) {
                return Ok(None);
            }
            t.check_zones(patch.zones())?;
            Ok(t.tours.rows.get_mut(&id).map(|tour| {
                tour.apply(patch);
                tour.clone()
            }))
        })
    }

    async fn delete_tour(&self, id: TourId) -> StoreResult<bool> {
        self.write(|t| Ok(t.remove_tour_cascade(id)))
    }

    async fn tours_for_zone(&self, zone: ZoneId, role: ZoneRole) -> StoreResult<Vec<Tour>> {
        self.read(|t| t.tours.filter(|tour| tour.zone(role) == zone))
    }

    async fn list_salidas(&self) -> StoreResult<Vec<Salida>> {
        self.read(|t| t.salidas.list())
    }

    async fn salidas_for_tour(&self, tour: TourId) -> StoreResult<Vec<Salida>> {
        self.read(|t| t.salidas.filter(|s| s.tour == tour))
    }

    async fn create_salida(&self, new: NewSalida) -> StoreResult<Salida> {
        self.write(|t| {
            if !t.tours.contains(new.tour) {
                return Err(StoreError::integrity(format!("tour {} does not exist", new.tour)));
            }
            let id: SalidaId = t.salidas.next_id();
            Ok(t.salidas.insert(Salida::create(id, new)))
        })
    }
}
