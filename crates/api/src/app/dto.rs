//! REST request/response bodies and their mapping to catalog types.
//!
//! Request bodies keep every field as the raw JSON the client sent, so that
//! a missing, null or wrongly typed field is reported per field
//! (`{"genre": ["\"X\" is not a valid choice."]}`) instead of failing the
//! whole body. [`FieldReader`] does the conversion and collects the messages.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use tours_catalog::{
    Genre, NewTour, NewUser, NewZone, Tour, TourPatch, User, UserPatch, Zone, ZonePatch,
};
use tours_core::{DomainError, DomainResult, FieldErrors, TourId, UserId, ZoneId};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const NULL_MESSAGE: &str = "This field may not be null.";
pub const DATE_MESSAGE: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
pub const NUMBER_MESSAGE: &str = "A valid number is required.";
pub const STRING_MESSAGE: &str = "Not a valid string.";

/// Whether an update must carry every required field (`PUT`) or any subset
/// (`PATCH`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WriteMode {
    Full,
    Partial,
}

/// One request field as sent: left out, explicitly `null`, or a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field {
    #[default]
    Absent,
    Null,
    Value(Value),
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        Ok(match Option::<Value>::deserialize(de)? {
            None => Field::Null,
            Some(value) => Field::Value(value),
        })
    }
}

/// Converts raw fields, recording one message per failing field.
#[derive(Debug, Default)]
struct FieldReader {
    errors: FieldErrors,
}

impl FieldReader {
    /// Nullable field with patch semantics: `None` when absent (or invalid),
    /// `Some(None)` for an explicit null.
    fn optional<T>(
        &mut self,
        name: &str,
        field: Field,
        parse: impl FnOnce(Value) -> Result<T, String>,
    ) -> Option<Option<T>> {
        match field {
            Field::Absent => None,
            Field::Null => Some(None),
            Field::Value(value) => self.parsed(name, value, parse).map(Some),
        }
    }

    /// Non-nullable field that may be left out.
    fn non_null<T>(
        &mut self,
        name: &str,
        field: Field,
        parse: impl FnOnce(Value) -> Result<T, String>,
    ) -> Option<T> {
        match field {
            Field::Absent => None,
            Field::Null => {
                self.errors.add(name, NULL_MESSAGE);
                None
            }
            Field::Value(value) => self.parsed(name, value, parse),
        }
    }

    /// Non-nullable field that must be present.
    fn required<T>(
        &mut self,
        name: &str,
        field: Field,
        parse: impl FnOnce(Value) -> Result<T, String>,
    ) -> Option<T> {
        if matches!(field, Field::Absent) {
            self.errors.add(name, REQUIRED_MESSAGE);
            return None;
        }
        self.non_null(name, field, parse)
    }

    /// `required` under `PUT`, `non_null` under `PATCH`.
    fn for_mode<T>(
        &mut self,
        mode: WriteMode,
        name: &str,
        field: Field,
        parse: impl FnOnce(Value) -> Result<T, String>,
    ) -> Option<T> {
        match mode {
            WriteMode::Full => self.required(name, field, parse),
            WriteMode::Partial => self.non_null(name, field, parse),
        }
    }

    fn parsed<T>(
        &mut self,
        name: &str,
        value: Value,
        parse: impl FnOnce(Value) -> Result<T, String>,
    ) -> Option<T> {
        match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                self.errors.add(name, message);
                None
            }
        }
    }

    fn finish(self) -> DomainResult<()> {
        self.errors.into_result()
    }
}

fn text(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(STRING_MESSAGE.to_string()),
    }
}

fn date(value: Value) -> Result<NaiveDate, String> {
    value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .ok_or_else(|| DATE_MESSAGE.to_string())
}

fn genre(value: Value) -> Result<Genre, String> {
    let raw = match value {
        Value::String(s) => s,
        other => other.to_string(),
    };
    Genre::from_code(&raw).ok_or_else(|| format!("\"{raw}\" is not a valid choice."))
}

fn decimal(value: Value) -> Result<Decimal, String> {
    let parsed = match &value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        _ => None,
    };
    parsed.ok_or_else(|| NUMBER_MESSAGE.to_string())
}

fn zone_pk(value: Value) -> Result<ZoneId, String> {
    let kind = match &value {
        Value::Number(n) => match n.as_i64() {
            Some(id) => return Ok(ZoneId::new(id)),
            None => "float",
        },
        Value::String(_) => "str",
        Value::Bool(_) => "bool",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
        Value::Null => "null",
    };
    Err(format!("Incorrect type. Expected pk value, received {kind}."))
}

// ---------- Users ----------

#[derive(Debug, Default, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub name: Field,
    #[serde(default)]
    pub last_name: Field,
    #[serde(default)]
    pub email: Field,
    #[serde(default)]
    pub birthday: Field,
    #[serde(default)]
    pub genre: Field,
    #[serde(default)]
    pub key: Field,
    #[serde(default, rename = "type")]
    pub user_type: Field,
}

impl UserRequest {
    pub fn into_new(self) -> DomainResult<NewUser> {
        let mut reader = FieldReader::default();
        let name = reader.required("name", self.name, text);
        let last_name = reader.required("last_name", self.last_name, text);
        let email = reader.required("email", self.email, text);
        let birthday = reader.optional("birthday", self.birthday, date);
        let genre = reader.optional("genre", self.genre, genre);
        let key = reader.optional("key", self.key, text);
        let user_type = reader.optional("type", self.user_type, text);
        reader.finish()?;

        let (Some(name), Some(last_name), Some(email)) = (name, last_name, email) else {
            return Err(DomainError::field("name", REQUIRED_MESSAGE));
        };
        let new = NewUser {
            name,
            last_name,
            email,
            birthday: birthday.flatten(),
            genre: genre.flatten(),
            key: key.flatten(),
            user_type: user_type.flatten(),
        };
        new.validate().into_result()?;
        Ok(new)
    }

    pub fn into_patch(self, mode: WriteMode) -> DomainResult<UserPatch> {
        let mut reader = FieldReader::default();
        let patch = UserPatch {
            name: reader.for_mode(mode, "name", self.name, text),
            last_name: reader.for_mode(mode, "last_name", self.last_name, text),
            email: reader.for_mode(mode, "email", self.email, text),
            birthday: reader.optional("birthday", self.birthday, date),
            genre: reader.optional("genre", self.genre, genre),
            key: reader.optional("key", self.key, text),
            user_type: reader.optional("type", self.user_type, text),
        };
        reader.finish()?;
        patch.validate().into_result()?;
        Ok(patch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub genre: Option<Genre>,
    pub key: Option<String>,
    #[serde(rename = "type")]
    pub user_type: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            last_name: user.last_name,
            email: user.email,
            birthday: user.birthday,
            genre: user.genre,
            key: user.key,
            user_type: user.user_type,
        }
    }
}

// ---------- Zones ----------

#[derive(Debug, Default, Deserialize)]
pub struct ZoneRequest {
    #[serde(default)]
    pub name: Field,
    #[serde(default)]
    pub description: Field,
    #[serde(default)]
    pub latitud: Field,
    #[serde(default)]
    pub longitud: Field,
}

impl ZoneRequest {
    pub fn into_new(self) -> DomainResult<NewZone> {
        let mut reader = FieldReader::default();
        let name = reader.required("name", self.name, text);
        let description = reader.optional("description", self.description, text);
        let latitude = reader.optional("latitud", self.latitud, decimal);
        let longitude = reader.optional("longitud", self.longitud, decimal);
        reader.finish()?;

        let Some(name) = name else {
            return Err(DomainError::field("name", REQUIRED_MESSAGE));
        };
        let new = NewZone {
            name,
            description: description.flatten(),
            latitude: latitude.flatten(),
            longitude: longitude.flatten(),
        };
        new.validate().into_result()?;
        Ok(new)
    }

    pub fn into_patch(self, mode: WriteMode) -> DomainResult<ZonePatch> {
        let mut reader = FieldReader::default();
        let patch = ZonePatch {
            name: reader.for_mode(mode, "name", self.name, text),
            description: reader.optional("description", self.description, text),
            latitude: reader.optional("latitud", self.latitud, decimal),
            longitude: reader.optional("longitud", self.longitud, decimal),
        };
        reader.finish()?;
        patch.validate().into_result()?;
        Ok(patch)
    }
}

/// Zone projection with its departing and arriving tours nested read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneResponse {
    pub id: ZoneId,
    pub name: String,
    pub description: Option<String>,
    pub latitud: Option<Decimal>,
    pub longitud: Option<Decimal>,
    pub tours_salida: Vec<TourResponse>,
    pub tours_llegada: Vec<TourResponse>,
}

impl ZoneResponse {
    pub fn new(zone: Zone, departing: Vec<Tour>, arriving: Vec<Tour>) -> Self {
        Self {
            id: zone.id,
            name: zone.name,
            description: zone.description,
            latitud: zone.latitude,
            longitud: zone.longitude,
            tours_salida: departing.into_iter().map(TourResponse::from).collect(),
            tours_llegada: arriving.into_iter().map(TourResponse::from).collect(),
        }
    }

    /// Project `zone`, picking its tours out of an id-ordered tour list.
    pub fn from_tours(zone: Zone, tours: &[Tour]) -> Self {
        let departing = tours
            .iter()
            .filter(|t| t.departure_zone == zone.id)
            .cloned()
            .collect();
        let arriving = tours
            .iter()
            .filter(|t| t.arrival_zone == zone.id)
            .cloned()
            .collect();
        Self::new(zone, departing, arriving)
    }
}

// ---------- Tours ----------

#[derive(Debug, Default, Deserialize)]
pub struct TourRequest {
    #[serde(default)]
    pub name: Field,
    #[serde(default)]
    pub img: Field,
    #[serde(default, rename = "zonaSalida")]
    pub zona_salida: Field,
    #[serde(default, rename = "zonaLlegada")]
    pub zona_llegada: Field,
}

impl TourRequest {
    pub fn into_new(self) -> DomainResult<NewTour> {
        let mut reader = FieldReader::default();
        let name = reader.required("name", self.name, text);
        let img = reader.optional("img", self.img, text);
        let departure_zone = reader.required("zonaSalida", self.zona_salida, zone_pk);
        let arrival_zone = reader.required("zonaLlegada", self.zona_llegada, zone_pk);
        reader.finish()?;

        let (Some(name), Some(departure_zone), Some(arrival_zone)) =
            (name, departure_zone, arrival_zone)
        else {
            return Err(DomainError::field("name", REQUIRED_MESSAGE));
        };
        let new = NewTour {
            name,
            img: img.flatten(),
            departure_zone,
            arrival_zone,
        };
        new.validate().into_result()?;
        Ok(new)
    }

    pub fn into_patch(self, mode: WriteMode) -> DomainResult<TourPatch> {
        let mut reader = FieldReader::default();
        let patch = TourPatch {
            name: reader.for_mode(mode, "name", self.name, text),
            img: reader.optional("img", self.img, text),
            departure_zone: reader.for_mode(mode, "zonaSalida", self.zona_salida, zone_pk),
            arrival_zone: reader.for_mode(mode, "zonaLlegada", self.zona_llegada, zone_pk),
        };
        reader.finish()?;
        patch.validate().into_result()?;
        Ok(patch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TourResponse {
    pub id: TourId,
    pub name: String,
    pub img: Option<String>,
    #[serde(rename = "zonaSalida")]
    pub zona_salida: ZoneId,
    #[serde(rename = "zonaLlegada")]
    pub zona_llegada: ZoneId,
}

impl From<Tour> for TourResponse {
    fn from(tour: Tour) -> Self {
        Self {
            id: tour.id,
            name: tour.name,
            img: tour.img,
            zona_salida: tour.departure_zone,
            zona_llegada: tour.arrival_zone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn zone_request(body: serde_json::Value) -> ZoneRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn missing_name_is_reported_per_field() {
        let err = zone_request(json!({"description": "x"})).into_new().unwrap_err();
        let DomainError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.get("name"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
    }

    #[test]
    fn explicit_null_clears_but_absent_leaves_untouched() {
        let patch = zone_request(json!({"description": null}))
            .into_patch(WriteMode::Partial)
            .unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.latitude, None);
        assert_eq!(patch.name, None);
    }

    #[test]
    fn decimals_accept_strings_and_numbers() {
        let new = zone_request(json!({"name": "Cusco", "latitud": "-13.53195", "longitud": -71.96746}))
            .into_new()
            .unwrap();
        assert_eq!(new.latitude, Some("-13.53195".parse().unwrap()));
        assert_eq!(new.longitude, Some("-71.96746".parse().unwrap()));
    }

    #[test]
    fn full_update_requires_required_fields() {
        let req: TourRequest = serde_json::from_value(json!({"name": "Valle"})).unwrap();
        let DomainError::Validation(fields) = req.into_patch(WriteMode::Full).unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(fields.get("zonaSalida").is_some());
        assert!(fields.get("zonaLlegada").is_some());
        assert!(fields.get("name").is_none());
    }

    #[test]
    fn user_type_travels_under_the_type_key() {
        let req: UserRequest = serde_json::from_value(json!({
            "name": "Donald", "last_name": "Mac Pato", "email": "donald@pato.org",
            "birthday": "2000-01-01", "genre": "H", "type": "guia"
        }))
        .unwrap();
        let new = req.into_new().unwrap();
        assert_eq!(new.user_type.as_deref(), Some("guia"));
        assert_eq!(new.genre, Some(Genre::Hombre));

        let out = serde_json::to_value(UserResponse::from(User::create(UserId::new(1), new))).unwrap();
        assert_eq!(out["type"], "guia");
        assert_eq!(out["birthday"], "2000-01-01");
        assert_eq!(out["genre"], "H");
        assert!(out.get("user_type").is_none());
    }

    fn field_errors(err: DomainError) -> FieldErrors {
        match err {
            DomainError::Validation(fields) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn messages(fields: &FieldErrors, field: &str) -> Vec<String> {
        fields.get(field).unwrap_or_default().to_vec()
    }

    #[test]
    fn wrongly_typed_fields_are_reported_together() {
        let req: UserRequest = serde_json::from_value(json!({
            "name": "Donald", "last_name": "Mac Pato", "email": "donald@pato.org",
            "birthday": "01/01/2000", "genre": "X", "type": ["guia"]
        }))
        .unwrap();
        let fields = field_errors(req.into_new().unwrap_err());

        assert_eq!(messages(&fields, "birthday"), vec![DATE_MESSAGE]);
        assert_eq!(messages(&fields, "genre"), vec!["\"X\" is not a valid choice."]);
        assert_eq!(messages(&fields, "type"), vec![STRING_MESSAGE]);
        assert!(fields.get("name").is_none());
    }

    #[test]
    fn coordinates_must_be_numbers() {
        let fields = field_errors(
            zone_request(json!({"name": "Cusco", "latitud": "abc", "longitud": true}))
                .into_new()
                .unwrap_err(),
        );
        assert_eq!(messages(&fields, "latitud"), vec![NUMBER_MESSAGE]);
        assert_eq!(messages(&fields, "longitud"), vec![NUMBER_MESSAGE]);
    }

    #[test]
    fn null_is_rejected_on_non_nullable_fields() {
        for mode in [WriteMode::Full, WriteMode::Partial] {
            let fields = field_errors(
                zone_request(json!({"name": null})).into_patch(mode).unwrap_err(),
            );
            assert_eq!(messages(&fields, "name"), vec![NULL_MESSAGE]);
        }

        let fields = field_errors(zone_request(json!({"name": null})).into_new().unwrap_err());
        assert_eq!(messages(&fields, "name"), vec![NULL_MESSAGE]);

        let req: TourRequest = serde_json::from_value(json!({"zonaSalida": null})).unwrap();
        let fields = field_errors(req.into_patch(WriteMode::Partial).unwrap_err());
        assert_eq!(messages(&fields, "zonaSalida"), vec![NULL_MESSAGE]);
    }

    #[test]
    fn zone_references_must_be_integer_keys() {
        let req: TourRequest = serde_json::from_value(json!({
            "name": "Valle", "zonaSalida": "1", "zonaLlegada": 1.5
        }))
        .unwrap();
        let fields = field_errors(req.into_new().unwrap_err());
        assert_eq!(
            messages(&fields, "zonaSalida"),
            vec!["Incorrect type. Expected pk value, received str."]
        );
        assert_eq!(
            messages(&fields, "zonaLlegada"),
            vec!["Incorrect type. Expected pk value, received float."]
        );
    }

    #[test]
    fn zone_projection_nests_tours_by_role() {
        let zone = Zone::create(ZoneId::new(1), NewZone::named("Lima"));
        let tour = |id, from, to| Tour {
            id: TourId::new(id),
            name: format!("t{id}"),
            img: None,
            departure_zone: ZoneId::new(from),
            arrival_zone: ZoneId::new(to),
        };
        let tours = vec![tour(1, 1, 2), tour(2, 2, 1), tour(3, 1, 1), tour(4, 2, 3)];

        let out = ZoneResponse::from_tours(zone, &tours);
        let ids = |v: &[TourResponse]| v.iter().map(|t| t.id.get()).collect::<Vec<_>>();
        assert_eq!(ids(&out.tours_salida), vec![1, 3]);
        assert_eq!(ids(&out.tours_llegada), vec![2, 3]);
    }
}
