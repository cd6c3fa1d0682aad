//! Request validation for point creation.
//!
//! The client validates before submit; the server re-states the same rules
//! here and aggregates every failing field into one response instead of
//! stopping at the first.

use ecoponto_core::{Coordinates, Email, ItemId, Phone, Uf};
use serde::Serialize;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    /// Submitted field name (e.g. `email`).
    pub field: &'static str,
    /// Human-readable message for that field.
    pub message: String,
}

/// Aggregated validation failures across all fields of a request.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the failing fields, in submission order.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.field).collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = self.fields().join(", ");
        write!(f, "validation failed for: {fields}")
    }
}

/// Raw fields collected from a `POST /points` multipart body.
///
/// Everything arrives as text parts; the image part is carried separately
/// by the route handler.
#[derive(Debug, Clone, Default)]
pub struct PointForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub uf: Option<String>,
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub items: Option<String>,
}

/// A fully validated point submission.
#[derive(Debug, Clone)]
pub struct ValidatedPoint {
    pub name: String,
    pub email: Email,
    pub phone: Option<Phone>,
    pub uf: Uf,
    pub city: String,
    pub position: Coordinates,
    pub items: Vec<ItemId>,
}

/// Validate a submitted form, aggregating failures across all fields.
///
/// # Errors
///
/// Returns `ValidationErrors` listing every failing field. Validation
/// short-circuits per field but never across fields.
pub fn validate_point_form(form: &PointForm) -> Result<ValidatedPoint, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = match form.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(name.to_owned()),
        _ => {
            errors.push("name", "name is required");
            None
        }
    };

    let email = match form.email.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match Email::parse(raw) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push("email", e.to_string());
                None
            }
        },
        _ => {
            errors.push("email", "email is required");
            None
        }
    };

    // Phone is optional; validated leniently when present.
    let phone = match form.phone.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match Phone::parse(raw) {
            Ok(phone) => Some(phone),
            Err(e) => {
                errors.push("phone", e.to_string());
                None
            }
        },
    };

    let uf = match form.uf.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match Uf::parse(raw) {
            Ok(uf) => Some(uf),
            Err(e) => {
                errors.push("uf", e.to_string());
                None
            }
        },
        _ => {
            errors.push("uf", "uf is required");
            None
        }
    };

    let city = match form.city.as_deref().map(str::trim) {
        Some(city) if !city.is_empty() => Some(city.to_owned()),
        _ => {
            errors.push("city", "city is required");
            None
        }
    };

    let lat = parse_coordinate(form.lat.as_deref(), "lat", &mut errors);
    let lon = parse_coordinate(form.lon.as_deref(), "lon", &mut errors);
    let position = match (lat, lon) {
        (Some(lat), Some(lon)) => match Coordinates::new(lat, lon) {
            Ok(position) => Some(position),
            Err(e) => {
                errors.push("lat", e.to_string());
                None
            }
        },
        _ => None,
    };

    let items = parse_item_ids(form.items.as_deref(), &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    // All Options are Some once errors is empty.
    match (name, email, uf, city, position, items) {
        (Some(name), Some(email), Some(uf), Some(city), Some(position), Some(items)) => {
            Ok(ValidatedPoint {
                name,
                email,
                phone,
                uf,
                city,
                position,
                items,
            })
        }
        _ => {
            let mut errors = ValidationErrors::new();
            errors.push("form", "incomplete submission");
            Err(errors)
        }
    }
}

fn parse_coordinate(
    raw: Option<&str>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => match raw.parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                errors.push(field, format!("{field} must be a number"));
                None
            }
        },
        _ => {
            errors.push(field, format!("{field} is required"));
            None
        }
    }
}

/// Parse the `items` field: a non-empty comma-delimited list of integer ids.
fn parse_item_ids(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<Vec<ItemId>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        errors.push("items", "items is required");
        return None;
    };

    let mut ids = Vec::new();
    for part in raw.split(',') {
        match part.trim().parse::<i32>() {
            Ok(id) => ids.push(ItemId::new(id)),
            Err(_) => {
                errors.push("items", "items must be a comma-delimited list of integer ids");
                return None;
            }
        }
    }

    if ids.is_empty() {
        errors.push("items", "at least one item is required");
        return None;
    }

    Some(ids)
}
