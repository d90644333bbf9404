//! Per-entity column allow-lists.
//!
//! Every listing endpoint is described by one [`EntitySchema`]: which query
//! parameters it understands, the column each one targets, how the raw
//! string is typed, and which comparison it compiles to. The filter compiler
//! and the sort resolver never touch a column that is not listed here.

/// How a raw query-string value is parsed before it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Real,
    Uuid,
}

/// The comparison a filter parameter compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `col = ?`, or `col IN (...)` when the value is a comma-separated list.
    /// Text columns compare case-insensitively.
    Equals,
    /// `UPPER(col) LIKE UPPER(?)` with the value wrapped in `%`.
    Contains,
    /// `col >= ?`
    AtLeast,
    /// `col <= ?`
    AtMost,
    /// `(col <= ? OR col IS NULL)`, for columns left unset on new vehicles.
    AtMostOrUnset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Query parameter name as sent by the client (camelCase).
    pub param: &'static str,
    /// Column name in the store.
    pub column: &'static str,
    pub kind: ValueKind,
    pub comparison: Comparison,
}

impl FieldSpec {
    const fn new(
        param: &'static str,
        column: &'static str,
        kind: ValueKind,
        comparison: Comparison,
    ) -> Self {
        Self {
            param,
            column,
            kind,
            comparison,
        }
    }
}

/// A sortable column and the camelCase alias clients may send for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortableColumn {
    pub column: &'static str,
    pub alias: &'static str,
}

#[derive(Debug)]
pub struct EntitySchema {
    pub singular: &'static str,
    pub plural: &'static str,
    pub table: &'static str,
    /// Type-specific filters, checked after [`COMMON_FIELDS`].
    pub fields: &'static [FieldSpec],
    pub sortable: &'static [SortableColumn],
    /// Columns matched by the free-text `q` parameter.
    pub searchable: &'static [&'static str],
}

impl EntitySchema {
    /// All filterable fields in compile order: shared columns first.
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        COMMON_FIELDS.iter().chain(self.fields.iter())
    }

    #[must_use]
    pub fn field(&self, param: &str) -> Option<&FieldSpec> {
        self.all_fields().find(|field| field.param == param)
    }

    /// Resolve a client-supplied sort key (column or alias) to a column.
    #[must_use]
    pub fn sortable_column(&self, key: &str) -> Option<&'static str> {
        self.sortable
            .iter()
            .find(|sortable| sortable.column == key || sortable.alias == key)
            .map(|sortable| sortable.column)
    }
}

use Comparison::{AtLeast, AtMost, AtMostOrUnset, Contains, Equals};
use ValueKind::{Integer, Real, Text, Uuid};

/// Filters every vehicle table supports.
pub const COMMON_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("brand", "brand", Text, Equals),
    FieldSpec::new("model", "model", Text, Contains),
    FieldSpec::new("condition", "condition", Text, Equals),
    FieldSpec::new("country", "country", Text, Equals),
    FieldSpec::new("city", "city", Text, Equals),
    FieldSpec::new("userId", "user_id", Uuid, Equals),
    FieldSpec::new("minYear", "year", Integer, AtLeast),
    FieldSpec::new("maxYear", "year", Integer, AtMost),
    FieldSpec::new("minPrice", "price", Real, AtLeast),
    FieldSpec::new("maxPrice", "price", Real, AtMost),
    FieldSpec::new("maxMileage", "mileage", Integer, AtMostOrUnset),
];

pub const DEFAULT_SORT_COLUMN: &str = "created_at";

const SORTABLE: &[SortableColumn] = &[
    SortableColumn {
        column: "created_at",
        alias: "createdAt",
    },
    SortableColumn {
        column: "price",
        alias: "price",
    },
    SortableColumn {
        column: "year",
        alias: "year",
    },
    SortableColumn {
        column: "mileage",
        alias: "mileage",
    },
];

const SEARCHABLE: &[&str] = &["brand", "model", "description", "city"];

pub static TRUCKS: EntitySchema = EntitySchema {
    singular: "truck",
    plural: "trucks",
    table: "trucks",
    fields: &[
        FieldSpec::new("type", "truck_type", Text, Equals),
        FieldSpec::new("fuelType", "fuel_type", Text, Equals),
        FieldSpec::new("transmission", "transmission", Text, Equals),
        FieldSpec::new("minPayload", "payload_capacity", Integer, AtLeast),
        FieldSpec::new("axles", "axles", Integer, Equals),
    ],
    sortable: SORTABLE,
    searchable: SEARCHABLE,
};

pub static CARS: EntitySchema = EntitySchema {
    singular: "car",
    plural: "cars",
    table: "cars",
    fields: &[
        FieldSpec::new("bodyType", "body_type", Text, Equals),
        FieldSpec::new("fuelType", "fuel_type", Text, Equals),
        FieldSpec::new("transmission", "transmission", Text, Equals),
        FieldSpec::new("minDoors", "doors", Integer, AtLeast),
        FieldSpec::new("maxDoors", "doors", Integer, AtMost),
    ],
    sortable: SORTABLE,
    searchable: SEARCHABLE,
};

pub static MOTORCYCLES: EntitySchema = EntitySchema {
    singular: "motorcycle",
    plural: "motorcycles",
    table: "motorcycles",
    fields: &[
        FieldSpec::new("type", "motorcycle_type", Text, Equals),
        FieldSpec::new("minEngineSize", "engine_size", Integer, AtLeast),
        FieldSpec::new("maxEngineSize", "engine_size", Integer, AtMost),
        FieldSpec::new("cylinders", "cylinders", Integer, Equals),
    ],
    sortable: SORTABLE,
    searchable: SEARCHABLE,
};

pub static EBIKES: EntitySchema = EntitySchema {
    singular: "ebike",
    plural: "ebikes",
    table: "ebikes",
    fields: &[
        FieldSpec::new("type", "ebike_type", Text, Equals),
        FieldSpec::new("minMotorPower", "motor_power", Integer, AtLeast),
        FieldSpec::new("minBatteryCapacity", "battery_capacity", Integer, AtLeast),
        FieldSpec::new("minRange", "range_km", Integer, AtLeast),
    ],
    sortable: SORTABLE,
    searchable: SEARCHABLE,
};

pub static CARAVANS: EntitySchema = EntitySchema {
    singular: "caravan",
    plural: "caravans",
    table: "caravans",
    fields: &[
        FieldSpec::new("type", "caravan_type", Text, Equals),
        FieldSpec::new("minSleepingCapacity", "sleeping_capacity", Integer, AtLeast),
        FieldSpec::new("axles", "axles", Integer, Equals),
    ],
    sortable: SORTABLE,
    searchable: SEARCHABLE,
};
