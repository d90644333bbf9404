//! OpenAPI document for the listing API.
//!
//! Schemas come from the entity and payload types. The listing paths are
//! generic handlers, so they are added per vehicle kind by [`ListingPaths`]
//! instead of `#[utoipa::path]` annotations.

use utoipa::openapi::{
    ContentBuilder, ObjectBuilder, Ref, Required, ResponseBuilder,
    path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn},
    request_body::RequestBodyBuilder,
    schema::{ArrayBuilder, KnownFormat, SchemaFormat, Type},
    security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme},
};
use utoipa::{IntoParams, Modify, OpenApi};

use crate::entities::{ListingPatch, NewListing, caravan, car, ebike, motorcycle, truck};
use crate::errors::ErrorResponse;
use crate::models::{ListingQueryParams, VehicleKind};
use crate::routes::HealthStatus;

const BEARER: &str = "bearer_auth";

/// Component names of the record, create and update schemas for a kind.
fn schema_names(kind: VehicleKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        VehicleKind::Truck => ("Truck", "TruckCreate", "TruckUpdate"),
        VehicleKind::Car => ("Car", "CarCreate", "CarUpdate"),
        VehicleKind::Motorcycle => ("Motorcycle", "MotorcycleCreate", "MotorcycleUpdate"),
        VehicleKind::EBike => ("EBike", "EBikeCreate", "EBikeUpdate"),
        VehicleKind::Caravan => ("Caravan", "CaravanCreate", "CaravanUpdate"),
    }
}

fn json_response(description: &str, schema: Option<&str>) -> utoipa::openapi::Response {
    let builder = ResponseBuilder::new().description(description);
    match schema {
        Some(name) => builder
            .content(
                "application/json",
                ContentBuilder::new()
                    .schema(Some(Ref::from_schema_name(name)))
                    .build(),
            )
            .build(),
        None => builder.build(),
    }
}

fn error_response(description: &str) -> utoipa::openapi::Response {
    json_response(description, Some("ErrorResponse"))
}

fn list_envelope(record: &str) -> utoipa::openapi::Response {
    let envelope = ObjectBuilder::new()
        .property(
            "items",
            ArrayBuilder::new().items(Ref::from_schema_name(record)),
        )
        .required("items")
        .property(
            "total",
            ObjectBuilder::new()
                .schema_type(Type::Integer)
                .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int64))),
        )
        .required("total");
    ResponseBuilder::new()
        .description(format!("One page of {record} listings and the total match count"))
        .content(
            "application/json",
            ContentBuilder::new().schema(Some(envelope)).build(),
        )
        .build()
}

fn id_parameter() -> utoipa::openapi::path::Parameter {
    ParameterBuilder::new()
        .name("id")
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .schema(Some(
            ObjectBuilder::new()
                .schema_type(Type::String)
                .format(Some(SchemaFormat::KnownFormat(KnownFormat::Uuid))),
        ))
        .build()
}

fn json_body(schema: &str) -> utoipa::openapi::request_body::RequestBody {
    RequestBodyBuilder::new()
        .content(
            "application/json",
            ContentBuilder::new()
                .schema(Some(Ref::from_schema_name(schema)))
                .build(),
        )
        .required(Some(Required::True))
        .build()
}

/// Adds the collection and item paths of every vehicle kind.
struct ListingPaths;

impl Modify for ListingPaths {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        for kind in VehicleKind::ALL {
            let plural = kind.plural();
            let (record, create, update) = schema_names(kind);
            let collection = format!("/api/{plural}");
            let item = format!("{collection}/{{id}}");

            openapi.paths.add_path_operation(
                &collection,
                vec![HttpMethod::Get],
                OperationBuilder::new()
                    .tag(plural)
                    .summary(Some(format!("List {plural}")))
                    .description(Some(
                        "Unknown filter keys are ignored; empty values and `Any` mean no \
                         constraint. Non-numeric values for numeric filters return 422.",
                    ))
                    .parameters(Some(ListingQueryParams::into_params(|| {
                        Some(ParameterIn::Query)
                    })))
                    .response("200", list_envelope(record))
                    .response("422", error_response("Invalid filter or pagination value"))
                    .response("500", error_response("Database error")),
            );

            openapi.paths.add_path_operation(
                &collection,
                vec![HttpMethod::Post],
                OperationBuilder::new()
                    .tag(plural)
                    .summary(Some(format!("Create a {kind}")))
                    .request_body(Some(json_body(create)))
                    .security(SecurityRequirement::new(BEARER, Vec::<String>::new()))
                    .response("201", json_response("Created", Some(record)))
                    .response("401", error_response("Missing or invalid token"))
                    .response("403", error_response("Listing limit reached"))
                    .response("422", error_response("Invalid payload")),
            );

            openapi.paths.add_path_operation(
                &item,
                vec![HttpMethod::Get],
                OperationBuilder::new()
                    .tag(plural)
                    .summary(Some(format!("Get one {kind}")))
                    .parameter(id_parameter())
                    .response("200", json_response("The listing", Some(record)))
                    .response("404", error_response("Not found")),
            );

            openapi.paths.add_path_operation(
                &item,
                vec![HttpMethod::Put],
                OperationBuilder::new()
                    .tag(plural)
                    .summary(Some(format!("Update a {kind}")))
                    .parameter(id_parameter())
                    .request_body(Some(json_body(update)))
                    .security(SecurityRequirement::new(BEARER, Vec::<String>::new()))
                    .response("200", json_response("Updated", Some(record)))
                    .response("403", error_response("Not the owner"))
                    .response("404", error_response("Not found")),
            );

            openapi.paths.add_path_operation(
                &item,
                vec![HttpMethod::Delete],
                OperationBuilder::new()
                    .tag(plural)
                    .summary(Some(format!("Delete a {kind}")))
                    .parameter(id_parameter())
                    .security(SecurityRequirement::new(BEARER, Vec::<String>::new()))
                    .response("204", json_response("Deleted", None))
                    .response("403", error_response("Not the owner or an admin"))
                    .response("404", error_response("Not found")),
            );
        }

        openapi.paths.add_path_operation(
            "/health",
            vec![HttpMethod::Get],
            OperationBuilder::new()
                .tag("health")
                .summary(Some("Liveness and database ping"))
                .response("200", json_response("Healthy", Some("HealthStatus")))
                .response("503", json_response("Database unreachable", Some("HealthStatus"))),
        );
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            BEARER,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&ListingPaths, &SecurityAddon),
    info(
        title = "Vehicle marketplace API",
        description = "Filter, sort and paginate truck, car, motorcycle, e-bike and caravan listings."
    ),
    components(schemas(
        truck::Model, truck::TruckCreate, truck::TruckUpdate,
        car::Model, car::CarCreate, car::CarUpdate,
        motorcycle::Model, motorcycle::MotorcycleCreate, motorcycle::MotorcycleUpdate,
        ebike::Model, ebike::EBikeCreate, ebike::EBikeUpdate,
        caravan::Model, caravan::CaravanCreate, caravan::CaravanUpdate,
        NewListing, ListingPatch, ErrorResponse, HealthStatus
    )),
    tags(
        (name = "trucks"), (name = "cars"), (name = "motorcycles"),
        (name = "ebikes"), (name = "caravans"), (name = "health")
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn api_doc() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
