// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A small entity model shared by the writer test suites.
//!
//! ```text
//! NS.Person { Name, Age, Friends: [NS.Person], BestFriend: NS.Person, Photos: [NS.Photo] }
//!   ├─ NS.Employee { Salary }
//!   └─ NS.Customer { Tier }
//! NS.Product (open) { Title }
//! NS.Photo (media link entry) { Caption }
//! ```

use std::sync::Arc;

use odata_edm::{EntityType, ModelError, SchemaModel};

/// The people/products schema.
pub fn people_schema() -> Result<SchemaModel, ModelError> {
    SchemaModel::builder()
        .entity_type(
            EntityType::new("NS.Person")
                .with_property("Name")
                .with_property("Age")
                .with_navigation("Friends", "NS.Person", true)
                .with_navigation("BestFriend", "NS.Person", false)
                .with_navigation("Photos", "NS.Photo", true),
        )
        .entity_type(
            EntityType::new("NS.Employee")
                .derived_from("NS.Person")
                .with_property("Salary"),
        )
        .entity_type(
            EntityType::new("NS.Customer")
                .derived_from("NS.Person")
                .with_property("Tier"),
        )
        .entity_type(EntityType::new("NS.Product").open().with_property("Title"))
        .entity_type(
            EntityType::new("NS.Photo")
                .with_stream()
                .with_property("Caption"),
        )
        .build()
}

/// [`people_schema`] behind an `Arc`, ready for `WriterSettings::with_model`.
///
/// # Panics
///
/// Never in practice: the schema is static and valid.
#[allow(clippy::expect_used)]
pub fn people_model() -> Arc<SchemaModel> {
    Arc::new(people_schema().expect("people schema is valid"))
}
