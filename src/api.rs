//! Typed records for the service API.
//!
//! The service talks JSON with camelCase attribute names. Every field the
//! helpers consume is an explicit typed field here; there is no generic
//! attribute fallback on loosely typed records.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::TestkitResult;

//------------ Owner ---------------------------------------------------------

/// A tenant in the entitlement service.
///
/// Deleting an owner cascades to most objects created beneath it, which
/// is why scenario teardown only needs to track owners.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: String,
    pub key: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_owner: Option<OwnerRef>,
}

//------------ OwnerRef ------------------------------------------------------

/// A reference to an owner by id and key.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OwnerRef {
    pub id: String,
    pub key: String,
}

impl From<&Owner> for OwnerRef {
    fn from(owner: &Owner) -> Self {
        OwnerRef {
            id: owner.id.clone(),
            key: owner.key.clone(),
        }
    }
}

//------------ Product -------------------------------------------------------

/// A product, with its service-side attributes.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

//------------ Content -------------------------------------------------------

/// A content record.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub vendor: String,
    pub content_url: String,
    pub gpg_url: String,
    #[serde(default)]
    pub modified_product_ids: Vec<String>,
}

//------------ NewContent ----------------------------------------------------

/// The request body for creating a content record.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContent {
    pub id: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub vendor: String,
    pub content_url: String,
    pub gpg_url: String,
    #[serde(default)]
    pub modified_product_ids: Vec<String>,
}

//------------ User ----------------------------------------------------------

/// A user account under an owner.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub username: String,
}

//------------ IdCert --------------------------------------------------------

/// A consumer identity certificate with its private key.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IdCert {
    pub cert: String,
    pub key: String,
}

//------------ ConsumerType --------------------------------------------------

/// The kind of consumer being registered.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ConsumerType {
    #[default]
    System,
    Person,
    Candlepin,
}

impl fmt::Display for ConsumerType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConsumerType::System => f.write_str("system"),
            ConsumerType::Person => f.write_str("person"),
            ConsumerType::Candlepin => f.write_str("candlepin"),
        }
    }
}

//------------ Consumer ------------------------------------------------------

/// A registered consumer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumer {
    pub uuid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub consumer_type: ConsumerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub facts: HashMap<String, String>,
    pub id_cert: IdCert,
}

//------------ Subscription --------------------------------------------------

/// A subscription under an owner.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub product_id: String,
    pub quantity: u32,
    pub contract_number: String,
    pub account_number: String,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub provided_product_ids: Vec<String>,
}

//------------ NewSubscription -----------------------------------------------

/// The request body for creating a subscription.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub product_id: String,
    pub quantity: u32,
    pub contract_number: String,
    pub account_number: String,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub provided_product_ids: Vec<String>,
}

impl NewSubscription {
    pub fn new(
        product_id: &str,
        quantity: u32,
        end_date: NaiveDate,
    ) -> Self {
        NewSubscription {
            product_id: product_id.to_string(),
            quantity,
            contract_number: String::new(),
            account_number: String::new(),
            end_date,
            provided_product_ids: Vec::new(),
        }
    }
}

//------------ Pool ----------------------------------------------------------

/// An allocation of entitlement quantity derived from a subscription.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: String,
    pub owner_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub end_date: NaiveDate,
}

//------------ EntitlementCert -----------------------------------------------

/// An entitlement certificate as downloaded from the service.
///
/// `cert` holds the PEM payload. `flex_expiry_days` is the grace period
/// the service granted on top of the contractual end date; the
/// certificate's own expiry includes it, the order end date recorded in
/// the certificate does not.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementCert {
    pub id: String,
    pub cert: String,
    pub flex_expiry_days: u32,
}

//------------ HATEOAS check -------------------------------------------------

/// Checks that a JSON value is a HATEOAS reference: an object carrying
/// exactly an `href` and an `id`.
pub fn check_for_hateoas(json: &serde_json::Value) -> TestkitResult<()> {
    let fields = json
        .as_object()
        .ok_or_else(|| Error::HateoasViolation(json.to_string()))?;
    if fields.len() != 2
        || !fields.contains_key("href")
        || !fields.contains_key("id")
    {
        return Err(Error::HateoasViolation(json.to_string()));
    }
    Ok(())
}

//------------ Tests ---------------------------------------------------------
