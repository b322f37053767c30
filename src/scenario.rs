//! Scenario fixtures for tests that create data in the service.
//!
//! A [`Scenario`] owns the admin client and tracks every owner it
//! creates, so that an explicit [`Scenario::teardown`] can delete them
//! again in reverse order of creation. Each test builds its own fixture;
//! there is no shared global state between tests.

use std::collections::HashMap;

use log::warn;
use rand::Rng;

use crate::api::{
    Consumer, ConsumerType, Content, NewContent, Owner, Product,
};
use crate::client::CandlepinApi;
use crate::TestkitResult;

/// Returns `prefix-<n>` with a random number, for unique object names.
pub fn random_string(prefix: &str) -> String {
    format!("{}-{}", prefix, rand::rng().random_range(0..100_000))
}

/// Product ids must be numeric, the service OID-encodes them.
fn random_numeric_id() -> String {
    format!("{}", rand::rng().random_range(0..100_000))
}

//------------ Scenario ------------------------------------------------------

/// A test fixture around an admin client, with resource tracking.
pub struct Scenario<C> {
    admin: C,
    owners: Vec<Owner>,
    products: Vec<Product>,
}

impl<C: CandlepinApi> Scenario<C> {
    pub fn new(admin: C) -> Self {
        Scenario {
            admin,
            owners: Vec::new(),
            products: Vec::new(),
        }
    }

    pub fn admin(&self) -> &C {
        &self.admin
    }

    /// The owners created so far, in creation order.
    pub fn owners(&self) -> &[Owner] {
        &self.owners
    }

    /// The products created so far. Products are tracked separately
    /// because deleting an owner does not remove them.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Creates an owner and tracks it for teardown.
    pub fn create_owner(&mut self, name: &str) -> TestkitResult<Owner> {
        self.create_owner_under(name, None)
    }

    /// Creates an owner under a parent owner and tracks it for teardown.
    pub fn create_owner_under(
        &mut self,
        name: &str,
        parent: Option<&Owner>,
    ) -> TestkitResult<Owner> {
        let owner = self.admin.create_owner(name, parent)?;
        self.owners.push(owner.clone());
        Ok(owner)
    }

    /// Creates a product. When `id` or `name` is not given, a random
    /// value is generated; generated ids are numeric.
    pub fn create_product(
        &mut self,
        id: Option<&str>,
        name: Option<&str>,
        attributes: &HashMap<String, String>,
    ) -> TestkitResult<Product> {
        let id = match id {
            Some(id) => id.to_string(),
            None => random_numeric_id(),
        };
        let name = match name {
            Some(name) => name.to_string(),
            None => random_string("testproduct"),
        };
        let product = self.admin.create_product(&id, &name, attributes)?;
        self.products.push(product.clone());
        Ok(product)
    }

    /// Creates a content record of type `yum` with random identifiers.
    pub fn create_content(
        &mut self,
        modified_products: &[&Product],
    ) -> TestkitResult<Content> {
        let random = random_numeric_id();
        self.admin.create_content(&NewContent {
            id: random.clone(),
            name: random.clone(),
            label: random.clone(),
            content_type: "yum".to_string(),
            vendor: random.clone(),
            content_url: format!("/content/{}", random),
            gpg_url: format!("/gpg/{}", random),
            modified_product_ids: modified_products
                .iter()
                .map(|p| p.id.clone())
                .collect(),
        })
    }

    /// Creates a user under the owner and connects as that user.
    pub fn user_client(
        &self,
        owner: &Owner,
        username: &str,
    ) -> TestkitResult<C> {
        self.admin.create_user(&owner.key, username, "password")?;
        self.admin.connect_basic(username, "password")
    }

    /// Registers a consumer through `client` and connects with the
    /// consumer's identity certificate.
    pub fn consumer_client(
        &self,
        client: &C,
        name: &str,
        consumer_type: ConsumerType,
        username: Option<&str>,
        facts: &HashMap<String, String>,
    ) -> TestkitResult<(Consumer, C)> {
        let consumer =
            client.register(name, consumer_type, username, facts)?;
        let connected = client.connect_client_cert(&consumer.id_cert)?;
        Ok((consumer, connected))
    }

    /// Connects as a consumer through the trusted header identity.
    pub fn trusted_consumer_client(&self, uuid: &str) -> TestkitResult<C> {
        self.admin.connect_trusted_consumer(uuid)
    }

    /// Deletes every tracked owner, most recent first. A failed
    /// deletion is logged and does not stop the remaining deletions;
    /// the first failure is reported once all owners were attempted.
    pub fn teardown(&mut self) -> TestkitResult<()> {
        let mut first_err = None;
        while let Some(owner) = self.owners.pop() {
            if let Err(e) = self.admin.delete_owner(&owner.key) {
                warn!("could not delete owner '{}': {}", owner.key, e);
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

//------------ Tests ---------------------------------------------------------
