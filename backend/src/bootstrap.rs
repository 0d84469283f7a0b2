//! Startup wiring for record handlers and the services built on them.
//!
//! Every handler is initialised against one shared [`DocumentStore`]; index
//! creation failures abort startup.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{CollectionError, DocumentStore, define_port_error};
use crate::domain::{
    BasicPartyAdministrator, Claims, Client, ClientValidator, Company, CompanyAdministrator,
    CompanyValidator, ContextualiseFilter, Entity, IndexSpec, Reading, RecordHandler, System,
    User, Zx303, Zx303Administrator, Zx303Validator, contextualise_owned_or_assigned,
    contextualise_party_children, contextualise_party_members, contextualise_party_self,
};

define_port_error! {
    /// Errors raised while wiring the record core.
    pub enum BootstrapError {
        /// A collection's indexes could not be ensured.
        Initialise { collection: String, message: String } =>
            "initialising {collection} records failed: {message}",
    }
}

/// Party lookup over the system, company and client handlers.
pub type PartyLookup =
    BasicPartyAdministrator<RecordHandler<System>, RecordHandler<Company>, RecordHandler<Client>>;

/// Company use-cases wired to their record handler and validator.
pub type Companies = CompanyAdministrator<
    RecordHandler<Company>,
    CompanyValidator<RecordHandler<Company>, RecordHandler<User>>,
>;

/// Client rules wired to their record handlers and party lookup.
pub type Clients = ClientValidator<RecordHandler<Client>, RecordHandler<User>, PartyLookup>;

/// Tracker use-cases wired to their record handler and validator.
pub type Trackers = Zx303Administrator<RecordHandler<Zx303>, Zx303Validator<PartyLookup>>;

async fn handler<E: Entity>(
    store: &Arc<dyn DocumentStore>,
    contextualise: ContextualiseFilter,
    indexes: &[IndexSpec],
) -> Result<Arc<RecordHandler<E>>, BootstrapError> {
    let handler = RecordHandler::<E>::initialise(Arc::clone(store), contextualise, indexes)
        .await
        .map_err(|err: CollectionError| BootstrapError::initialise(E::COLLECTION, err.to_string()))?;
    info!(collection = E::COLLECTION, indexes = indexes.len(), "record handler ready");
    Ok(Arc::new(handler))
}

/// One record handler per persisted entity.
#[derive(Clone)]
pub struct RecordHandlers {
    /// System party records.
    pub system: Arc<RecordHandler<System>>,
    /// Company records.
    pub company: Arc<RecordHandler<Company>>,
    /// Client records.
    pub client: Arc<RecordHandler<Client>>,
    /// User records.
    pub user: Arc<RecordHandler<User>>,
    /// ZX303 tracker records.
    pub zx303: Arc<RecordHandler<Zx303>>,
    /// Device readings.
    pub reading: Arc<RecordHandler<Reading>>,
}

impl RecordHandlers {
    /// Initialise every handler, creating its unique indexes.
    pub async fn initialise(store: Arc<dyn DocumentStore>) -> Result<Self, BootstrapError> {
        Ok(Self {
            system: handler(&store, contextualise_party_self, &System::unique_indexes()).await?,
            company: handler(&store, contextualise_party_self, &Company::unique_indexes()).await?,
            client: handler(&store, contextualise_party_children, &Client::unique_indexes())
                .await?,
            user: handler(&store, contextualise_party_members, &User::unique_indexes()).await?,
            zx303: handler(&store, contextualise_owned_or_assigned, &Zx303::unique_indexes())
                .await?,
            reading: handler(&store, contextualise_owned_or_assigned, &[]).await?,
        })
    }
}

/// Record handlers plus the validating services layered over them.
pub struct Services {
    /// Initialised record handlers.
    pub records: RecordHandlers,
    /// Party lookup shared by the validators.
    pub parties: Arc<PartyLookup>,
    /// Company use-cases.
    pub companies: Companies,
    /// Client validation.
    pub clients: Arc<Clients>,
    /// Tracker use-cases.
    pub trackers: Trackers,
}

impl Services {
    /// Wire validators and administrators over initialised handlers.
    ///
    /// `system_claims` scopes cross-tenant uniqueness lookups.
    pub fn new(records: RecordHandlers, system_claims: Claims) -> Self {
        let parties = Arc::new(BasicPartyAdministrator::new(
            Arc::clone(&records.system),
            Arc::clone(&records.company),
            Arc::clone(&records.client),
        ));
        let companies = CompanyAdministrator::new(
            Arc::clone(&records.company),
            Arc::new(CompanyValidator::new(
                Arc::clone(&records.company),
                Arc::clone(&records.user),
                system_claims.clone(),
            )),
        );
        let clients = Arc::new(ClientValidator::new(
            Arc::clone(&records.client),
            Arc::clone(&records.user),
            Arc::clone(&parties),
            system_claims,
        ));
        let trackers = Zx303Administrator::new(
            Arc::clone(&records.zx303),
            Arc::new(Zx303Validator::new(Arc::clone(&parties))),
        );
        Self {
            records,
            parties,
            companies,
            clients,
            trackers,
        }
    }

    /// Initialise handlers on `store` and wire the services.
    pub async fn bootstrap(
        store: Arc<dyn DocumentStore>,
        system_claims: Claims,
    ) -> Result<Self, BootstrapError> {
        let records = RecordHandlers::initialise(store).await?;
        Ok(Self::new(records, system_claims))
    }
}
