use async_trait::async_trait;
use rocketstore::domain::{Customer, CustomerFilter, CustomerPage, CustomerSummary, PageRequest, normalize_email};
use rocketstore::ports::{CustomerRepository, RepositoryError};
use sled::transaction::{ConflictableTransactionError, TransactionError, Transactional};
use sled::{Db, Tree};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

const CUSTOMERS_TREE: &str = "customers";
const CUSTOMERS_BY_EMAIL_TREE: &str = "customers_by_email";

fn storage(err: sled::Error) -> RepositoryError {
    RepositoryError::Storage(err.to_string())
}

fn serialization(err: serde_json::Error) -> RepositoryError {
    RepositoryError::Serialization(err.to_string())
}

fn transaction(err: TransactionError<RepositoryError>) -> RepositoryError {
    match err {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => storage(e),
    }
}

/// Customer store persisted with sled.
///
/// Records live in the `customers` tree keyed by id bytes, so iteration
/// yields them in id order. `customers_by_email` maps the normalized email to
/// the id; both trees are updated in one transaction.
#[derive(Clone)]
pub struct SledCustomerRepository {
    db: Db,
}

impl SledCustomerRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let db = sled::open(path.as_ref()).map_err(storage)?;
        info!("Opened customer store at {}", path.as_ref().display());
        Ok(Self { db })
    }

    fn customers_tree(&self) -> Result<Tree, RepositoryError> {
        self.db.open_tree(CUSTOMERS_TREE).map_err(storage)
    }

    fn customers_by_email_tree(&self) -> Result<Tree, RepositoryError> {
        self.db.open_tree(CUSTOMERS_BY_EMAIL_TREE).map_err(storage)
    }

    pub async fn flush(&self) -> Result<(), RepositoryError> {
        self.db.flush_async().await.map_err(storage)?;
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for SledCustomerRepository {
    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let customers_tree = self.customers_tree()?;
        let email_tree = self.customers_by_email_tree()?;

        let customer_json = serde_json::to_vec(&customer).map_err(serialization)?;
        let email = normalize_email(&customer.email);

        (&customers_tree, &email_tree)
            .transaction(|(customers, emails)| {
                if emails.get(email.as_bytes())?.is_some() {
                    return Err(ConflictableTransactionError::Abort(
                        RepositoryError::DuplicateEmail(customer.email.clone()),
                    ));
                }
                customers.insert(customer.id.as_bytes().as_slice(), customer_json.as_slice())?;
                emails.insert(email.as_bytes(), customer.id.as_bytes().as_slice())?;
                Ok(())
            })
            .map_err(transaction)?;

        Ok(customer)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, RepositoryError> {
        let customers_tree = self.customers_tree()?;

        match customers_tree.get(id.as_bytes().as_slice()).map_err(storage)? {
            Some(data) => Ok(Some(serde_json::from_slice(&data).map_err(serialization)?)),
            None => Ok(None),
        }
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        let email_tree = self.customers_by_email_tree()?;
        email_tree
            .contains_key(normalize_email(email).as_bytes())
            .map_err(storage)
    }

    async fn list(
        &self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<CustomerPage, RepositoryError> {
        let customers_tree = self.customers_tree()?;
        let mut total_count = 0;
        let mut customers = Vec::new();

        for item in customers_tree.iter() {
            let (_, data) = item.map_err(storage)?;
            let customer: Customer = serde_json::from_slice(&data).map_err(serialization)?;
            if !filter.matches(&customer) {
                continue;
            }
            if total_count >= page.skip() && customers.len() < page.take() {
                customers.push(CustomerSummary::from(customer));
            }
            total_count += 1;
        }

        Ok(CustomerPage {
            customers,
            total_count,
            page_number: page.page_number,
            page_size: page.page_size,
        })
    }

    async fn remove(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let customers_tree = self.customers_tree()?;
        let email_tree = self.customers_by_email_tree()?;

        (&customers_tree, &email_tree)
            .transaction(|(customers, emails)| {
                let Some(data) = customers.remove(id.as_bytes().as_slice())? else {
                    return Ok(false);
                };
                let customer: Customer = serde_json::from_slice(&data).map_err(|e| {
                    ConflictableTransactionError::Abort(serialization(e))
                })?;
                emails.remove(normalize_email(&customer.email).as_bytes())?;
                Ok(true)
            })
            .map_err(transaction)
    }
}
