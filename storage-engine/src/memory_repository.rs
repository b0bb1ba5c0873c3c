use async_trait::async_trait;
use parking_lot::RwLock;
use rocketstore::domain::{Customer, CustomerFilter, CustomerPage, CustomerSummary, PageRequest, normalize_email};
use rocketstore::ports::{CustomerRepository, RepositoryError};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

#[derive(Default)]
struct Indexes {
    by_id: BTreeMap<Uuid, Customer>,
    by_email: HashMap<String, Uuid>,
}

/// Process-local customer store; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    indexes: RwLock<Indexes>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.indexes.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let email = normalize_email(&customer.email);
        let mut indexes = self.indexes.write();

        if indexes.by_email.contains_key(&email) {
            return Err(RepositoryError::DuplicateEmail(customer.email));
        }

        indexes.by_email.insert(email, customer.id);
        indexes.by_id.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.indexes.read().by_id.get(&id).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .indexes
            .read()
            .by_email
            .contains_key(&normalize_email(email)))
    }

    async fn list(
        &self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<CustomerPage, RepositoryError> {
        let indexes = self.indexes.read();
        let mut total_count = 0;
        let mut customers = Vec::new();

        for customer in indexes.by_id.values().filter(|c| filter.matches(c)) {
            if total_count >= page.skip() && customers.len() < page.take() {
                customers.push(CustomerSummary::from(customer.clone()));
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
        let mut indexes = self.indexes.write();
        match indexes.by_id.remove(&id) {
            Some(customer) => {
                indexes.by_email.remove(&normalize_email(&customer.email));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
