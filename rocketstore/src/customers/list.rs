use crate::domain::{CustomerFilter, CustomerPage, GetCustomersErrorCode, PageRequest};
use crate::pipeline::{Request, RequestHandler};
use crate::ports::CustomerRepository;
use crate::result::OpResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Paged listing with optional name and email filters.
///
/// Page values are kept as received so out-of-range input is reported as an
/// `InvalidPage` failure instead of being clamped silently.
#[derive(Clone, Debug)]
pub struct GetCustomersQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub page_number: i64,
    pub page_size: i64,
}

impl Default for GetCustomersQuery {
    fn default() -> Self {
        Self {
            name: None,
            email: None,
            page_number: i64::from(PageRequest::DEFAULT_PAGE_NUMBER),
            page_size: i64::from(PageRequest::DEFAULT_PAGE_SIZE),
        }
    }
}

impl GetCustomersQuery {
    fn page(&self) -> Result<PageRequest, String> {
        let page_number = u32::try_from(self.page_number)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| format!("Page number must be at least 1, got {}.", self.page_number))?;
        let page_size = u32::try_from(self.page_size)
            .ok()
            .filter(|n| (1..=PageRequest::MAX_PAGE_SIZE).contains(n))
            .ok_or_else(|| {
                format!(
                    "Page size must be between 1 and {}, got {}.",
                    PageRequest::MAX_PAGE_SIZE,
                    self.page_size
                )
            })?;
        Ok(PageRequest::new(page_number, page_size))
    }
}

impl Request for GetCustomersQuery {
    type Response = OpResult<CustomerPage, GetCustomersErrorCode>;
}

#[derive(Clone)]
pub struct GetCustomersHandler {
    repository: Arc<dyn CustomerRepository>,
}

impl GetCustomersHandler {
    pub fn new(repository: Arc<dyn CustomerRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl RequestHandler<GetCustomersQuery> for GetCustomersHandler {
    async fn handle(
        &self,
        query: GetCustomersQuery,
        _cancel: &CancellationToken,
    ) -> shared::Result<OpResult<CustomerPage, GetCustomersErrorCode>> {
        let page = match query.page() {
            Ok(page) => page,
            Err(description) => {
                return Ok(OpResult::failure(GetCustomersErrorCode::InvalidPage, description));
            }
        };
        let filter = CustomerFilter::new(query.name, query.email);

        let result = self.repository.list(&filter, page).await?;
        debug!(
            "Listed {} of {} customers (page {})",
            result.customers.len(),
            result.total_count,
            result.page_number
        );
        Ok(OpResult::success(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Customer;
    use crate::testing::{MemoryRepository, fake_email};

    async fn seeded(names: &[&str]) -> Arc<MemoryRepository> {
        let repository = Arc::new(MemoryRepository::default());
        for name in names {
            repository
                .insert(Customer::new(*name, fake_email(), None, None))
                .await
                .unwrap();
        }
        repository
    }

    async fn list(repository: Arc<MemoryRepository>, query: GetCustomersQuery) -> OpResult<CustomerPage, GetCustomersErrorCode> {
        GetCustomersHandler::new(repository)
            .handle(query, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_pages_report_total_count() {
        let repository = seeded(&["a", "b", "c", "d", "e"]).await;

        let page = list(
            repository,
            GetCustomersQuery {
                page_number: 2,
                page_size: 2,
                ..Default::default()
            },
        )
        .await
        .into_value()
        .unwrap();

        assert_eq!(page.customers.len(), 2);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.page_size, 2);
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty() {
        let repository = seeded(&["a", "b"]).await;

        let page = list(
            repository,
            GetCustomersQuery {
                page_number: 9,
                ..Default::default()
            },
        )
        .await
        .into_value()
        .unwrap();

        assert!(page.customers.is_empty());
        assert_eq!(page.total_count, 2);
    }

    #[tokio::test]
    async fn test_name_filter() {
        let repository = seeded(&["Alice", "Bob", "alicia"]).await;

        let page = list(
            repository,
            GetCustomersQuery {
                name: Some("ALI".into()),
                ..Default::default()
            },
        )
        .await
        .into_value()
        .unwrap();

        assert_eq!(page.total_count, 2);
        assert!(page.customers.iter().all(|c| c.name.to_lowercase().contains("ali")));
    }

    #[tokio::test]
    async fn test_out_of_range_page_values_are_rejected() {
        for (page_number, page_size) in [(0, 10), (-1, 10), (1, 0), (1, 1001)] {
            let response = list(
                Arc::new(MemoryRepository::default()),
                GetCustomersQuery {
                    page_number,
                    page_size,
                    ..Default::default()
                },
            )
            .await;
            assert!(
                response.failed_with(GetCustomersErrorCode::InvalidPage),
                "{page_number}/{page_size} should be rejected"
            );
        }
    }
}
