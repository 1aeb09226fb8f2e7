use tracing::info;

use crate::domain::repository::DonationRepository;
use crate::domain::types::{Donation, NewDonation, require};
use crate::error::LibraryServiceError;

pub struct ListDonationsUseCase<R: DonationRepository> {
    pub repo: R,
}

impl<R: DonationRepository> ListDonationsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Donation>, LibraryServiceError> {
        self.repo.list_donations().await
    }
}

#[derive(Debug, Default)]
pub struct DonateInput {
    pub donor_name: Option<String>,
    pub email: Option<String>,
    pub book_title: Option<String>,
    pub author: Option<String>,
    pub quantity: Option<i32>,
}

pub struct DonateUseCase<R: DonationRepository> {
    pub repo: R,
}

impl<R: DonationRepository> DonateUseCase<R> {
    /// Record a pledged donation. Quantity defaults to one copy.
    pub async fn execute(&self, input: DonateInput) -> Result<Donation, LibraryServiceError> {
        let quantity = input.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(LibraryServiceError::InvalidPayload(
                "quantity must be at least 1".into(),
            ));
        }
        let donation = self
            .repo
            .create_donation(NewDonation {
                donor_name: require(input.donor_name, "donorName")?,
                email: input.email.filter(|e| !e.trim().is_empty()),
                book_title: require(input.book_title, "bookTitle")?,
                author: input.author.filter(|a| !a.trim().is_empty()),
                quantity,
            })
            .await?;
        info!(donation_id = %donation.id, quantity, "donation recorded");
        Ok(donation)
    }
}

pub struct DeleteDonationUseCase<R: DonationRepository> {
    pub repo: R,
}

impl<R: DonationRepository> DeleteDonationUseCase<R> {
    pub async fn execute(&self, id: &str) -> Result<(), LibraryServiceError> {
        self.repo.delete_donation(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcmn_testing::fixture::DataDir;

    use crate::infra::json::JsonStore;

    #[tokio::test]
    async fn should_default_quantity_to_one() {
        let dir = DataDir::new();
        let store = JsonStore::open(dir.data_file()).await.unwrap();
        let donation = DonateUseCase { repo: store }
            .execute(DonateInput {
                donor_name: Some("Old Boys Association".into()),
                book_title: Some("Tafheem".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(donation.quantity, 1);
        assert!(donation.email.is_none());
    }

    #[tokio::test]
    async fn should_reject_non_positive_quantity() {
        let dir = DataDir::new();
        let store = JsonStore::open(dir.data_file()).await.unwrap();
        let err = DonateUseCase { repo: store }
            .execute(DonateInput {
                donor_name: Some("Anon".into()),
                book_title: Some("Tafheem".into()),
                quantity: Some(0),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryServiceError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn should_delete_idempotently() {
        let dir = DataDir::new();
        let store = JsonStore::open(dir.data_file()).await.unwrap();
        let donation = DonateUseCase { repo: store.clone() }
            .execute(DonateInput {
                donor_name: Some("Anon".into()),
                book_title: Some("Tafheem".into()),
                quantity: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();

        let delete = DeleteDonationUseCase { repo: store.clone() };
        delete.execute(&donation.id).await.unwrap();
        delete.execute(&donation.id).await.unwrap();
        assert!(
            ListDonationsUseCase { repo: store }
                .execute()
                .await
                .unwrap()
                .is_empty()
        );
    }
}
