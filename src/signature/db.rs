use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::FindOptions;

use crate::campaign::CampaignId;
use crate::database::MongoSignatureStore;
use crate::error::Error;

use super::Signature;

#[async_trait]
pub trait SignatureStore: Send + Sync {
    async fn insert_signature(&self, signature: &Signature) -> Result<(), Error>;

    async fn fetch_signatures_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Signature>, Error>;

    async fn count_signatures_by_campaign(&self, campaign_id: CampaignId) -> Result<u64, Error>;
}

#[async_trait]
impl SignatureStore for MongoSignatureStore {
    #[tracing::instrument(skip(self, signature), fields(signature_id = %signature.id))]
    async fn insert_signature(&self, signature: &Signature) -> Result<(), Error> {
        self.insert_one(signature, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_signatures_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Signature>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": 1 })
            .build();

        let signatures: Vec<Signature> = self
            .find(bson::doc! { "campaign_id": campaign_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(signatures)
    }

    #[tracing::instrument(skip(self))]
    async fn count_signatures_by_campaign(&self, campaign_id: CampaignId) -> Result<u64, Error> {
        let count = self
            .count_documents(bson::doc! { "campaign_id": campaign_id }, None)
            .await?;

        Ok(count)
    }
}
