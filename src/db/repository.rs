use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, PutRequest, WriteRequest};

use crate::db::models::Item;
use crate::db::update::UpdateExpression;
use crate::error::AppError;
use crate::keys::ItemKey;

/// `BatchWriteItem` accepts at most 25 requests per call.
const BATCH_WRITE_LIMIT: usize = 25;
/// How many times unprocessed batch requests are resubmitted before giving up.
const BATCH_WRITE_ATTEMPTS: usize = 5;

/// Repository trait for a single partitioned document collection.
///
/// Every item is addressed by its `PK`/`SK` pair. Single-item operations are
/// atomic; the batch operations are grouped writes, not transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Fetch one item by key.
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>, AppError>;

    /// Write an item, replacing any existing item with the same key.
    async fn put_item(&self, item: Item) -> Result<(), AppError>;

    /// Write an item only if no item with the same key exists.
    ///
    /// Returns `false` (and writes nothing) if the key is already taken.
    async fn put_new_item(&self, item: Item) -> Result<bool, AppError>;

    /// Apply a partial update to an existing item.
    async fn update_item(&self, key: &ItemKey, update: &UpdateExpression) -> Result<(), AppError>;

    /// Delete one item. Deleting a missing item is not an error.
    async fn delete_item(&self, key: &ItemKey) -> Result<(), AppError>;

    /// Every item sharing the given partition key.
    async fn query_partition(&self, pk: &str) -> Result<Vec<Item>, AppError>;

    /// Write several items as a grouped, non-atomic batch.
    async fn batch_put(&self, items: Vec<Item>) -> Result<(), AppError>;

    /// Delete several items as a grouped, non-atomic batch.
    async fn batch_delete(&self, keys: Vec<ItemKey>) -> Result<(), AppError>;
}

/// Extract the `PK`/`SK` pair of a stored item.
pub fn item_key(item: &Item) -> Result<ItemKey, AppError> {
    let field = |name: &str| {
        item.get(name)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::Internal(format!("Item is missing string attribute '{name}'")))
    };
    Ok(ItemKey::new(field("PK")?, field("SK")?))
}

/// DynamoDB implementation of the DocumentRepository, bound to one table.
pub struct DynamoDocumentRepository {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl DynamoDocumentRepository {
    pub fn new(client: aws_sdk_dynamodb::Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn key_attributes(key: &ItemKey) -> HashMap<String, AttributeValue> {
        HashMap::from([
            ("PK".to_string(), AttributeValue::S(key.pk.clone())),
            ("SK".to_string(), AttributeValue::S(key.sk.clone())),
        ])
    }

    fn to_attributes(item: Item) -> Result<HashMap<String, AttributeValue>, AppError> {
        serde_dynamo::to_item(item)
            .map_err(|e| AppError::Database(format!("Failed to serialize item: {e}")))
    }

    fn from_attributes(attributes: HashMap<String, AttributeValue>) -> Result<Item, AppError> {
        serde_dynamo::from_item(attributes)
            .map_err(|e| AppError::Database(format!("Failed to deserialize item: {e}")))
    }

    /// Send write requests in chunks, resubmitting whatever DynamoDB reports as unprocessed.
    async fn batch_write(&self, mut requests: Vec<WriteRequest>) -> Result<(), AppError> {
        while !requests.is_empty() {
            let mut pending: Vec<WriteRequest> = requests
                .drain(..requests.len().min(BATCH_WRITE_LIMIT))
                .collect();

            for attempt in 1..=BATCH_WRITE_ATTEMPTS {
                let output = self
                    .client
                    .batch_write_item()
                    .request_items(&self.table, pending)
                    .send()
                    .await
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Batch write to '{}' failed: {}",
                            self.table,
                            e.into_service_error()
                        ))
                    })?;

                pending = output
                    .unprocessed_items
                    .and_then(|mut unprocessed| unprocessed.remove(&self.table))
                    .unwrap_or_default();

                if pending.is_empty() {
                    break;
                }

                tracing::warn!(
                    "{} unprocessed batch requests on '{}' (attempt {attempt})",
                    pending.len(),
                    self.table
                );
            }

            if !pending.is_empty() {
                return Err(AppError::Database(format!(
                    "{} batch requests on '{}' remained unprocessed",
                    pending.len(),
                    self.table
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for DynamoDocumentRepository {
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>, AppError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(Self::key_attributes(key)))
            .send()
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to get '{}': {}", key, e.into_service_error()))
            })?;

        output.item.map(Self::from_attributes).transpose()
    }

    async fn put_item(&self, item: Item) -> Result<(), AppError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(Self::to_attributes(item)?))
            .send()
            .await
            .map_err(|e| AppError::Database(format!("Failed to put item: {}", e.into_service_error())))?;

        Ok(())
    }

    async fn put_new_item(&self, item: Item) -> Result<bool, AppError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(Self::to_attributes(item)?))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(ref inner))
                if matches!(inner.err(), PutItemError::ConditionalCheckFailedException(_)) =>
            {
                Ok(false)
            }
            Err(e) => Err(AppError::Database(format!(
                "Failed to put item: {}",
                e.into_service_error()
            ))),
        }
    }

    async fn update_item(&self, key: &ItemKey, update: &UpdateExpression) -> Result<(), AppError> {
        let values = update
            .values
            .iter()
            .map(|(placeholder, value)| {
                serde_dynamo::to_attribute_value(value)
                    .map(|av: AttributeValue| (placeholder.clone(), av))
                    .map_err(|e| AppError::Database(format!("Failed to serialize value: {e}")))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        self.client
            .update_item()
            .table_name(&self.table)
            .set_key(Some(Self::key_attributes(key)))
            .update_expression(&update.expression)
            .set_expression_attribute_names(Some(update.names.clone()))
            .set_expression_attribute_values(Some(values))
            .send()
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to update '{}': {}", key, e.into_service_error()))
            })?;

        Ok(())
    }

    async fn delete_item(&self, key: &ItemKey) -> Result<(), AppError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .set_key(Some(Self::key_attributes(key)))
            .send()
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to delete '{}': {}", key, e.into_service_error()))
            })?;

        Ok(())
    }

    async fn query_partition(&self, pk: &str) -> Result<Vec<Item>, AppError> {
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table)
                .key_condition_expression("#pk = :pk")
                .expression_attribute_names("#pk", "PK")
                .expression_attribute_values(":pk", AttributeValue::S(pk.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| {
                    AppError::Database(format!("Failed to query '{}': {}", pk, e.into_service_error()))
                })?;

            for attributes in output.items.unwrap_or_default() {
                items.push(Self::from_attributes(attributes)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn batch_put(&self, items: Vec<Item>) -> Result<(), AppError> {
        let requests = items
            .into_iter()
            .map(|item| {
                let put = PutRequest::builder()
                    .set_item(Some(Self::to_attributes(item)?))
                    .build()
                    .map_err(|e| AppError::Database(format!("Invalid put request: {e}")))?;
                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        self.batch_write(requests).await
    }

    async fn batch_delete(&self, keys: Vec<ItemKey>) -> Result<(), AppError> {
        let requests = keys
            .iter()
            .map(|key| {
                let delete = DeleteRequest::builder()
                    .set_key(Some(Self::key_attributes(key)))
                    .build()
                    .map_err(|e| AppError::Database(format!("Invalid delete request: {e}")))?;
                Ok(WriteRequest::builder().delete_request(delete).build())
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        self.batch_write(requests).await
    }
}
