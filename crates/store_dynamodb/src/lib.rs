use async_trait::async_trait;
use aws_sdk_dynamodb::operation::get_item::GetItemOutput;
use aws_sdk_dynamodb::types::AttributeValue;
use lambda_runtime::tracing;
use model::env::{DEFAULT_PARTITION_KEY, TEXT_TABLE_NAME, TEXT_TABLE_PARTITION_KEY};
use model::env::{or_default, required, ConfigError};
use model::{LanguageScore, TextRecord};
use store::StoreErrorReason::{BackendFailure, BadState, MissingEntry};
use store::StoreOperation::{GetText, PutText, UpdateLanguage};
use store::{StoreError, TextStore};
use std::collections::HashMap;

// Language codes are data, so they always go through a placeholder
const LANGUAGE_NAME: &str = "#lang";
const SCORE_VALUE: &str = ":score";
const KEY_NAME: &str = "#pk";

/// A `TextStore` backed by a DynamoDB table with a single string partition key.
pub struct DynamoDbTextStore {
    table_name: String,
    partition_key: String,
    dynamodb_client: aws_sdk_dynamodb::Client,
}

impl DynamoDbTextStore {
    pub fn new(
        dynamodb_client: aws_sdk_dynamodb::Client,
        table_name: impl Into<String>,
        partition_key: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            partition_key: partition_key.into(),
            dynamodb_client,
        }
    }

    /// Pull the table and partition key names from the environment.
    pub fn from_env(dynamodb_client: aws_sdk_dynamodb::Client) -> Result<Self, ConfigError> {
        let table_name: String = required(TEXT_TABLE_NAME)?;
        let partition_key: String = or_default(TEXT_TABLE_PARTITION_KEY, DEFAULT_PARTITION_KEY);

        Ok(Self::new(dynamodb_client, table_name, partition_key))
    }

    fn key(&self, key: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([(
            self.partition_key.clone(),
            AttributeValue::S(key.to_string()),
        )])
    }

    fn to_record(&self, key: &str, output: GetItemOutput) -> Result<Option<TextRecord>, StoreError> {
        let Some(item) = output.item else {
            return Ok(None);
        };

        let mut attributes: HashMap<String, String> = serde_dynamo::from_item(item)
            .map_err(|err| StoreError::new(key, GetText, BadState(err.to_string())))?;

        let stored_key: String = attributes.remove(&self.partition_key).ok_or_else(|| {
            StoreError::new(
                key,
                GetText,
                BadState(format!("missing partition key {}", self.partition_key)),
            )
        })?;

        Ok(Some(TextRecord {
            key: stored_key,
            languages: attributes.into_iter().collect(),
        }))
    }
}

#[async_trait]
impl TextStore for DynamoDbTextStore {
    async fn put_text(&self, key: &str) -> Result<(), StoreError> {
        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(self.key(key)))
            .send()
            .await
            .map_err(|err| StoreError::new(key, PutText, BackendFailure(err.into())))?;

        Ok(())
    }

    async fn update_language(&self, key: &str, score: &LanguageScore) -> Result<(), StoreError> {
        let formatted: String = score.formatted_score();

        tracing::debug!(
            language_code = score.language_code,
            score = formatted,
            "Updating language score"
        );

        self.dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(self.key(key)))
            .update_expression(format!("SET {LANGUAGE_NAME} = {SCORE_VALUE}"))
            .condition_expression(format!("attribute_exists({KEY_NAME})"))
            .expression_attribute_names(LANGUAGE_NAME, &score.language_code)
            .expression_attribute_names(KEY_NAME, &self.partition_key)
            .expression_attribute_values(SCORE_VALUE, AttributeValue::S(formatted))
            .send()
            .await
            .map_err(|err| {
                let missing: bool = err
                    .as_service_error()
                    .is_some_and(|service_err| service_err.is_conditional_check_failed_exception());

                if missing {
                    StoreError::new(key, UpdateLanguage, MissingEntry)
                } else {
                    StoreError::new(key, UpdateLanguage, BackendFailure(err.into()))
                }
            })?;

        Ok(())
    }

    async fn get_text(&self, key: &str) -> Result<Option<TextRecord>, StoreError> {
        let output: GetItemOutput = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .consistent_read(true)
            .set_key(Some(self.key(key)))
            .send()
            .await
            .map_err(|err| StoreError::new(key, GetText, BackendFailure(err.into())))?;

        self.to_record(key, output)
    }
}
