use model::env::{
    DEFAULT_PIPELINE_NAME, DEFAULT_TEXT_FIELD_NAME, PIPELINE_ARN, PIPELINE_NAME, TEXT_FIELD_NAME,
};
use model::env::or_default;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Body field holding the text
    pub text_field_name: String,
    /// Prefix of every execution name
    pub pipeline_name: String,
    pub pipeline_arn: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            text_field_name: DEFAULT_TEXT_FIELD_NAME.to_string(),
            pipeline_name: DEFAULT_PIPELINE_NAME.to_string(),
            pipeline_arn: DEFAULT_PIPELINE_NAME.to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let pipeline_name: String = or_default(PIPELINE_NAME, DEFAULT_PIPELINE_NAME);

        Self {
            text_field_name: or_default(TEXT_FIELD_NAME, DEFAULT_TEXT_FIELD_NAME),
            pipeline_arn: or_default(PIPELINE_ARN, &pipeline_name),
            pipeline_name,
        }
    }
}
