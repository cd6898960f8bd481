use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::error::{ApiError, InvalidArgument};

/// JSON body whose decoding failures come back as `ApiError` bad requests
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

/// JSON body that must also pass its `validator` rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    tracing::warn!("Error binding data: {}", rejection.body_text());
    ApiError::bad_request(rejection.body_text())
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Flatten `validator` errors into one entry per failed rule
pub fn invalid_arguments(errors: &ValidationErrors) -> Vec<InvalidArgument> {
    let mut args: Vec<InvalidArgument> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |err| {
                let value = err.params.get("value").map(render_value).unwrap_or_default();

                let mut params = Vec::new();
                for (name, v) in &err.params {
                    if name != "value" {
                        params.push(format!("{}={}", name, render_value(v)));
                    }
                }
                params.sort();

                InvalidArgument {
                    field: field.to_string(),
                    value,
                    tag: err.code.to_string(),
                    param: params.join(","),
                }
            })
        })
        .collect();

    args.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.tag.cmp(&b.tag)));
    args
}

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Payload(value) = Payload::<T>::from_request(req, state).await?;

        if let Err(errors) = value.validate() {
            tracing::warn!("Request failed validation: {}", errors);
            return Err(ApiError::Validation(invalid_arguments(&errors)));
        }

        Ok(Self(value))
    }
}
