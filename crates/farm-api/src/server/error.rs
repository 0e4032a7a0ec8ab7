#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn invalid_request(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::new(ErrorCode::InvalidRequest, message, details),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new(ErrorCode::InternalError, message, None),
        }
    }

    fn from_service(err: ServiceError) -> Self {
        match err {
            ServiceError::Game(game) => {
                let kind = game.kind();
                let status = match kind {
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::InsufficientInventory | ErrorKind::InvalidRequest => {
                        StatusCode::BAD_REQUEST
                    }
                    ErrorKind::LevelLocked => StatusCode::FORBIDDEN,
                    ErrorKind::InvalidState | ErrorKind::LimitReached => StatusCode::CONFLICT,
                    ErrorKind::CooldownActive => StatusCode::TOO_MANY_REQUESTS,
                };
                let mut error = ApiError::new(kind.code(), game.to_string(), details_for(&game));
                error.hours_until_next = game.hours_remaining();
                error.required_level = game.required_level();
                Self { status, error }
            }
            ServiceError::Store(store) => {
                tracing::error!(error = %store, "store failure");
                Self::internal("Something went wrong on the farm. Please try again.")
            }
        }
    }

    fn from_rejection(rejection: JsonRejection) -> Self {
        Self::invalid_request("Invalid request data", Some(rejection.body_text()))
    }
}

fn details_for(err: &farm_core::GameError) -> Option<String> {
    use farm_core::GameError;

    match err {
        GameError::NotFound { entity, key } => Some(format!("{}={key}", entity.to_lowercase())),
        GameError::InsufficientInventory {
            resource,
            required,
            available,
        } => Some(format!("resource={resource} required={required} available={available}")),
        GameError::InsufficientFunds {
            required,
            available,
        } => Some(format!("required={required} available={available}")),
        GameError::LevelTooLow {
            required_level,
            level,
        } => Some(format!("required_level={required_level} level={level}")),
        _ => None,
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
