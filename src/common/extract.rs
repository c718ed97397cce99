// src/common/extract.rs

use axum::extract::{multipart::Multipart, FromRequest, FromRequestParts};

use crate::common::error::AppError;

// Igual ao `Json` do axum, mas a rejeição vira `AppError`,
// mantendo o formato `{ "error": ... }` também para corpos malformados.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

// Mesma ideia para parâmetros de rota e de query.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Arquivo recebido num campo multipart.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Lê o primeiro campo chamado `name`; os demais campos são ignorados.
pub async fn read_file_field(multipart: &mut Multipart, name: &str) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::business(format!("Requete multipart invalide: {}", e)))?
    {
        if field.name() != Some(name) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::business(format!("Lecture du fichier impossible: {}", e)))?;

        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::business("Aucun fichier fourni"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[derive(Debug, Deserialize)]
    struct Paging {
        page: Option<i64>,
    }

    fn router() -> Router {
        Router::new()
            .route("/bags/{id}", get(|AppPath(id): AppPath<Uuid>| async move { id.to_string() }))
            .route(
                "/bags",
                get(|AppQuery(q): AppQuery<Paging>| async move { q.page.unwrap_or(1).to_string() }),
            )
    }

    async fn call(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn malformed_path_id_is_a_json_400() {
        let (status, body) = call("/bags/pas-un-uuid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Parametre invalide"));
    }

    #[tokio::test]
    async fn malformed_query_is_a_json_400() {
        let (status, body) = call("/bags?page=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Parametre invalide"));
    }

    #[tokio::test]
    async fn valid_parameters_pass_through() {
        let id = Uuid::new_v4();
        let response = router()
            .oneshot(Request::get(format!("/bags/{}", id)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
