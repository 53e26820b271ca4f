//! # Gateway Flows
//!
//! Drives the REST router in-process (no socket) against a fully wired
//! core, checking status codes and the `{"error": {kind, message}}` body.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use lintas_api::{build_router, GatewayConfig, SharedApi, ACTOR_HEADER};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::integration::fixtures::*;

    fn router(w: &World) -> Router {
        let api: SharedApi = w.service.clone();
        build_router(api, &GatewayConfig::for_testing())
    }

    async fn call(router: &Router, method: Method, uri: &str, user: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACTOR_HEADER, user);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn intake_body() -> Value {
        json!({
            "origin": "JKT",
            "destination": "SBY",
            "sender": "cust-toko-makmur",
            "cargo": {"name": "Ban dalam", "colly": 4, "weight_kg": 6.5},
            "rate_per_kg": 4000,
            "payment_type": "COD"
        })
    }

    #[tokio::test]
    async fn test_me_lists_role_edges() {
        let w = world();
        let (status, body) = call(&router(&w), Method::GET, "/me", "u-staff_admin", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["actor"]["role"], "staff_admin");
        assert_eq!(
            body["edges"],
            json!([
                {"from": "PENDING", "to": "MUAT"},
                {"from": "RETURN", "to": "PENDING"}
            ])
        );
    }

    #[tokio::test]
    async fn test_shipment_over_http() {
        let w = world();
        let app = router(&w);

        let (status, created) =
            call(&app, Method::POST, "/stt", "u-staff_admin", Some(intake_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["harga"], 26_000);
        let id = created["id"].as_str().unwrap().to_string();
        let number = created["tracking_number"].as_str().unwrap().to_string();

        let (status, found) =
            call(&app, Method::GET, &format!("/stt/tracking/{number}"), "u-checker", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["id"], id.as_str());

        let (status, targets) =
            call(&app, Method::GET, &format!("/stt/{id}/transitions"), "u-staff_admin", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(targets, json!(["MUAT"]));

        // A driver may not load.
        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/stt/{id}/status"),
            "u-supir",
            Some(json!({"status": "MUAT"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["kind"], "Forbidden");

        // Skipping MUAT is a conflict, not a permission problem.
        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/stt/{id}/status"),
            "u-admin",
            Some(json!({"status": "TRANSIT"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["kind"], "InvalidTransition");

        let (status, moved) = call(
            &app,
            Method::POST,
            &format!("/stt/{id}/status"),
            "u-staff_admin",
            Some(json!({"status": "MUAT", "note": "Masuk gudang"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["status"], "MUAT");

        let (status, history) =
            call(&app, Method::GET, &format!("/stt/{id}/history"), "u-admin", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fleet_queue_over_http() {
        let w = world();
        let app = router(&w);

        let (status, vehicle) = call(
            &app,
            Method::POST,
            "/vehicles",
            "u-admin",
            Some(json!({"plate_number": "L 9999 ZZ", "branch": "SBY", "default_driver": "u-supir"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let vehicle_id = vehicle["id"].as_str().unwrap().to_string();

        let enqueue = json!({"branch": "SBY", "vehicle_id": vehicle_id});
        let (status, entry) =
            call(&app, Method::POST, "/vehicle-queues", "u-admin", Some(enqueue.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry["status"], "MENUNGGU");
        assert_eq!(entry["driver"], "u-supir");

        let (status, body) =
            call(&app, Method::POST, "/vehicle-queues", "u-admin", Some(enqueue)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["kind"], "DuplicateVehicle");

        let (status, next) =
            call(&app, Method::GET, "/vehicle-queues/next?branch=SBY", "u-checker", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(next["id"], entry["id"]);

        let (status, body) =
            call(&app, Method::GET, "/vehicle-queues/next?branch=BDG", "u-checker", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["kind"], "EmptyQueue");

        let entry_id = entry["id"].as_str().unwrap();
        let (status, body) =
            call(&app, Method::DELETE, &format!("/vehicle-queues/{entry_id}"), "u-admin", None)
                .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_collection_over_http() {
        let w = world();
        let app = router(&w);

        let (status, body) = call(
            &app,
            Method::POST,
            "/collections",
            "u-admin",
            Some(json!({
                "customer": "cust-toko-makmur",
                "customer_role": "PENGIRIM",
                "shipments": [],
                "branch": "JKT"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["kind"], "ValidationError");

        let (status, body) = call(
            &app,
            Method::POST,
            "/collections/col-missing/payments",
            "u-admin",
            Some(json!({"amount": 10_000})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["kind"], "NotFound");
    }
}
