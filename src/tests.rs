#[cfg(test)]
mod integration_tests {
    use crate::handlers::properties::{CreatePropertyRequest, UpdatePropertyRequest};
    use crate::handlers::tenancies::{CreateTenancyRequest, TenancyResponse};
    use crate::handlers::tenants::CreateTenantRequest;
    use crate::handlers::units::{CreateUnitRequest, UnitResponse};
    use crate::schemas::ApiResponse;
    use crate::test_utils::test_utils::{setup_test_app, setup_test_app_state};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    const LANDLORD_ID: i32 = 1;

    fn property_request(plot_id: &str, total_units: i32) -> CreatePropertyRequest {
        CreatePropertyRequest {
            name: "Sunrise Apartments".to_string(),
            location: "Kilimani, Nairobi".to_string(),
            plot_id: plot_id.to_string(),
            landlord_id: LANDLORD_ID,
            total_units,
        }
    }

    fn unit_request(unit_number: &str) -> CreateUnitRequest {
        CreateUnitRequest {
            unit_number: unit_number.to_string(),
            unit_type: "1BR".to_string(),
            monthly_rent: Decimal::new(1200000, 2), // 12,000.00
            deposit_amount: Some(Decimal::new(1200000, 2)),
            bedrooms: Some(1),
            bathrooms: Some(1),
        }
    }

    fn tenant_request(email: &str) -> CreateTenantRequest {
        CreateTenantRequest {
            email: email.to_string(),
            phone: "+254722000000".to_string(),
            first_name: "John".to_string(),
            last_name: "Otieno".to_string(),
            occupation: Some("Teacher".to_string()),
            id_type: Some("national_id".to_string()),
            id_number: Some("12345678".to_string()),
        }
    }

    async fn create_property(server: &TestServer, plot_id: &str, total_units: i32) -> i32 {
        let response = server
            .post("/api/v1/properties")
            .json(&property_request(plot_id, total_units))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        body.data["id"].as_i64().unwrap() as i32
    }

    async fn create_unit(server: &TestServer, property_id: i32, unit_number: &str) -> i32 {
        let response = server
            .post(&format!("/api/v1/properties/{}/units", property_id))
            .json(&unit_request(unit_number))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<UnitResponse> = response.json();
        body.data.id
    }

    async fn create_tenant(server: &TestServer, email: &str) -> i32 {
        let response = server
            .post("/api/v1/tenants")
            .json(&tenant_request(email))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        body.data["id"].as_i64().unwrap() as i32
    }

    async fn assign_tenant(server: &TestServer, unit_id: i32, tenant_id: i32) -> TenancyResponse {
        let request = CreateTenancyRequest {
            unit_id,
            tenant_id,
            move_in_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            monthly_rent: Decimal::new(1200000, 2),
            deposit_amount: Some(Decimal::new(1200000, 2)),
        };
        let response = server.post("/api/v1/tenancies").json(&request).await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<TenancyResponse> = response.json();
        body.data
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_tenant() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/tenants")
            .json(&tenant_request("tenant@example.com"))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        assert_eq!(body.message, "Tenant created successfully");
        assert_eq!(body.data["email"], "tenant@example.com");
        assert_eq!(body.data["first_name"], "John");
        assert_eq!(body.data["is_verified"], false);
        assert!(body.data["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_get_tenants_excludes_landlords() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        create_tenant(&server, "tenant1@example.com").await;
        create_tenant(&server, "tenant2@example.com").await;

        let response = server.get("/api/v1/tenants").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert!(body.success);

        // The two seeded landlords must not appear in the tenant listing
        assert_eq!(body.data.len(), 2);
        assert!(body
            .data
            .iter()
            .all(|t| t["email"].as_str().unwrap().starts_with("tenant")));
    }

    #[tokio::test]
    async fn test_create_tenant_with_invalid_email() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/tenants")
            .json(&tenant_request("not-an-email"))
            .await;

        // Rejected before any write reaches the store
        response.assert_status(StatusCode::BAD_REQUEST);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["success"], false);
        assert_eq!(error_body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_tenant_duplicate_email() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        create_tenant(&server, "dup@example.com").await;

        let response = server
            .post("/api/v1/tenants")
            .json(&tenant_request("dup@example.com"))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "DUPLICATE_EMAIL");
    }

    #[tokio::test]
    async fn test_create_property() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/properties")
            .json(&property_request("LR-2091/44", 10))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        assert_eq!(body.message, "Property created successfully");
        assert_eq!(body.data["name"], "Sunrise Apartments");
        assert_eq!(body.data["total_units"], 10);
        // New properties start empty and active
        assert_eq!(body.data["occupied_units"], 0);
        assert_eq!(body.data["status"], "active");
    }

    #[tokio::test]
    async fn test_create_property_with_zero_units() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/properties")
            .json(&property_request("LR-1/1", 0))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["success"], false);
        assert_eq!(error_body["code"], "INVALID_TOTAL_UNITS");
    }

    #[tokio::test]
    async fn test_create_property_with_invalid_landlord() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // Unknown user id
        let mut request = property_request("LR-1/2", 5);
        request.landlord_id = 999;
        let response = server.post("/api/v1/properties").json(&request).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "INVALID_LANDLORD_ID");
        assert!(error_body["error"]
            .as_str()
            .unwrap()
            .contains("Landlord with id 999 does not exist"));

        // A tenant cannot own properties
        let tenant_id = create_tenant(&server, "tenant@example.com").await;
        let mut request = property_request("LR-1/3", 5);
        request.landlord_id = tenant_id;
        let response = server.post("/api/v1/properties").json(&request).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "INVALID_LANDLORD_ID");
    }

    #[tokio::test]
    async fn test_create_property_duplicate_plot() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        create_property(&server, "LR-77/7", 4).await;

        let response = server
            .post("/api/v1/properties")
            .json(&property_request("LR-77/7", 2))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "DUPLICATE_PLOT_ID");
    }

    #[tokio::test]
    async fn test_get_property_not_found() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/properties/999").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "PROPERTY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_property() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-5/5", 6).await;

        let update = UpdatePropertyRequest {
            name: Some("Sunset Apartments".to_string()),
            location: None,
            total_units: Some(8),
            status: Some("inactive".to_string()),
        };
        let response = server
            .put(&format!("/api/v1/properties/{}", property_id))
            .json(&update)
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["name"], "Sunset Apartments");
        assert_eq!(body.data["total_units"], 8);
        assert_eq!(body.data["status"], "inactive");
        // Location untouched
        assert_eq!(body.data["location"], "Kilimani, Nairobi");
    }

    #[tokio::test]
    async fn test_update_property_cannot_shrink_below_existing_units() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-6/6", 4).await;
        create_unit(&server, property_id, "A1").await;
        create_unit(&server, property_id, "A2").await;

        let update = UpdatePropertyRequest {
            name: None,
            location: None,
            total_units: Some(1),
            status: None,
        };
        let response = server
            .put(&format!("/api/v1/properties/{}", property_id))
            .json(&update)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "INVALID_TOTAL_UNITS");
    }

    #[tokio::test]
    async fn test_delete_property() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-8/8", 2).await;

        let response = server
            .delete(&format!("/api/v1/properties/{}", property_id))
            .await;
        response.assert_status(StatusCode::OK);

        let get_response = server
            .get(&format!("/api/v1/properties/{}", property_id))
            .await;
        get_response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_unit() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-9/9", 3).await;

        let response = server
            .post(&format!("/api/v1/properties/{}/units", property_id))
            .json(&unit_request("B1"))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<UnitResponse> = response.json();
        assert!(body.success);
        assert_eq!(body.data.unit_number, "B1");
        assert_eq!(body.data.unit_type, "1BR");
        assert_eq!(body.data.status, "vacant");
        assert_eq!(body.data.monthly_rent, Decimal::new(1200000, 2));
    }

    #[tokio::test]
    async fn test_create_unit_rejects_bad_input() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-10/1", 5).await;

        // Unknown property
        let response = server
            .post("/api/v1/properties/999/units")
            .json(&unit_request("C1"))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        // Invalid unit type
        let mut request = unit_request("C1");
        request.unit_type = "penthouse".to_string();
        let response = server
            .post(&format!("/api/v1/properties/{}/units", property_id))
            .json(&request)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "INVALID_UNIT_TYPE");

        // Negative rent
        let mut request = unit_request("C1");
        request.monthly_rent = Decimal::new(-100, 0);
        let response = server
            .post(&format!("/api/v1/properties/{}/units", property_id))
            .json(&request)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "INVALID_MONTHLY_RENT");

        // Duplicate unit number within the property
        create_unit(&server, property_id, "C1").await;
        let response = server
            .post(&format!("/api/v1/properties/{}/units", property_id))
            .json(&unit_request("C1"))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "DUPLICATE_UNIT_NUMBER");
    }

    #[tokio::test]
    async fn test_create_unit_beyond_declared_capacity() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-11/1", 1).await;
        create_unit(&server, property_id, "A1").await;

        let response = server
            .post(&format!("/api/v1/properties/{}/units", property_id))
            .json(&unit_request("A2"))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "UNIT_LIMIT_REACHED");
    }

    #[tokio::test]
    async fn test_assign_tenant_to_vacant_unit() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-12/1", 10).await;
        let unit_id = create_unit(&server, property_id, "A1").await;
        let tenant_id = create_tenant(&server, "tenant@example.com").await;

        let tenancy = assign_tenant(&server, unit_id, tenant_id).await;
        assert_eq!(tenancy.unit_id, unit_id);
        assert_eq!(tenancy.tenant_id, tenant_id);
        assert_eq!(tenancy.property_id, property_id);
        assert_eq!(tenancy.status, "active");
        assert!(tenancy.move_out_date.is_none());

        // The unit is now occupied
        let response = server.get(&format!("/api/v1/units/{}", unit_id)).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<UnitResponse> = response.json();
        assert_eq!(body.data.status, "occupied");

        // Exactly one active tenancy references the unit
        let response = server
            .get(&format!("/api/v1/units/{}/tenancies", unit_id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<TenancyResponse>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].id, tenancy.id);

        // The property's cached count followed
        let response = server
            .get(&format!("/api/v1/properties/{}", property_id))
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["occupied_units"], 1);
    }

    #[tokio::test]
    async fn test_assign_tenant_to_occupied_unit() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-13/1", 2).await;
        let unit_id = create_unit(&server, property_id, "A1").await;
        let tenant1 = create_tenant(&server, "tenant1@example.com").await;
        let tenant2 = create_tenant(&server, "tenant2@example.com").await;

        assign_tenant(&server, unit_id, tenant1).await;

        // A second assignment to the same unit must fail
        let request = CreateTenancyRequest {
            unit_id,
            tenant_id: tenant2,
            move_in_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            monthly_rent: Decimal::new(1200000, 2),
            deposit_amount: None,
        };
        let response = server.post("/api/v1/tenancies").json(&request).await;
        response.assert_status(StatusCode::CONFLICT);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "UNIT_ALREADY_OCCUPIED");

        // And must not create a second active tenancy
        let response = server
            .get(&format!("/api/v1/units/{}/tenancies", unit_id))
            .await;
        let body: ApiResponse<Vec<TenancyResponse>> = response.json();
        assert_eq!(body.data.len(), 1);
    }

    #[tokio::test]
    async fn test_assign_tenant_validation() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-14/1", 2).await;
        let unit_id = create_unit(&server, property_id, "A1").await;
        let tenant_id = create_tenant(&server, "tenant@example.com").await;

        // Rent below the minimum of 1 is rejected before any write
        let request = CreateTenancyRequest {
            unit_id,
            tenant_id,
            move_in_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            monthly_rent: Decimal::ZERO,
            deposit_amount: None,
        };
        let response = server.post("/api/v1/tenancies").json(&request).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "INVALID_MONTHLY_RENT");

        // Unknown unit
        let request = CreateTenancyRequest {
            unit_id: 999,
            tenant_id,
            move_in_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            monthly_rent: Decimal::new(1200000, 2),
            deposit_amount: None,
        };
        let response = server.post("/api/v1/tenancies").json(&request).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "UNIT_NOT_FOUND");

        // Unknown tenant
        let request = CreateTenancyRequest {
            unit_id,
            tenant_id: 999,
            move_in_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            monthly_rent: Decimal::new(1200000, 2),
            deposit_amount: None,
        };
        let response = server.post("/api/v1/tenancies").json(&request).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "INVALID_TENANT_ID");

        // A landlord cannot be assigned as a tenant
        let request = CreateTenancyRequest {
            unit_id,
            tenant_id: LANDLORD_ID,
            move_in_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            monthly_rent: Decimal::new(1200000, 2),
            deposit_amount: None,
        };
        let response = server.post("/api/v1/tenancies").json(&request).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "NOT_A_TENANT");

        // None of the failures left a tenancy behind
        let response = server
            .get(&format!("/api/v1/units/{}/tenancies", unit_id))
            .await;
        let body: ApiResponse<Vec<TenancyResponse>> = response.json();
        assert!(body.data.is_empty());
    }

    #[tokio::test]
    async fn test_end_tenancy() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-15/1", 2).await;
        let unit_id = create_unit(&server, property_id, "A1").await;
        let tenant_id = create_tenant(&server, "tenant@example.com").await;
        let tenancy = assign_tenant(&server, unit_id, tenant_id).await;

        let response = server
            .post(&format!("/api/v1/tenancies/{}/end", tenancy.id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<TenancyResponse> = response.json();
        assert_eq!(body.data.status, "ended");
        assert!(body.data.move_out_date.is_some());

        // Ending frees the unit and decrements the cached count
        let response = server.get(&format!("/api/v1/units/{}", unit_id)).await;
        let body: ApiResponse<UnitResponse> = response.json();
        assert_eq!(body.data.status, "vacant");

        let response = server
            .get(&format!("/api/v1/properties/{}", property_id))
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["occupied_units"], 0);

        // A second end on the same record is a defined failure
        let response = server
            .post(&format!("/api/v1/tenancies/{}/end", tenancy.id))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "TENANCY_ALREADY_ENDED");

        // The unit can be let out again afterwards
        let tenant2 = create_tenant(&server, "tenant2@example.com").await;
        assign_tenant(&server, unit_id, tenant2).await;
    }

    #[tokio::test]
    async fn test_end_tenancy_not_found() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.post("/api/v1/tenancies/999/end").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "TENANCY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_occupancy_rate_over_assignments() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-16/1", 10).await;

        // Fresh property reports a zero rate
        let response = server
            .get(&format!("/api/v1/properties/{}/occupancy", property_id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["occupancy_rate"], 0);

        // Three successful assignments take the rate to 30%
        for i in 1..=3 {
            let unit_id = create_unit(&server, property_id, &format!("A{}", i)).await;
            let tenant_id =
                create_tenant(&server, &format!("tenant{}@example.com", i)).await;
            assign_tenant(&server, unit_id, tenant_id).await;
        }

        let response = server
            .get(&format!("/api/v1/properties/{}/occupancy", property_id))
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["occupied_units"], 3);
        assert_eq!(body.data["total_units"], 10);
        assert_eq!(body.data["occupancy_rate"], 30);

        // The dashboard reduction agrees
        let response = server
            .get("/api/v1/dashboard/summary")
            .add_query_param("landlord_id", LANDLORD_ID)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["total_properties"], 1);
        assert_eq!(body.data["total_units"], 10);
        assert_eq!(body.data["occupied_units"], 3);
        assert_eq!(body.data["vacant_units"], 7);
        assert_eq!(body.data["active_tenancies"], 3);
        assert_eq!(body.data["occupancy_rate"], 30);
    }

    #[tokio::test]
    async fn test_dashboard_summary_with_no_properties() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/dashboard/summary").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["total_properties"], 0);
        assert_eq!(body.data["total_units"], 0);
        assert_eq!(body.data["occupancy_rate"], 0);
    }

    #[tokio::test]
    async fn test_deletes_are_refused_while_tenancy_is_active() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-17/1", 2).await;
        let unit_id = create_unit(&server, property_id, "A1").await;
        let tenant_id = create_tenant(&server, "tenant@example.com").await;
        let tenancy = assign_tenant(&server, unit_id, tenant_id).await;

        let response = server.delete(&format!("/api/v1/units/{}", unit_id)).await;
        response.assert_status(StatusCode::CONFLICT);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "UNIT_HAS_ACTIVE_TENANCY");

        let response = server
            .delete(&format!("/api/v1/tenants/{}", tenant_id))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "TENANT_HAS_ACTIVE_TENANCY");

        let response = server
            .delete(&format!("/api/v1/properties/{}", property_id))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "PROPERTY_HAS_ACTIVE_TENANCIES");

        // Deleting the tenancy record itself is also refused while active
        let response = server
            .delete(&format!("/api/v1/tenancies/{}", tenancy.id))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "TENANCY_ACTIVE");

        // Once ended, the record can go
        server
            .post(&format!("/api/v1/tenancies/{}/end", tenancy.id))
            .await
            .assert_status(StatusCode::OK);
        server
            .delete(&format!("/api/v1/tenancies/{}", tenancy.id))
            .await
            .assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_tenancies_with_filters() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-18/1", 4).await;
        let unit1 = create_unit(&server, property_id, "A1").await;
        let unit2 = create_unit(&server, property_id, "A2").await;
        let tenant1 = create_tenant(&server, "tenant1@example.com").await;
        let tenant2 = create_tenant(&server, "tenant2@example.com").await;

        let tenancy1 = assign_tenant(&server, unit1, tenant1).await;
        assign_tenant(&server, unit2, tenant2).await;

        // End one so both statuses exist
        server
            .post(&format!("/api/v1/tenancies/{}/end", tenancy1.id))
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .get("/api/v1/tenancies")
            .add_query_param("property_id", property_id)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<TenancyResponse>> = response.json();
        assert_eq!(body.data.len(), 2);

        let response = server
            .get("/api/v1/tenancies")
            .add_query_param("status", "active")
            .await;
        let body: ApiResponse<Vec<TenancyResponse>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].unit_id, unit2);

        let response = server
            .get("/api/v1/tenancies")
            .add_query_param("unit_id", unit1)
            .await;
        let body: ApiResponse<Vec<TenancyResponse>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].status, "ended");

        // Nonsense status strings are rejected
        let response = server
            .get("/api/v1/tenancies")
            .add_query_param("status", "paused")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Pagination bounds are validated
        let response = server
            .get("/api/v1/tenancies")
            .add_query_param("page", 0)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_property_tenancies_lists_only_active() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-19/1", 4).await;
        let unit1 = create_unit(&server, property_id, "A1").await;
        let unit2 = create_unit(&server, property_id, "A2").await;
        let tenant1 = create_tenant(&server, "tenant1@example.com").await;
        let tenant2 = create_tenant(&server, "tenant2@example.com").await;

        let tenancy1 = assign_tenant(&server, unit1, tenant1).await;
        let tenancy2 = assign_tenant(&server, unit2, tenant2).await;
        server
            .post(&format!("/api/v1/tenancies/{}/end", tenancy1.id))
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/api/v1/properties/{}/tenancies", property_id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<TenancyResponse>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].id, tenancy2.id);
    }

    #[tokio::test]
    async fn test_unit_status_cannot_be_forced_occupied() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-20/1", 2).await;
        let unit_id = create_unit(&server, property_id, "A1").await;

        // Occupied is owned by the workflow
        let response = server
            .put(&format!("/api/v1/units/{}", unit_id))
            .json(&serde_json::json!({ "status": "occupied" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error_body: serde_json::Value = response.json();
        assert_eq!(error_body["code"], "INVALID_STATUS");

        // Maintenance is a landlord decision
        let response = server
            .put(&format!("/api/v1/units/{}", unit_id))
            .json(&serde_json::json!({ "status": "maintenance" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<UnitResponse> = response.json();
        assert_eq!(body.data.status, "maintenance");
    }

    #[tokio::test]
    async fn test_occupied_units_never_exceeds_total_units() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // Fill a two-unit property completely, then walk the tenancies
        // through end/reassign cycles; the cached count stays in bounds
        let property_id = create_property(&server, "LR-21/1", 2).await;
        let mut tenancies = Vec::new();
        for i in 1..=2 {
            let unit_id = create_unit(&server, property_id, &format!("A{}", i)).await;
            let tenant_id =
                create_tenant(&server, &format!("tenant{}@example.com", i)).await;
            tenancies.push(assign_tenant(&server, unit_id, tenant_id).await);
        }

        let check = |body: ApiResponse<serde_json::Value>| {
            let occupied = body.data["occupied_units"].as_i64().unwrap();
            let total = body.data["total_units"].as_i64().unwrap();
            assert!(0 <= occupied && occupied <= total);
            occupied
        };

        let response = server
            .get(&format!("/api/v1/properties/{}", property_id))
            .await;
        assert_eq!(check(response.json()), 2);

        server
            .post(&format!("/api/v1/tenancies/{}/end", tenancies[0].id))
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/api/v1/properties/{}", property_id))
            .await;
        assert_eq!(check(response.json()), 1);

        let tenant3 = create_tenant(&server, "tenant3@example.com").await;
        assign_tenant(&server, tenancies[0].unit_id, tenant3).await;

        let response = server
            .get(&format!("/api/v1/properties/{}", property_id))
            .await;
        assert_eq!(check(response.json()), 2);
    }

    /// Drive the repair pass over a store that was written outside the
    /// workflow, using the database handle directly.
    #[tokio::test]
    async fn test_reconcile_repairs_foreign_writes() {
        use model::entities::unit;
        use sea_orm::{ActiveModelTrait, EntityTrait, Set};

        let app_state = setup_test_app_state().await;
        let app = crate::router::create_router(app_state.clone());
        let server = TestServer::new(app).unwrap();

        let property_id = create_property(&server, "LR-22/1", 2).await;
        let unit_id = create_unit(&server, property_id, "A1").await;
        let tenant_id = create_tenant(&server, "tenant@example.com").await;
        assign_tenant(&server, unit_id, tenant_id).await;

        // Simulate another writer resetting the unit under the tenancy
        let unit_model = unit::Entity::find_by_id(unit_id)
            .one(&app_state.db)
            .await
            .unwrap()
            .unwrap();
        let mut active: unit::ActiveModel = unit_model.into();
        active.status = Set(unit::UnitStatus::Vacant);
        active.update(&app_state.db).await.unwrap();

        let report = compute::reconcile::repair_unit_statuses(&app_state.db)
            .await
            .unwrap();
        assert_eq!(report.units_marked_occupied, 1);

        let response = server.get(&format!("/api/v1/units/{}", unit_id)).await;
        let body: ApiResponse<UnitResponse> = response.json();
        assert_eq!(body.data.status, "occupied");
    }
}
