mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

struct Setup {
    tenant_token: String,
    landlord_token: String,
    post_id: String,
}

/// Registers a fresh landlord/tenant pair and gets one approved post.
async fn approved_post(base: &str) -> Result<Setup> {
    let landlord_email = common::unique_email("landlord");
    let (landlord_token, _) = common::register(base, "landlord", &landlord_email, "Chủ Trọ").await?;
    let tenant_email = common::unique_email("tenant");
    let (tenant_token, _) = common::register(base, "tenant", &tenant_email, "Người Thuê").await?;
    let admin_token = common::admin_token(base).await?;

    let post_id = common::create_post(base, &landlord_token).await?;
    common::approve_post(base, &admin_token, &post_id).await?;

    Ok(Setup {
        tenant_token,
        landlord_token,
        post_id,
    })
}

async fn post_availability(base: &str, token: &str, post_id: &str) -> Result<bool> {
    let client = reqwest::Client::new();
    let res = client
        .get(format!("{base}/api/rental-posts/{post_id}"))
        .bearer_auth(token)
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "get post failed: {}", res.status());
    let body: Value = res.json().await?;
    body["post"]["is_available"]
        .as_bool()
        .ok_or_else(|| anyhow::anyhow!("missing is_available"))
}

#[tokio::test]
async fn contract_creation_reserves_the_post() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let base = &server.base_url;
    let setup = approved_post(base).await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{base}/api/contracts"))
        .bearer_auth(&setup.tenant_token)
        .json(&json!({
            "post_id": setup.post_id,
            "start_date": "2026-09-01",
            "end_date": "2027-08-31",
            "deposit_amount": "3500000",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Tạo hợp đồng thành công");
    assert_eq!(body["contract"]["status"], "active");
    // monthly_rent defaults to the post price when omitted
    assert_eq!(body["contract"]["monthly_rent"], "3500000.00");

    assert!(!post_availability(base, &setup.landlord_token, &setup.post_id).await?);

    // The same tenant cannot contract the same post twice
    let res = client
        .post(format!("{base}/api/contracts"))
        .bearer_auth(&setup.tenant_token)
        .json(&json!({
            "post_id": setup.post_id,
            "start_date": "2026-09-01",
            "end_date": "2027-08-31",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Bạn đã tạo hợp đồng cho bài đăng này");
    Ok(())
}

#[tokio::test]
async fn contract_validation_order_and_messages() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let base = &server.base_url;
    let setup = approved_post(base).await?;
    let client = reqwest::Client::new();

    let cases = [
        (
            json!({ "post_id": setup.post_id }),
            "Thiếu thông tin bắt buộc: post_id, start_date, end_date",
        ),
        (
            json!({ "post_id": setup.post_id, "start_date": "chưa biết", "end_date": "2026-10-01" }),
            "Ngày không hợp lệ",
        ),
        (
            json!({ "post_id": setup.post_id, "start_date": "2026-10-01", "end_date": "2026-09-01" }),
            "Ngày kết thúc phải sau ngày bắt đầu",
        ),
        (
            json!({ "post_id": setup.post_id, "start_date": "2026-09-01", "end_date": "2026-09-15" }),
            "Thời hạn hợp đồng phải ít nhất 30 ngày",
        ),
    ];

    for (payload, message) in cases {
        let res = client
            .post(format!("{base}/api/contracts"))
            .bearer_auth(&setup.tenant_token)
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "payload: {payload}");
        let body: Value = res.json().await?;
        assert_eq!(body["message"], message);
    }

    // Landlords cannot create contracts at all
    let res = client
        .post(format!("{base}/api/contracts"))
        .bearer_auth(&setup.landlord_token)
        .json(&json!({
            "post_id": setup.post_id,
            "start_date": "2026-09-01",
            "end_date": "2027-08-31",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Chỉ tenant mới có quyền tạo hợp đồng.");
    Ok(())
}

#[tokio::test]
async fn contracts_require_an_approved_post() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let base = &server.base_url;
    let client = reqwest::Client::new();

    let landlord_email = common::unique_email("landlord");
    let (landlord_token, _) = common::register(base, "landlord", &landlord_email, "Chủ Trọ").await?;
    let tenant_email = common::unique_email("tenant");
    let (tenant_token, _) = common::register(base, "tenant", &tenant_email, "Người Thuê").await?;
    let pending_post = common::create_post(base, &landlord_token).await?;

    let res = client
        .post(format!("{base}/api/contracts"))
        .bearer_auth(&tenant_token)
        .json(&json!({
            "post_id": pending_post,
            "start_date": "2026-09-01",
            "end_date": "2027-08-31",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Chỉ có thể tạo hợp đồng cho bài đăng đã được duyệt");

    // An unknown post id is a 404, not a validation error
    let res = client
        .post(format!("{base}/api/contracts"))
        .bearer_auth(&tenant_token)
        .json(&json!({
            "post_id": "00000000-0000-0000-0000-000000000000",
            "start_date": "2026-09-01",
            "end_date": "2027-08-31",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Bài đăng không tồn tại");
    Ok(())
}

#[tokio::test]
async fn terminate_releases_availability_exactly_once() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let base = &server.base_url;
    let setup = approved_post(base).await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{base}/api/contracts"))
        .bearer_auth(&setup.tenant_token)
        .json(&json!({
            "post_id": setup.post_id,
            "start_date": "2026-09-01",
            "end_date": "2027-08-31",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let contract_id = body["contract"]["id"].as_str().unwrap().to_string();

    // Tenants cannot terminate, not even their own contract
    let res = client
        .put(format!("{base}/api/contracts/{contract_id}/terminate"))
        .bearer_auth(&setup.tenant_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Chỉ landlord hoặc admin mới có quyền kết thúc hợp đồng");

    let res = client
        .put(format!("{base}/api/contracts/{contract_id}/terminate"))
        .bearer_auth(&setup.landlord_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Kết thúc hợp đồng thành công");
    assert_eq!(body["contract"]["status"], "terminated");

    // The post is listable again
    assert!(post_availability(base, &setup.landlord_token, &setup.post_id).await?);

    // Terminating twice is a conflict
    let res = client
        .put(format!("{base}/api/contracts/{contract_id}/terminate"))
        .bearer_auth(&setup.landlord_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Hợp đồng đã được kết thúc");

    // The pair keeps its history: the same tenant cannot contract the same
    // post again even after termination released it
    let res = client
        .post(format!("{base}/api/contracts"))
        .bearer_auth(&setup.tenant_token)
        .json(&json!({
            "post_id": setup.post_id,
            "start_date": "2027-09-01",
            "end_date": "2028-08-31",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Bạn đã tạo hợp đồng cho bài đăng này");
    Ok(())
}

#[tokio::test]
async fn contract_updates_cannot_change_status() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let base = &server.base_url;
    let setup = approved_post(base).await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{base}/api/contracts"))
        .bearer_auth(&setup.tenant_token)
        .json(&json!({
            "post_id": setup.post_id,
            "start_date": "2026-09-01",
            "end_date": "2027-08-31",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let contract_id = body["contract"]["id"].as_str().unwrap().to_string();

    // A smuggled status field is ignored; only terminate moves the status
    let res = client
        .put(format!("{base}/api/contracts/{contract_id}"))
        .bearer_auth(&setup.landlord_token)
        .json(&json!({ "monthly_rent": "4000000", "status": "terminated" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["contract"]["status"], "active");
    assert_eq!(body["contract"]["monthly_rent"], "4000000.00");

    // The post therefore stays reserved
    assert!(!post_availability(base, &setup.landlord_token, &setup.post_id).await?);
    Ok(())
}

#[tokio::test]
async fn contract_visibility_is_limited_to_its_parties() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let base = &server.base_url;
    let setup = approved_post(base).await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{base}/api/contracts"))
        .bearer_auth(&setup.tenant_token)
        .json(&json!({
            "post_id": setup.post_id,
            "start_date": "2026-09-01",
            "end_date": "2027-08-31",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let contract_id = body["contract"]["id"].as_str().unwrap().to_string();

    // A stranger tenant cannot read it
    let stranger_email = common::unique_email("stranger");
    let (stranger_token, _) = common::register(base, "tenant", &stranger_email, "Người Lạ").await?;
    let res = client
        .get(format!("{base}/api/contracts/{contract_id}"))
        .bearer_auth(&stranger_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Bạn không có quyền xem hợp đồng này");

    // Both parties can
    for token in [&setup.tenant_token, &setup.landlord_token] {
        let res = client
            .get(format!("{base}/api/contracts/{contract_id}"))
            .bearer_auth(token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    // Scoped listings see it
    let res = client
        .get(format!("{base}/api/contracts/my/contracts"))
        .bearer_auth(&setup.tenant_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let ids: Vec<&str> = body["contracts"]
        .as_array()
        .map(|cs| cs.iter().filter_map(|c| c["id"].as_str()).collect())
        .unwrap_or_default();
    assert!(ids.contains(&contract_id.as_str()));
    Ok(())
}
