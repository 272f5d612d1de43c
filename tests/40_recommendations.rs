mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn recommendations_follow_stored_preferences() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let base = &server.base_url;
    let client = reqwest::Client::new();

    let landlord_email = common::unique_email("landlord");
    let (landlord_token, _) = common::register(base, "landlord", &landlord_email, "Chủ Trọ").await?;
    let tenant_email = common::unique_email("tenant");
    let (tenant_token, _) = common::register(base, "tenant", &tenant_email, "Người Thuê").await?;
    let admin_token = common::admin_token(base).await?;

    let post_id = common::create_post(base, &landlord_token).await?;
    common::approve_post(base, &admin_token, &post_id).await?;

    // Preferences covering the seeded post (price 3,500,000 in province 01)
    let res = client
        .put(format!("{base}/api/profile/edit-profile"))
        .bearer_auth(&tenant_token)
        .json(&json!({
            "target_province_code": "01",
            "budget_min": "1000000",
            "budget_max": "5000000",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Cập nhật profile thành công");
    assert_eq!(body["profile"]["target_province_code"], "01");

    let res = client
        .get(format!("{base}/api/rental-posts/recommendations/my"))
        .bearer_auth(&tenant_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Danh sách phòng được gợi ý cho bạn.");
    let ids: Vec<&str> = body["recommendations"]
        .as_array()
        .map(|posts| posts.iter().filter_map(|p| p["id"].as_str()).collect())
        .unwrap_or_default();
    assert!(ids.contains(&post_id.as_str()));
    // The internal rank never reaches the client
    for post in body["recommendations"].as_array().unwrap() {
        assert!(post.get("priority_rank").is_none());
    }

    // A budget below every listed price yields the empty-result message
    let res = client
        .put(format!("{base}/api/profile/edit-profile"))
        .bearer_auth(&tenant_token)
        .json(&json!({ "budget_min": "1", "budget_max": "2" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{base}/api/rental-posts/recommendations/my"))
        .bearer_auth(&tenant_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Không tìm thấy phòng phù hợp với yêu cầu của bạn.");
    Ok(())
}

#[tokio::test]
async fn recommendations_are_tenant_only() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let base = &server.base_url;
    let client = reqwest::Client::new();

    let landlord_email = common::unique_email("landlord");
    let (landlord_token, _) = common::register(base, "landlord", &landlord_email, "Chủ Trọ").await?;

    let res = client
        .get(format!("{base}/api/rental-posts/recommendations/my"))
        .bearer_auth(&landlord_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Chỉ tenant mới có quyền sử dụng tính năng này.");
    Ok(())
}
